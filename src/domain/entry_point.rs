//! Entry Point Detection Module
//!
//! Decides whether a Go package is the process entry package (`package main`).

use std::fs;
use std::path::Path;

use tree_sitter::Parser;

use crate::domain::ast::{new_parser, GoSource};
use crate::domain::index::ModuleIndex;

/// Name of the package clause that marks an executable's entry package.
pub const ENTRY_PACKAGE: &str = "main";

/// Entry point detector
pub struct EntryPointDetector {
    parser: Parser,
}

impl Default for EntryPointDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryPointDetector {
    pub fn new() -> Self {
        Self {
            parser: new_parser(),
        }
    }

    /// Package clause name of the first `.go` file (by name) in `dir` that has one.
    pub fn package_name(&mut self, dir: &Path) -> Option<String> {
        let mut entries: Vec<_> = fs::read_dir(dir).ok()?.flatten().collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            if path.is_dir() || path.extension().map_or(true, |ext| ext != "go") {
                continue;
            }
            let Ok(text) = fs::read_to_string(&path) else {
                continue;
            };
            let Some(source) = GoSource::parse_lenient(&mut self.parser, text) else {
                continue;
            };
            if let Some(name) = source.package_name() {
                return Some(name.to_string());
            }
        }
        None
    }

    /// True when `package` resolves to a directory whose package clause is `main`.
    /// Packages outside every module are never entry points.
    pub fn is_main_package(&mut self, index: &ModuleIndex, package: &str) -> bool {
        let Some(dir) = index
            .find_by_package(package)
            .and_then(|m| m.package_dir(package))
        else {
            return false;
        };
        self.package_name(&dir).as_deref() == Some(ENTRY_PACKAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::index::Module;
    use tempfile::tempdir;

    #[test]
    fn test_detect_main_package() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("cmd/app")).unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("cmd/app/main.go"), "package main\n\nfunc main() {}\n").unwrap();
        fs::write(dir.path().join("lib/lib.go"), "package lib\n\nfunc Run() {}\n").unwrap();
        let index = ModuleIndex::new(vec![Module::new("example.com/w", dir.path(), vec![])]);

        let mut detector = EntryPointDetector::new();
        assert!(detector.is_main_package(&index, "example.com/w/cmd/app"));
        assert!(!detector.is_main_package(&index, "example.com/w/lib"));
        assert!(!detector.is_main_package(&index, "example.com/w/missing"));
        assert!(!detector.is_main_package(&index, "github.com/elsewhere"));
    }

    #[test]
    fn test_package_name_skips_non_go_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "package main").unwrap();
        fs::write(dir.path().join("z.go"), "package zed\n").unwrap();

        let mut detector = EntryPointDetector::new();
        assert_eq!(detector.package_name(dir.path()).as_deref(), Some("zed"));
    }
}
