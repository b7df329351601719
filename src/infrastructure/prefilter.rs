//! Textual shortlist of files that may reference a symbol.
//!
//! Parsing every `.go` file of a large module is the expensive part of a
//! caller search. A cheap line scan picks out the files worth parsing; it may
//! keep files without a real call, but never drops one the matcher needs.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::domain::symbol::Symbol;
use crate::error::{Error, Result};
use crate::infrastructure::concurrency::Cancellation;

/// Substrings whose presence on any line shortlists a file.
pub fn search_patterns(sym: &Symbol) -> Vec<String> {
    let mut patterns = vec![sym.to_string()];
    if sym.is_method() {
        patterns.push(sym.dotted());
    }
    patterns.push(format!("{}(", sym.base_name()));
    patterns
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == "vendor" || name.starts_with('.')
}

fn is_go_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
}

/// First-match existence check over the lines of `path`.
fn file_matches(path: &Path, patterns: &[String]) -> Result<bool> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);
    for line in reader.split(b'\n') {
        let line = line.map_err(|e| Error::io(path, e))?;
        let line = String::from_utf8_lossy(&line);
        if patterns.iter().any(|p| line.contains(p.as_str())) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Walk `root` (skipping `vendor` and hidden directories) and return, in
/// walk order, every `.go` file with a line mentioning `sym`.
pub fn shortlist_files(root: &Path, sym: &Symbol, cancel: &Cancellation) -> Result<Vec<PathBuf>> {
    let patterns = search_patterns(sym);
    debug!("search files under {} for {:?}", root.display(), patterns);

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker {
        cancel.check()?;
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            Error::io(path, source)
        })?;
        if !entry.file_type().is_file() || !is_go_source(entry.path()) {
            continue;
        }
        if file_matches(entry.path(), &patterns)? {
            debug!("  candidate file: {}", entry.path().display());
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_patterns_for_function() {
        let sym = Symbol::parse("example.com/foo.Target").unwrap();
        assert_eq!(search_patterns(&sym), vec!["example.com/foo.Target", "Target("]);
    }

    #[test]
    fn test_patterns_for_method() {
        let sym = Symbol::parse("example.com/foo.S#Run").unwrap();
        assert_eq!(
            search_patterns(&sym),
            vec!["example.com/foo.S#Run", "example.com/foo.S.Run", "Run("]
        );
    }

    #[test]
    fn test_shortlist_skips_vendor_and_hidden() {
        let dir = tempdir().unwrap();
        let hit = write(dir.path(), "pkg/a.go", "package pkg\n// call targetFunc()\n");
        write(dir.path(), "pkg/b.go", "package pkg\nfunc foo() {}\n");
        write(dir.path(), "vendor/pkg/c.go", "package pkg\n// call targetFunc()\n");
        write(dir.path(), ".cache/d.go", "package pkg\n// call targetFunc()\n");
        write(dir.path(), "pkg/notes.txt", "targetFunc()\n");

        let sym = Symbol::function("example.com/pkg", "targetFunc");
        let files = shortlist_files(dir.path(), &sym, &Cancellation::new()).unwrap();
        assert_eq!(files, vec![hit]);
    }

    #[test]
    fn test_shortlist_is_ordered() {
        let dir = tempdir().unwrap();
        let b = write(dir.path(), "b/x.go", "Run()\n");
        let a = write(dir.path(), "a/y.go", "Run()\n");
        let sym = Symbol::function("m", "Run");
        let files = shortlist_files(dir.path(), &sym, &Cancellation::new()).unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn test_shortlist_cancelled() {
        let dir = tempdir().unwrap();
        write(dir.path(), "pkg/a.go", "package pkg\n// call targetFunc()\n");
        let cancel = Cancellation::new();
        cancel.cancel();

        let sym = Symbol::function("example.com/pkg", "targetFunc");
        let err = shortlist_files(dir.path(), &sym, &cancel).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
