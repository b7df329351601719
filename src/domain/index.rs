use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::domain::symbol::Symbol;
use crate::error::Result;

/// One `go.mod` worth of workspace: identifier, root directory and requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Module path as declared by the `module` directive.
    pub path: String,
    /// Directory holding the `go.mod`.
    pub root: PathBuf,
    /// Module paths named by `require` directives.
    pub requires: Vec<String>,
}

impl Module {
    pub fn new(path: impl Into<String>, root: impl Into<PathBuf>, requires: Vec<String>) -> Self {
        Self {
            path: path.into(),
            root: root.into(),
            requires,
        }
    }

    /// `pkg` is the module itself or one of its sub-packages.
    pub fn contains_package(&self, pkg: &str) -> bool {
        pkg == self.path
            || pkg
                .strip_prefix(self.path.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Directory where `pkg` lives, or `None` if it is not part of this module.
    pub fn package_dir(&self, pkg: &str) -> Option<PathBuf> {
        if !self.contains_package(pkg) {
            return None;
        }
        if pkg == self.path {
            return Some(self.root.clone());
        }
        let rel = &pkg[self.path.len() + 1..];
        Some(self.root.join(rel))
    }

    pub fn requires_module(&self, path: &str) -> bool {
        self.requires.iter().any(|r| r == path)
    }

    /// Textual check that `sym` is declared in one of the package's `.go` files.
    ///
    /// Not parse-verified. A missing package directory means no definition;
    /// one that cannot be listed is an error. Unreadable files are skipped.
    pub fn has_definition(&self, sym: &Symbol) -> io::Result<bool> {
        let Some(pkg_dir) = self.package_dir(&sym.package) else {
            return Ok(false);
        };

        let pattern = definition_pattern(sym);
        let listing = match fs::read_dir(&pkg_dir) {
            Ok(listing) => listing,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        let mut entries: Vec<_> = listing.collect::<io::Result<_>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            if path.is_dir() || path.extension().map_or(true, |ext| ext != "go") {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            if pattern.is_match(&content) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Declaration pattern: `func (r *Type) Name(` for methods, `func Name(` otherwise.
fn definition_pattern(sym: &Symbol) -> Regex {
    let name = regex::escape(&sym.name);
    let src = match &sym.receiver {
        Some(recv) => format!(
            r"func\s*\([^)]+\*?{}\)\s*{}\s*\(",
            regex::escape(recv),
            name
        ),
        None => format!(r"func\s+{}\s*\(", name),
    };
    // Both inputs are escaped, so the pattern always compiles.
    Regex::new(&src).expect("escaped definition pattern")
}

/// Registry of workspace modules, ordered longest identifier first
/// (ties lexicographic) so the most specific module wins every prefix lookup.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    modules: Vec<Module>,
}

impl ModuleIndex {
    pub fn new(mut modules: Vec<Module>) -> Self {
        modules.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.path.cmp(&b.path))
        });
        Self { modules }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.path == path)
    }

    /// Most specific module containing `pkg`.
    pub fn find_by_package(&self, pkg: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.contains_package(pkg))
    }

    /// Owning module of `sym`, provided the package actually declares it.
    ///
    /// `Ok(None)` covers both "no module has this package" and "the package
    /// exists but has no such declaration".
    pub fn find_defining_module(&self, sym: &Symbol) -> Result<Option<&Module>> {
        let Some(module) = self.find_by_package(&sym.package) else {
            return Ok(None);
        };
        let found = module.has_definition(sym).map_err(|e| {
            let dir = module
                .package_dir(&sym.package)
                .unwrap_or_else(|| module.root.clone());
            crate::error::Error::io(dir, e)
        })?;
        Ok(found.then_some(module))
    }

    /// Modules whose `require` list names `module`; the reverse edges the
    /// caller search follows into downstream modules.
    pub fn dependents_of(&self, module: &Module) -> Vec<&Module> {
        self.modules
            .iter()
            .filter(|m| m.requires_module(&module.path))
            .collect()
    }

    /// Import path of the package holding `file`, taken from the module
    /// with the deepest root containing the file's directory. Files outside
    /// every module fall back to their directory name.
    pub fn package_of_file(&self, file: &Path) -> String {
        let dir = file.parent().unwrap_or_else(|| Path::new(""));

        let best = self
            .modules
            .iter()
            .filter_map(|m| dir.strip_prefix(&m.root).ok().map(|rel| (m, rel)))
            .max_by_key(|(m, _)| m.root.components().count());

        match best {
            Some((module, rel)) => {
                let rel: Vec<_> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect();
                if rel.is_empty() {
                    module.path.clone()
                } else {
                    format!("{}/{}", module.path, rel.join("/"))
                }
            }
            None => dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn index() -> ModuleIndex {
        ModuleIndex::new(vec![
            Module::new("example.com/app", "/ws/app", vec![]),
            Module::new(
                "example.com/app/sub",
                "/ws/app/sub",
                vec!["example.com/app".into()],
            ),
            Module::new("example.com/lib", "/ws/lib", vec!["example.com/app".into()]),
        ])
    }

    #[test]
    fn test_contains_package() {
        let m = Module::new("example.com/app", "/ws/app", vec![]);
        assert!(m.contains_package("example.com/app"));
        assert!(m.contains_package("example.com/app/foo"));
        assert!(!m.contains_package("example.com/apple"));
        assert!(!m.contains_package("example.com"));
    }

    #[test]
    fn test_package_dir() {
        let m = Module::new("example.com/app", "/ws/app", vec![]);
        assert_eq!(m.package_dir("example.com/app"), Some(PathBuf::from("/ws/app")));
        assert_eq!(
            m.package_dir("example.com/app/foo/bar"),
            Some(PathBuf::from("/ws/app/foo/bar"))
        );
        assert_eq!(m.package_dir("example.com/other"), None);
    }

    #[test]
    fn test_ordering_longest_first() {
        let idx = index();
        let paths: Vec<_> = idx.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["example.com/app/sub", "example.com/app", "example.com/lib"]
        );
    }

    #[test]
    fn test_find_by_package_prefers_nested_module() {
        let idx = index();
        assert_eq!(
            idx.find_by_package("example.com/app/sub/x").unwrap().path,
            "example.com/app/sub"
        );
        assert_eq!(
            idx.find_by_package("example.com/app/foo").unwrap().path,
            "example.com/app"
        );
        assert!(idx.find_by_package("github.com/other").is_none());
    }

    #[test]
    fn test_dependents_of() {
        let idx = index();
        let app = idx.get("example.com/app").unwrap();
        let deps: Vec<_> = idx.dependents_of(app).iter().map(|m| m.path.clone()).collect();
        assert_eq!(deps, vec!["example.com/app/sub", "example.com/lib"]);
        let lib = idx.get("example.com/lib").unwrap();
        assert!(idx.dependents_of(lib).is_empty());
    }

    #[test]
    fn test_package_of_file() {
        let idx = index();
        assert_eq!(
            idx.package_of_file(Path::new("/ws/app/foo/a.go")),
            "example.com/app/foo"
        );
        assert_eq!(idx.package_of_file(Path::new("/ws/app/main.go")), "example.com/app");
        assert_eq!(
            idx.package_of_file(Path::new("/ws/app/sub/x/y.go")),
            "example.com/app/sub/x"
        );
        assert_eq!(idx.package_of_file(Path::new("/elsewhere/pkg/z.go")), "pkg");
    }

    #[test]
    fn test_has_definition() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("foo");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(
            pkg.join("foo.go"),
            "package foo\n\ntype S struct{}\n\nfunc (s *S) Do() {}\n\nfunc Target() {}\n",
        )
        .unwrap();
        let m = Module::new("example.com/m", dir.path(), vec![]);

        assert!(m.has_definition(&Symbol::function("example.com/m/foo", "Target")).unwrap());
        assert!(m.has_definition(&Symbol::method("example.com/m/foo", "S", "Do")).unwrap());
        assert!(!m.has_definition(&Symbol::function("example.com/m/foo", "Missing")).unwrap());
        assert!(!m.has_definition(&Symbol::function("example.com/other", "Target")).unwrap());
        assert!(!m.has_definition(&Symbol::function("example.com/m/nope", "Target")).unwrap());
    }

    #[test]
    fn test_find_defining_module() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.go"), "package m\n\nfunc Run() {}\n").unwrap();
        let idx = ModuleIndex::new(vec![Module::new("example.com/m", dir.path(), vec![])]);

        let found = idx
            .find_defining_module(&Symbol::function("example.com/m", "Run"))
            .unwrap();
        assert_eq!(found.map(|m| m.path.as_str()), Some("example.com/m"));
        assert!(idx
            .find_defining_module(&Symbol::function("example.com/m", "Walk"))
            .unwrap()
            .is_none());
        assert!(idx
            .find_defining_module(&Symbol::function("example.com/x", "Run"))
            .unwrap()
            .is_none());
    }
}
