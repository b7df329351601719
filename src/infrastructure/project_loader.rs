use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::domain::index::{Module, ModuleIndex};
use crate::error::{Error, Result};
use crate::infrastructure::concurrency::Cancellation;
use crate::infrastructure::gomod::GoModFile;

pub const DESCRIPTOR_FILE: &str = "go.mod";

pub struct ProjectLoader;

impl ProjectLoader {
    /// Discover every Go module below `root`.
    ///
    /// Walks the whole tree in file-name order and reads each `go.mod`;
    /// the directory holding it becomes the module root. A descriptor that
    /// cannot be read or parsed aborts the scan, as does a second module
    /// claiming an identifier already seen.
    pub fn scan(root: &Path, cancel: &Cancellation) -> Result<ModuleIndex> {
        let mut modules: Vec<Module> = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            cancel.check()?;
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                let message = e.to_string();
                match e.into_io_error() {
                    Some(io) => Error::io(path, io),
                    None => Error::Scan { path, message },
                }
            })?;
            if !entry.file_type().is_file() || entry.file_name() != DESCRIPTOR_FILE {
                continue;
            }

            let path = entry.path();
            debug!("detected go module: {}", path.display());
            let module = Self::load_module(path)?;

            if let Some(existing) = modules.iter().find(|m| m.path == module.path) {
                return Err(Error::Scan {
                    path: path.to_path_buf(),
                    message: format!(
                        "module {} is already declared in {}",
                        module.path,
                        existing.root.display()
                    ),
                });
            }
            modules.push(module);
        }

        Ok(ModuleIndex::new(modules))
    }

    /// Read a single `go.mod` into a [`Module`] rooted at its directory.
    pub fn load_module(descriptor: &Path) -> Result<Module> {
        let content = fs::read_to_string(descriptor).map_err(|e| Error::Scan {
            path: descriptor.to_path_buf(),
            message: format!("cannot read descriptor: {}", e),
        })?;
        let parsed = GoModFile::parse(&content).map_err(|e| Error::Scan {
            path: descriptor.to_path_buf(),
            message: e.to_string(),
        })?;
        let root = descriptor.parent().unwrap_or_else(|| Path::new("."));
        Ok(Module::new(parsed.module, root, parsed.requires))
    }
}
