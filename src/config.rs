//! Optional `rev-callgraph.toml` settings.
//!
//! Lookup order: an explicit `--config` path, else `rev-callgraph.toml` in
//! the workspace root, else built-in defaults. Command-line flags override
//! whatever the file sets.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ports::exporters::{JsonStyle, OutputFormat};

pub const CONFIG_FILE: &str = "rev-callgraph.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Reverse search depth ceiling; 0 is unlimited.
    pub max_depth: Option<usize>,
    pub format: Option<OutputFormat>,
    pub json_style: Option<JsonStyle>,
    /// Abort the search after this many seconds.
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid rev-callgraph configuration")
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("In {}", path.display()))
    }

    /// Explicit path if given (must exist), otherwise the workspace file if present.
    pub fn discover(explicit: Option<&Path>, workspace_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        let candidate: PathBuf = workspace_root.join(CONFIG_FILE);
        if candidate.is_file() {
            Self::load_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
