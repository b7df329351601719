//! Error taxonomy for the resolution engine.
//!
//! Every variant except the cancellation pair is fatal only where it is
//! raised from the root of a resolution. Failures while searching a
//! dependent module are logged by the tree builder and never surface here.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed target text such as `pkg.` or `pkg.Type#`.
    #[error("invalid target `{target}`: {reason}")]
    InvalidTarget { target: String, reason: &'static str },

    /// A `go.mod` could not be parsed, or the workspace violates a module invariant.
    #[error("module scan failed at {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },

    /// The target's owning module or its definition could not be located.
    #[error("target not found in workspace: {0}")]
    NotFound(String),

    /// A shortlisted source file does not parse cleanly.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the two variants that must propagate through every
    /// recursion level untouched.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }
}
