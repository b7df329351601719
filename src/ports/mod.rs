use std::io::Write;
use std::path::PathBuf;

use crate::domain::callgraph::CallNode;
use crate::domain::index::ModuleIndex;
use crate::domain::symbol::Symbol;
use crate::error::Result;
use crate::infrastructure::concurrency::Cancellation;

pub mod exporters;

/// Resolves call sites in shortlisted files to the declarations containing them.
///
/// The tree builder only depends on this trait, so a type-checked resolver
/// can replace the name-matching heuristics without touching the search.
pub trait CallerResolver {
    /// One entry per matching call site, in file then source order.
    /// A file that fails to parse fails the whole call.
    fn extract_callers(
        &self,
        target: &Symbol,
        files: &[PathBuf],
        index: &ModuleIndex,
        cancel: &Cancellation,
    ) -> Result<Vec<Symbol>>;
}

pub trait OutputExporter {
    fn export(&self, root: &CallNode, out: &mut dyn Write) -> std::io::Result<()>;
}
