// Main library entry point for rev-callgraph.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod ports;

pub use application::{build_caller_tree, CallerTreeBuilder, ReverseCallUsecase};
pub use domain::callgraph::CallNode;
pub use domain::index::{Module, ModuleIndex};
pub use domain::symbol::Symbol;
pub use error::{Error, Result};
pub use infrastructure::Cancellation;
