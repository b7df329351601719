// Domain model for rev-callgraph: symbols, modules, syntax trees and the
// reverse call tree.

pub mod ast;
pub mod callgraph;
pub mod entry_point;
pub mod index;
pub mod symbol;
