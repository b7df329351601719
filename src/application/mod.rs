//! Reverse caller search across module boundaries.
//!
//! For a target symbol the builder searches the owning module and every
//! module that requires it, resolves each caller's defining module and
//! recurses. Cycle detection is path-local: each branch carries its own
//! copy of the symbols on its root-to-node lineage, so the same symbol may
//! legitimately appear un-cycled in sibling or cousin subtrees.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::callgraph::CallNode;
use crate::domain::entry_point::EntryPointDetector;
use crate::domain::index::{Module, ModuleIndex};
use crate::domain::symbol::Symbol;
use crate::error::{Error, Result};
use crate::infrastructure::call_matcher::HeuristicCallerResolver;
use crate::infrastructure::concurrency::Cancellation;
use crate::infrastructure::prefilter::shortlist_files;
use crate::infrastructure::project_loader::ProjectLoader;
use crate::ports::CallerResolver;

/// Symbols on the path from the root to the node being expanded.
pub type Lineage = HashSet<String>;

pub struct CallerTreeBuilder<'a> {
    index: &'a ModuleIndex,
    resolver: &'a dyn CallerResolver,
    cancel: &'a Cancellation,
    /// 0 means unlimited.
    max_depth: usize,
    entry_points: EntryPointDetector,
}

impl<'a> CallerTreeBuilder<'a> {
    pub fn new(
        index: &'a ModuleIndex,
        resolver: &'a dyn CallerResolver,
        cancel: &'a Cancellation,
        max_depth: usize,
    ) -> Self {
        Self {
            index,
            resolver,
            cancel,
            max_depth,
            entry_points: EntryPointDetector::new(),
        }
    }

    /// Tree of callers of `target`, which is defined in `module`.
    pub fn build_root(&mut self, target: &Symbol, module: &'a Module) -> Result<CallNode> {
        self.build(target, module, &Lineage::new(), 0)
    }

    /// One recursive expansion. Errors from the owning module's search are
    /// returned; the parent decides whether to drop this subtree.
    pub fn build(
        &mut self,
        target: &Symbol,
        module: &'a Module,
        lineage: &Lineage,
        depth: usize,
    ) -> Result<CallNode> {
        self.cancel.check()?;

        let name = target.to_string();
        let main = self.entry_points.is_main_package(self.index, &target.package);

        if lineage.contains(&name) {
            debug!("cycle detected for {} in {}", name, module.path);
            return Ok(CallNode {
                cycled: true,
                main,
                ..CallNode::leaf(name)
            });
        }
        if self.max_depth > 0 && depth >= self.max_depth {
            debug!("max depth reached for {} in {}", name, module.path);
            return Ok(CallNode {
                main,
                ..CallNode::leaf(name)
            });
        }

        debug!("search callers for {} in {}", name, module.path);
        let mut lineage = lineage.clone();
        lineage.insert(name.clone());

        let mut callers = Vec::new();

        let found = self.search_module(module, target)?;
        self.expand_callers(found, &lineage, depth, &mut callers)?;

        let index = self.index;
        for dependent in index.dependents_of(module) {
            self.cancel.check()?;
            debug!("search dependent module: {}", dependent.path);
            let found = match self.search_module(dependent, target) {
                Ok(found) => found,
                Err(e) if e.is_cancellation() => return Err(e),
                Err(e) => {
                    warn!("skipping dependent module {}: {}", dependent.path, e);
                    continue;
                }
            };
            self.expand_callers(found, &lineage, depth, &mut callers)?;
        }

        Ok(CallNode {
            name,
            callers,
            cycled: false,
            main,
        })
    }

    /// Prefilter `module`'s files, then resolve call sites to caller symbols.
    fn search_module(&self, module: &Module, target: &Symbol) -> Result<Vec<Symbol>> {
        let files = shortlist_files(&module.root, target, self.cancel)?;
        self.resolver
            .extract_callers(target, &files, self.index, self.cancel)
    }

    /// Recurse into every caller that can be attributed to a module.
    /// Unattributable callers and failed subtrees are dropped; cancellation
    /// is not.
    fn expand_callers(
        &mut self,
        found: Vec<Symbol>,
        lineage: &Lineage,
        depth: usize,
        out: &mut Vec<CallNode>,
    ) -> Result<()> {
        for caller in found {
            self.cancel.check()?;
            let index = self.index;
            let module = match index.find_defining_module(&caller) {
                Ok(Some(module)) => module,
                Ok(None) => {
                    debug!("no defining module for {}, dropped", caller);
                    continue;
                }
                Err(e) => {
                    debug!("lookup of {} failed, dropped: {}", caller, e);
                    continue;
                }
            };
            match self.build(&caller, module, lineage, depth + 1) {
                Ok(node) => out.push(node),
                Err(e) if e.is_cancellation() => return Err(e),
                Err(e) => debug!("subtree for {} dropped: {}", caller, e),
            }
        }
        Ok(())
    }
}

/// Wires workspace scanning, target lookup and the tree builder together.
pub struct ReverseCallUsecase<'a> {
    pub resolver: &'a dyn CallerResolver,
}

impl<'a> ReverseCallUsecase<'a> {
    pub fn run(
        &self,
        target_text: &str,
        workspace_root: &Path,
        max_depth: usize,
        cancel: &Cancellation,
    ) -> Result<CallNode> {
        let target = Symbol::parse(target_text)?;

        let index = ProjectLoader::scan(workspace_root, cancel)?;
        debug!("detected {} module(s): {:?}", index.len(), index);

        let module = index
            .find_defining_module(&target)?
            .ok_or_else(|| Error::NotFound(target.to_string()))?;

        CallerTreeBuilder::new(&index, self.resolver, cancel, max_depth).build_root(&target, module)
    }
}

/// Reverse call tree of `target_text` over the Go workspace at
/// `workspace_root`, using the heuristic resolver. `max_depth == 0` means
/// unlimited.
pub fn build_caller_tree(
    target_text: &str,
    workspace_root: &Path,
    max_depth: usize,
    cancel: &Cancellation,
) -> Result<CallNode> {
    ReverseCallUsecase {
        resolver: &HeuristicCallerResolver,
    }
    .run(target_text, workspace_root, max_depth, cancel)
}
