//! Heuristic call-site matcher over tree-sitter-go syntax trees.
//!
//! Resolution is name based, not type checked:
//! - `alias.Member(...)` with a known import alias resolves through the
//!   import table and must equal the target exactly;
//! - `expr.Member(...)` through anything else (locals, fields, nested
//!   selectors, parenthesised conversions) matches on the bare member name;
//! - `Member(...)` matches on the bare member name as a same-package call.
//!
//! The selector fallback ignores the receiver type, so two unrelated
//! methods sharing a name are indistinguishable here. That imprecision is
//! accepted: a missed caller is worse than an extra one.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use tree_sitter::Node;

use crate::domain::ast::{new_parser, GoSource};
use crate::domain::index::ModuleIndex;
use crate::domain::symbol::Symbol;
use crate::error::{Error, Result};
use crate::infrastructure::concurrency::Cancellation;
use crate::ports::CallerResolver;

/// Default [`CallerResolver`]: import-alias resolution plus bare-name fallbacks.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicCallerResolver;

impl HeuristicCallerResolver {
    pub fn new() -> Self {
        Self
    }
}

impl CallerResolver for HeuristicCallerResolver {
    fn extract_callers(
        &self,
        target: &Symbol,
        files: &[PathBuf],
        index: &ModuleIndex,
        cancel: &Cancellation,
    ) -> Result<Vec<Symbol>> {
        debug!("extract callers for {}", target);
        let mut parser = new_parser();
        let mut callers = Vec::new();

        for file in files {
            cancel.check()?;
            let text = fs::read_to_string(file).map_err(|e| Error::io(file, e))?;
            let source = GoSource::parse_strict(&mut parser, text).map_err(|e| Error::Parse {
                path: file.clone(),
                message: e.to_string(),
            })?;
            let package = index.package_of_file(file);
            FileMatcher::new(&source, &package, target).collect(&mut callers);
        }

        for caller in &callers {
            debug!("  caller: {}", caller);
        }
        Ok(callers)
    }
}

/// Matching state for one parsed file.
struct FileMatcher<'a> {
    source: &'a GoSource,
    package: &'a str,
    target_dotted: String,
    target_base: &'a str,
    imports: HashMap<String, String>,
}

impl<'a> FileMatcher<'a> {
    fn new(source: &'a GoSource, package: &'a str, target: &'a Symbol) -> Self {
        Self {
            source,
            package,
            target_dotted: target.dotted(),
            target_base: target.base_name(),
            imports: import_table(source),
        }
    }

    fn collect(&self, out: &mut Vec<Symbol>) {
        let root = self.source.root();
        let mut cursor = root.walk();
        for decl in root.named_children(&mut cursor) {
            if !matches!(decl.kind(), "function_declaration" | "method_declaration") {
                continue;
            }
            let Some(body) = decl.child_by_field_name("body") else {
                continue;
            };
            let Some(caller) = self.declaration_symbol(decl) else {
                continue;
            };
            let hits = self.count_matching_calls(body);
            for _ in 0..hits {
                out.push(caller.clone());
            }
        }
    }

    /// Qualified symbol of a declaration; `None` when the receiver type
    /// cannot be named (generic or parenthesised receivers).
    fn declaration_symbol(&self, decl: Node<'_>) -> Option<Symbol> {
        let name = self.source.text_of(decl.child_by_field_name("name")?);
        let canonical = if decl.kind() == "method_declaration" {
            let receiver = receiver_type_name(self.source, decl.child_by_field_name("receiver")?)?;
            format!("{}.{}#{}", self.package, receiver, name)
        } else {
            format!("{}.{}", self.package, name)
        };
        Symbol::parse(&canonical).ok()
    }

    /// Number of call expressions inside `body` that resolve to the target,
    /// including calls nested in function literals.
    fn count_matching_calls(&self, body: Node<'_>) -> usize {
        let mut hits = 0;
        let mut stack = vec![body];
        while let Some(node) = stack.pop() {
            if node.kind() == "call_expression" && self.call_matches(node) {
                hits += 1;
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        hits
    }

    fn call_matches(&self, call: Node<'_>) -> bool {
        let Some(function) = call.child_by_field_name("function") else {
            return false;
        };
        match function.kind() {
            "identifier" => self.source.text_of(function) == self.target_base,
            "selector_expression" => {
                let Some(field) = function.child_by_field_name("field") else {
                    return false;
                };
                let member = self.source.text_of(field);
                let operand = function.child_by_field_name("operand");
                let import = operand
                    .filter(|op| op.kind() == "identifier")
                    .and_then(|op| self.imports.get(self.source.text_of(op)));
                match import {
                    Some(import_path) => format!("{}.{}", import_path, member) == self.target_dotted,
                    None => member == self.target_base,
                }
            }
            _ => false,
        }
    }
}

/// Local name → import path. An unaliased (or blank) import is known by
/// the last segment of its path.
fn import_table(source: &GoSource) -> HashMap<String, String> {
    let mut table = HashMap::new();
    let mut specs = Vec::new();
    let root = source.root();
    let mut cursor = root.walk();
    for decl in root.named_children(&mut cursor) {
        if decl.kind() != "import_declaration" {
            continue;
        }
        let mut inner = decl.walk();
        for child in decl.named_children(&mut inner) {
            match child.kind() {
                "import_spec" => specs.push(child),
                "import_spec_list" => {
                    let mut list = child.walk();
                    specs.extend(
                        child
                            .named_children(&mut list)
                            .filter(|n| n.kind() == "import_spec"),
                    );
                }
                _ => {}
            }
        }
    }

    for spec in specs {
        let Some(path_node) = spec.child_by_field_name("path") else {
            continue;
        };
        let path = source
            .text_of(path_node)
            .trim_matches(|c| c == '"' || c == '`')
            .to_string();
        let alias = spec
            .child_by_field_name("name")
            .map(|n| source.text_of(n))
            .filter(|n| *n != "_")
            .map(str::to_string)
            .unwrap_or_else(|| path.rsplit('/').next().unwrap_or(&path).to_string());
        table.insert(alias, path);
    }
    table
}

/// `T` or `*T` from a method receiver list.
fn receiver_type_name(source: &GoSource, receiver: Node<'_>) -> Option<String> {
    let mut cursor = receiver.walk();
    let param = receiver
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;
    let ty = param.child_by_field_name("type")?;
    let ident = match ty.kind() {
        "type_identifier" => ty,
        "pointer_type" => {
            let mut inner = ty.walk();
            let pointee = ty.named_children(&mut inner).next()?;
            if pointee.kind() != "type_identifier" {
                return None;
            }
            pointee
        }
        _ => return None,
    };
    Some(source.text_of(ident).to_string())
}

/// Callers of `target` within a single file.
pub fn extract_callers_in(
    target: &Symbol,
    file: &Path,
    index: &ModuleIndex,
    cancel: &Cancellation,
) -> Result<Vec<Symbol>> {
    HeuristicCallerResolver.extract_callers(target, &[file.to_path_buf()], index, cancel)
}
