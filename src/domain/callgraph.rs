// Reverse call tree structures for rev-callgraph.
// A CallNode's children are the functions that call it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

/// A node of the reverse call tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNode {
    /// Canonical symbol name (`pkg.Func` or `pkg.Type#Method`).
    pub name: String,
    /// Callers of this symbol, in discovery order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub callers: Vec<CallNode>,
    /// The symbol already appears on the path from the root to this node.
    #[serde(default, skip_serializing_if = "is_false")]
    pub cycled: bool,
    /// The symbol lives in a `main` package.
    #[serde(default, skip_serializing_if = "is_false")]
    pub main: bool,
}

/// One caller → callee pair of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
}

/// Edge-list view of a tree: root, distinct node names and every edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdges {
    pub root: String,
    pub nodes: Vec<String>,
    pub edges: Vec<CallEdge>,
}

impl CallNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callers: Vec::new(),
            cycled: false,
            main: false,
        }
    }

    /// Depth-first pre-order walk over the tree with each node's depth.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a CallNode, usize)) {
        fn go<'a>(node: &'a CallNode, depth: usize, visit: &mut dyn FnMut(&'a CallNode, usize)) {
            visit(node, depth);
            for caller in &node.callers {
                go(caller, depth + 1, visit);
            }
        }
        go(self, 0, visit);
    }

    /// Flatten into edges (depth-first) plus sorted distinct node names.
    pub fn to_edges(&self) -> CallEdges {
        let mut nodes = BTreeSet::new();
        let mut edges = Vec::new();
        self.walk(&mut |node, _| {
            nodes.insert(node.name.clone());
            for caller in &node.callers {
                edges.push(CallEdge {
                    caller: caller.name.clone(),
                    callee: node.name.clone(),
                });
            }
        });
        CallEdges {
            root: self.name.clone(),
            nodes: nodes.into_iter().collect(),
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self.callers.iter().map(CallNode::node_count).sum::<usize>()
    }
}
