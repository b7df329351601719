//! Call Tree Exporters
//!
//! Render a finished [`CallNode`] tree as indented text, JSON or Graphviz DOT.

use std::collections::BTreeSet;
use std::io::{Result, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::OutputExporter;
use crate::domain::callgraph::CallNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
    Dot,
}

/// Shape of the JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonStyle {
    /// The tree itself, callers nested under callees.
    #[default]
    Nested,
    /// `{root, nodes, edges}` flattened form.
    Edges,
}

pub fn exporter_for(format: OutputFormat, style: JsonStyle) -> Box<dyn OutputExporter> {
    match format {
        OutputFormat::Tree => Box::new(TreeExporter),
        OutputFormat::Json => Box::new(JsonExporter { style }),
        OutputFormat::Dot => Box::new(DotExporter),
    }
}

/// Two spaces of indentation per level, ` [main]` and ` (cycled)` markers.
pub struct TreeExporter;

impl OutputExporter for TreeExporter {
    fn export(&self, root: &CallNode, out: &mut dyn Write) -> Result<()> {
        let mut result = Ok(());
        root.walk(&mut |node, depth| {
            if result.is_err() {
                return;
            }
            let mut line = format!("{}{}", "  ".repeat(depth), node.name);
            if node.main {
                line.push_str(" [main]");
            }
            if node.cycled {
                line.push_str(" (cycled)");
            }
            result = writeln!(out, "{}", line);
        });
        result
    }
}

pub struct JsonExporter {
    pub style: JsonStyle,
}

impl OutputExporter for JsonExporter {
    fn export(&self, root: &CallNode, out: &mut dyn Write) -> Result<()> {
        let json = match self.style {
            JsonStyle::Nested => serde_json::to_string_pretty(root),
            JsonStyle::Edges => serde_json::to_string_pretty(&root.to_edges()),
        }
        .map_err(std::io::Error::other)?;
        writeln!(out, "{}", json)
    }
}

pub struct DotExporter;

impl DotExporter {
    fn escape(name: &str) -> String {
        name.replace('\\', "\\\\").replace('"', "\\\"")
    }

    pub fn to_dot(root: &CallNode) -> String {
        let mut lines = vec![
            "digraph callers {".to_string(),
            "    rankdir=RL;".to_string(),
            "    node [shape=ellipse, fontname=\"Helvetica\"];".to_string(),
        ];

        let mut main_nodes = BTreeSet::new();
        let mut edges = Vec::new();
        root.walk(&mut |node, _| {
            if node.main {
                main_nodes.insert(node.name.as_str());
            }
            for caller in &node.callers {
                let style = if caller.cycled { " [style=dashed]" } else { "" };
                edges.push(format!(
                    "    \"{}\" -> \"{}\"{};",
                    Self::escape(&caller.name),
                    Self::escape(&node.name),
                    style
                ));
            }
        });

        lines.push(format!("    \"{}\" [style=bold];", Self::escape(&root.name)));
        for name in main_nodes {
            lines.push(format!("    \"{}\" [shape=box];", Self::escape(name)));
        }
        lines.extend(edges);
        lines.push("}".to_string());
        lines.join("\n")
    }
}

impl OutputExporter for DotExporter {
    fn export(&self, root: &CallNode, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", Self::to_dot(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CallNode {
        let mut b = CallNode::leaf("p.B");
        b.callers.push(CallNode {
            cycled: true,
            ..CallNode::leaf("p.A")
        });
        CallNode {
            callers: vec![
                b,
                CallNode {
                    main: true,
                    ..CallNode::leaf("main.main")
                },
            ],
            ..CallNode::leaf("p.A")
        }
    }

    fn render(exporter: &dyn OutputExporter) -> String {
        let mut buf = Vec::new();
        exporter.export(&sample(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_tree_output() {
        assert_eq!(
            render(&TreeExporter),
            "p.A\n  p.B\n    p.A (cycled)\n  main.main [main]\n"
        );
    }

    #[test]
    fn test_json_nested() {
        let out = render(&JsonExporter {
            style: JsonStyle::Nested,
        });
        let back: CallNode = serde_json::from_str(&out).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_json_edges() {
        let out = render(&JsonExporter {
            style: JsonStyle::Edges,
        });
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["root"], "p.A");
        assert_eq!(value["edges"].as_array().unwrap().len(), 3);
        assert_eq!(value["edges"][0]["caller"], "p.B");
        assert_eq!(value["edges"][0]["callee"], "p.A");
    }

    #[test]
    fn test_dot_output() {
        let dot = render(&DotExporter);
        assert!(dot.starts_with("digraph callers {"));
        assert!(dot.contains("\"p.B\" -> \"p.A\";"));
        assert!(dot.contains("\"p.A\" -> \"p.B\" [style=dashed];"));
        assert!(dot.contains("\"main.main\" [shape=box];"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
