// Go syntax trees for rev-callgraph.
// Thin helpers over tree-sitter-go shared by the call-site matcher and the
// entry-point detector.

use tree_sitter::{Language, Node, Parser, Tree};

/// A parsed Go file together with the bytes its nodes point into.
pub struct GoSource {
    pub tree: Tree,
    pub text: String,
}

/// Location and description of the first syntax error in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

pub fn go_language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

pub fn new_parser() -> Parser {
    let mut parser = Parser::new();
    // The bundled grammar is built against the linked tree-sitter ABI.
    parser
        .set_language(&go_language())
        .expect("tree-sitter-go grammar is ABI compatible");
    parser
}

impl GoSource {
    /// Parse without judging the result; callers decide whether a tree
    /// with error nodes is acceptable.
    pub fn parse_lenient(parser: &mut Parser, text: String) -> Option<Self> {
        let tree = parser.parse(&text, None)?;
        Some(Self { tree, text })
    }

    /// Parse and reject any tree containing ERROR or MISSING nodes.
    pub fn parse_strict(parser: &mut Parser, text: String) -> Result<Self, SyntaxError> {
        let source = Self::parse_lenient(parser, text).ok_or_else(|| SyntaxError {
            line: 1,
            column: 1,
            message: "parser produced no tree".to_string(),
        })?;
        if let Some(err) = first_error(source.tree.root_node()) {
            let pos = err.start_position();
            let message = if err.is_missing() {
                format!("missing {}", err.kind())
            } else {
                "syntax error".to_string()
            };
            return Err(SyntaxError {
                line: pos.row + 1,
                column: pos.column + 1,
                message,
            });
        }
        Ok(source)
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text_of(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.text.as_bytes()).unwrap_or("")
    }

    /// Name from the `package` clause, if the file has one.
    pub fn package_name(&self) -> Option<&str> {
        let root = self.root();
        let mut cursor = root.walk();
        let clause = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_clause")?;
        let mut inner = clause.walk();
        let ident = clause
            .named_children(&mut inner)
            .find(|n| n.kind() == "package_identifier")?;
        Some(self.text_of(ident))
    }
}

/// Depth-first search for the first ERROR or MISSING node.
pub fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name() {
        let mut parser = new_parser();
        let src = GoSource::parse_strict(&mut parser, "package main\n\nfunc main() {}\n".into()).unwrap();
        assert_eq!(src.package_name(), Some("main"));
    }

    #[test]
    fn test_strict_rejects_broken_file() {
        let mut parser = new_parser();
        let err = GoSource::parse_strict(&mut parser, "package foo\n\nfunc broken( {\n".into())
            .err()
            .unwrap();
        assert!(err.line >= 3, "unexpected position {:?}", err);
    }

    #[test]
    fn test_lenient_keeps_partial_tree() {
        let mut parser = new_parser();
        let src = GoSource::parse_lenient(&mut parser, "package foo\n\nfunc f() { x := }\n".into()).unwrap();
        assert!(src.root().has_error());
        assert_eq!(src.package_name(), Some("foo"));
    }
}
