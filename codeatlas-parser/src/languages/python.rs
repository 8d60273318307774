//! Python extractor: functions, classes and methods via tree-sitter-python,
//! plus `import`/`from ... import` and call expressions as raw edges.

use super::{field_text, node_text};
use crate::errors::ParserError;
use crate::language::LanguageKind;
use crate::parsed::{DetailedParseError, ParseErrorKind, ParsedFile, RawEdge, RawSymbol, RawTarget};
use crate::parser_trait::LanguageParser;
use tree_sitter::{Node, Parser, Tree};

pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParserError::Init {
                language: "python".into(),
                message: e.to_string(),
            })?;
        Ok(Self { parser })
    }
}

impl LanguageParser for PythonParser {
    fn language(&self) -> LanguageKind {
        LanguageKind::Python
    }

    fn parse(&mut self, _abs_path: &str, rel_path: &str, bytes: &[u8]) -> Result<ParsedFile, ParserError> {
        let src = std::str::from_utf8(bytes).map_err(|_| ParserError::Utf8 {
            path: rel_path.to_string(),
        })?;
        let tree: Tree = self.parser.parse(src, None).ok_or_else(|| ParserError::TreeSitter {
            path: rel_path.to_string(),
        })?;

        let mut out = ParsedFile::empty(LanguageKind::Python, rel_path.to_string());
        if tree.root_node().has_error() {
            out.errors.push(DetailedParseError {
                file: rel_path.to_string(),
                line: 1,
                column: 0,
                message: "syntax error recovered via tree-sitter error nodes".into(),
                error_type: ParseErrorKind::Parse,
            });
        }
        walk(tree.root_node(), bytes, &mut out, None, false);
        Ok(out)
    }
}

fn walk(node: Node, src: &[u8], out: &mut ParsedFile, enclosing: Option<&str>, in_class: bool) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "function_definition" => {
                if let Some(name) = field_text(child, "name", src) {
                    let raw_kind = if in_class { "method" } else { "function" };
                    push_symbol(&name, raw_kind, child, src, out);
                    walk(child, src, out, Some(&name), false);
                }
            }
            "class_definition" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "class", child, src, out);
                    if let Some(bases) = child.child_by_field_name("superclasses") {
                        for base in base_names(bases, src) {
                            out.raw_edges.push(RawEdge {
                                edge_type: "extends".into(),
                                source_symbol: Some(name.clone()),
                                target: RawTarget::Name(base),
                                line_number: Some(crate::languages::line1(child.start_position().row)),
                            });
                        }
                    }
                    walk(child, src, out, Some(&name), true);
                }
            }
            "import_statement" | "import_from_statement" => {
                for module in import_modules(child, src) {
                    out.raw_edges.push(RawEdge {
                        edge_type: "import".into(),
                        source_symbol: enclosing.map(str::to_string),
                        target: RawTarget::Module(module),
                        line_number: Some(crate::languages::line1(child.start_position().row)),
                    });
                }
            }
            "call" => {
                if let Some(func) = child.child_by_field_name("function") {
                    let callee = node_text(func, src).to_string();
                    out.raw_edges.push(RawEdge {
                        edge_type: "call".into(),
                        source_symbol: enclosing.map(str::to_string),
                        target: RawTarget::Name(callee),
                        line_number: Some(crate::languages::line1(child.start_position().row)),
                    });
                }
                walk(child, src, out, enclosing, in_class);
            }
            _ => walk(child, src, out, enclosing, in_class),
        }
    }
}

fn base_names(node: Node, src: &[u8]) -> Vec<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|n| n.kind() == "identifier")
        .map(|n| node_text(n, src).to_string())
        .collect()
}

fn import_modules(node: Node, src: &[u8]) -> Vec<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|n| matches!(n.kind(), "dotted_name" | "aliased_import"))
        .map(|n| node_text(n, src).to_string())
        .collect()
}

fn push_symbol(name: &str, raw_kind: &str, node: Node, src: &[u8], out: &mut ParsedFile) {
    let doc = docstring_of(node, src);
    out.symbols.push(RawSymbol {
        name: name.to_string(),
        raw_kind: raw_kind.to_string(),
        signature: Some(node_text(node, src).lines().next().unwrap_or("").trim().to_string()),
        start_line: crate::languages::line1(node.start_position().row),
        end_line: crate::languages::line1(node.end_position().row),
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        docstring: doc,
    });
}

/// Python docstrings are the first statement in the body, a bare string
/// expression — not a leading comment like C-family languages.
fn docstring_of(node: Node, src: &[u8]) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    Some(
        node_text(expr, src)
            .trim_matches(|c| c == '"' || c == '\'')
            .trim()
            .to_string(),
    )
}
