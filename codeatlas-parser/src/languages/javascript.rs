//! JavaScript/TypeScript shared extractor core: functions, classes, methods,
//! imports and calls. `typescript.rs` re-uses `walk` and layers
//! `interface_declaration`/`type_alias_declaration` on top.

use super::{field_text, node_text};
use crate::errors::ParserError;
use crate::language::LanguageKind;
use crate::parsed::{DetailedParseError, ParseErrorKind, ParsedFile, RawEdge, RawSymbol, RawTarget};
use crate::parser_trait::LanguageParser;
use tree_sitter::{Node, Parser, Tree};

pub struct JavaScriptParser {
    parser: Parser,
}

impl JavaScriptParser {
    pub fn new() -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|e| ParserError::Init {
                language: "javascript".into(),
                message: e.to_string(),
            })?;
        Ok(Self { parser })
    }
}

impl LanguageParser for JavaScriptParser {
    fn language(&self) -> LanguageKind {
        LanguageKind::JavaScript
    }

    fn parse(&mut self, _abs_path: &str, rel_path: &str, bytes: &[u8]) -> Result<ParsedFile, ParserError> {
        let src = std::str::from_utf8(bytes).map_err(|_| ParserError::Utf8 {
            path: rel_path.to_string(),
        })?;
        let tree: Tree = self.parser.parse(src, None).ok_or_else(|| ParserError::TreeSitter {
            path: rel_path.to_string(),
        })?;
        let mut out = ParsedFile::empty(LanguageKind::JavaScript, rel_path.to_string());
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

/// Shared JS/TS tree walk, reused by the TypeScript parser which layers
/// `interface_declaration`/`type_alias_declaration` handling on top before
/// falling through to these common cases.
pub(crate) fn walk(node: Node, src: &[u8], out: &mut ParsedFile, enclosing: Option<&str>, in_class: bool) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "function_declaration" | "function_expression" | "arrow_function" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "function", child, src, out);
                    walk(child, src, out, Some(&name), false);
                } else {
                    walk(child, src, out, enclosing, in_class);
                }
            }
            "method_definition" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "method", child, src, out);
                    walk(child, src, out, Some(&name), false);
                }
            }
            "class_declaration" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "class", child, src, out);
                    if let Some(heritage) = find_heritage(child) {
                        for base in heritage_names(heritage, src) {
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
            "import_statement" => {
                if let Some(source) = child.child_by_field_name("source") {
                    let module = node_text(source, src).trim_matches(['"', '\'']).to_string();
                    out.raw_edges.push(RawEdge {
                        edge_type: "import".into(),
                        source_symbol: enclosing.map(str::to_string),
                        target: RawTarget::Module(module),
                        line_number: Some(crate::languages::line1(child.start_position().row)),
                    });
                }
            }
            "call_expression" => {
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

fn find_heritage(class_node: Node) -> Option<Node> {
    let mut cursor = class_node.walk();
    class_node
        .children(&mut cursor)
        .find(|n| n.kind() == "class_heritage")
}

fn heritage_names(node: Node, src: &[u8]) -> Vec<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|n| matches!(n.kind(), "identifier" | "member_expression"))
        .map(|n| node_text(n, src).to_string())
        .collect()
}

pub(crate) fn push_symbol(name: &str, raw_kind: &str, node: Node, src: &[u8], out: &mut ParsedFile) {
    let doc = super::leading_comment_doc(node, src, "comment");
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
