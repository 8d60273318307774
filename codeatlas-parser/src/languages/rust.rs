//! Rust extractor: functions, structs, enums, traits, impls and modules via
//! tree-sitter-rust, plus `use` imports and call expressions as raw edges.

use super::{field_text, leading_comment_doc, node_text};
use crate::errors::ParserError;
use crate::language::LanguageKind;
use crate::parsed::{DetailedParseError, ParseErrorKind, ParsedFile, RawEdge, RawSymbol, RawTarget};
use crate::parser_trait::LanguageParser;
use tree_sitter::{Node, Parser, Tree};

pub struct RustParser {
    parser: Parser,
}

impl RustParser {
    pub fn new() -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|e| ParserError::Init {
                language: "rust".into(),
                message: e.to_string(),
            })?;
        Ok(Self { parser })
    }
}

impl LanguageParser for RustParser {
    fn language(&self) -> LanguageKind {
        LanguageKind::Rust
    }

    fn parse(&mut self, _abs_path: &str, rel_path: &str, bytes: &[u8]) -> Result<ParsedFile, ParserError> {
        let src = std::str::from_utf8(bytes).map_err(|_| ParserError::Utf8 {
            path: rel_path.to_string(),
        })?;
        let tree: Tree = self.parser.parse(src, None).ok_or_else(|| ParserError::TreeSitter {
            path: rel_path.to_string(),
        })?;

        let mut out = ParsedFile::empty(LanguageKind::Rust, rel_path.to_string());
        if tree.root_node().has_error() {
            out.errors.push(DetailedParseError {
                file: rel_path.to_string(),
                line: 1,
                column: 0,
                message: "syntax error recovered via tree-sitter error nodes".into(),
                error_type: ParseErrorKind::Parse,
            });
        }
        walk(tree.root_node(), bytes, &mut out, None);
        Ok(out)
    }
}

fn walk(node: Node, src: &[u8], out: &mut ParsedFile, enclosing: Option<&str>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "function_item" => {
                if let Some(name) = field_text(child, "name", src) {
                    let raw_kind = if enclosing.is_some() { "method" } else { "function" };
                    push_symbol(&name, raw_kind, child, src, out);
                    walk(child, src, out, Some(&name));
                }
            }
            "struct_item" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "struct", child, src, out);
                }
            }
            "enum_item" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "enum", child, src, out);
                }
            }
            "trait_item" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "trait", child, src, out);
                    walk(child, src, out, Some(&name));
                }
            }
            "impl_item" => {
                let type_name = field_text(child, "type", src);
                if let (Some(trait_name), Some(ty)) = (field_text(child, "trait", src), type_name.clone()) {
                    out.raw_edges.push(RawEdge {
                        edge_type: "implements".into(),
                        source_symbol: Some(ty),
                        target: RawTarget::Name(trait_name),
                        line_number: Some(crate::languages::line1(child.start_position().row)),
                    });
                }
                walk(child, src, out, type_name.as_deref());
            }
            "mod_item" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "module", child, src, out);
                }
                walk(child, src, out, enclosing);
            }
            "macro_definition" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "macro_definition", child, src, out);
                }
            }
            "use_declaration" => {
                if let Some(arg) = child.child_by_field_name("argument") {
                    let path = node_text(arg, src).replace(' ', "");
                    out.raw_edges.push(RawEdge {
                        edge_type: "import".into(),
                        source_symbol: enclosing.map(str::to_string),
                        target: RawTarget::Module(path),
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
                walk(child, src, out, enclosing);
            }
            _ => walk(child, src, out, enclosing),
        }
    }
}

fn push_symbol(name: &str, raw_kind: &str, node: Node, src: &[u8], out: &mut ParsedFile) {
    let doc = leading_comment_doc(node, src, "line_comment");
    out.symbols.push(RawSymbol {
        name: name.to_string(),
        raw_kind: raw_kind.to_string(),
        signature: Some(signature_line(node, src)),
        start_line: crate::languages::line1(node.start_position().row),
        end_line: crate::languages::line1(node.end_position().row),
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        docstring: doc,
    });
}

/// First line of the node's text, a cheap but usually-correct stand-in for
/// "the signature" without re-deriving it from individual AST fields.
fn signature_line(node: Node, src: &[u8]) -> String {
    node_text(node, src).lines().next().unwrap_or("").trim().to_string()
}
