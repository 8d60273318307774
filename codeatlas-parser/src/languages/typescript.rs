//! TypeScript extractor: functions, classes, methods, interfaces and type
//! aliases via tree-sitter-typescript, plus imports and calls. Structurally
//! mirrors `javascript.rs` (the two grammars share most node kinds) with
//! `interface_declaration`/`type_alias_declaration` layered in.

use super::javascript::push_symbol;
use super::{field_text, node_text};
use crate::errors::ParserError;
use crate::language::LanguageKind;
use crate::parsed::{DetailedParseError, ParseErrorKind, ParsedFile, RawEdge, RawTarget};
use crate::parser_trait::LanguageParser;
use tree_sitter::{Node, Parser, Tree};

pub struct TypeScriptParser {
    parser: Parser,
}

impl TypeScriptParser {
    pub fn new() -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|e| ParserError::Init {
                language: "typescript".into(),
                message: e.to_string(),
            })?;
        Ok(Self { parser })
    }
}

impl LanguageParser for TypeScriptParser {
    fn language(&self) -> LanguageKind {
        LanguageKind::TypeScript
    }

    fn parse(&mut self, _abs_path: &str, rel_path: &str, bytes: &[u8]) -> Result<ParsedFile, ParserError> {
        let src = std::str::from_utf8(bytes).map_err(|_| ParserError::Utf8 {
            path: rel_path.to_string(),
        })?;
        let tree: Tree = self.parser.parse(src, None).ok_or_else(|| ParserError::TreeSitter {
            path: rel_path.to_string(),
        })?;
        let mut out = ParsedFile::empty(LanguageKind::TypeScript, rel_path.to_string());
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
            "interface_declaration" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "interface", child, src, out);
                    if let Some(extends) = child.child_by_field_name("extends_clause") {
                        let mut c2 = extends.walk();
                        for base in extends.children(&mut c2) {
                            if base.kind() == "type_identifier" {
                                out.raw_edges.push(RawEdge {
                                    edge_type: "extends".into(),
                                    source_symbol: Some(name.clone()),
                                    target: RawTarget::Name(node_text(base, src).to_string()),
                                    line_number: Some(crate::languages::line1(child.start_position().row)),
                                });
                            }
                        }
                    }
                }
            }
            "type_alias_declaration" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "typedef", child, src, out);
                }
            }
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
                        let mut c2 = heritage.walk();
                        for base in heritage.children(&mut c2) {
                            if matches!(base.kind(), "identifier" | "type_identifier") {
                                out.raw_edges.push(RawEdge {
                                    edge_type: "extends".into(),
                                    source_symbol: Some(name.clone()),
                                    target: RawTarget::Name(node_text(base, src).to_string()),
                                    line_number: Some(crate::languages::line1(child.start_position().row)),
                                });
                            }
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
