//! C/C++/Objective-C extractor via tree-sitter-c. Deliberately narrow: it
//! recognizes the declaration/definition split the header/impl associator
//! (spec §4.3) needs — prototype vs defined function, `#include` edges,
//! struct specifiers and calls — rather than the full C++/ObjC grammars,
//! which tree-sitter-c cannot parse anyway. Good enough for every construct
//! that can appear identically in a `.h`/`.c` pair.

use super::{field_text, leading_comment_doc, node_text};
use crate::errors::ParserError;
use crate::language::LanguageKind;
use crate::parsed::{DetailedParseError, ParseErrorKind, ParsedFile, RawEdge, RawSymbol, RawTarget};
use crate::parser_trait::LanguageParser;
use tree_sitter::{Node, Parser, Tree};

pub struct CParser {
    parser: Parser,
    language: LanguageKind,
}

impl CParser {
    pub fn new(language: LanguageKind) -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .map_err(|e| ParserError::Init {
                language: language.as_str().into(),
                message: e.to_string(),
            })?;
        Ok(Self { parser, language })
    }
}

impl LanguageParser for CParser {
    fn language(&self) -> LanguageKind {
        self.language
    }

    fn parse(&mut self, _abs_path: &str, rel_path: &str, bytes: &[u8]) -> Result<ParsedFile, ParserError> {
        let src = std::str::from_utf8(bytes).map_err(|_| ParserError::Utf8 {
            path: rel_path.to_string(),
        })?;
        let tree: Tree = self.parser.parse(src, None).ok_or_else(|| ParserError::TreeSitter {
            path: rel_path.to_string(),
        })?;
        let mut out = ParsedFile::empty(self.language, rel_path.to_string());
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
            "preproc_include" => {
                if let Some(path) = child.child_by_field_name("path") {
                    let raw = node_text(path, src);
                    let module = raw.trim_matches(|c| c == '"' || c == '<' || c == '>').to_string();
                    out.raw_edges.push(RawEdge {
                        edge_type: "includes".into(),
                        source_symbol: None,
                        target: RawTarget::Module(module),
                        line_number: Some(crate::languages::line1(child.start_position().row)),
                    });
                }
            }
            "function_definition" => {
                let declarator = child.child_by_field_name("declarator");
                let name = declarator.and_then(|d| declarator_name(d, src));
                if let Some(name) = name {
                    push_symbol(&name, "function", child, src, out);
                    walk(child, src, out, Some(&name));
                } else {
                    walk(child, src, out, enclosing);
                }
            }
            "declaration" => {
                let declarator = child.child_by_field_name("declarator");
                if let Some(declarator) = declarator {
                    if contains_function_declarator(declarator) {
                        if let Some(name) = declarator_name(declarator, src) {
                            push_symbol(&name, "function_declaration", child, src, out);
                        }
                    }
                }
            }
            "struct_specifier" => {
                if let Some(name) = field_text(child, "name", src) {
                    push_symbol(&name, "struct", child, src, out);
                }
                walk(child, src, out, enclosing);
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

/// Follows the `declarator` field chain through pointer/array/function
/// wrappers down to the innermost `identifier`.
fn declarator_name(node: Node, src: &[u8]) -> Option<String> {
    if node.kind() == "identifier" || node.kind() == "field_identifier" {
        return Some(node_text(node, src).to_string());
    }
    node.child_by_field_name("declarator")
        .and_then(|inner| declarator_name(inner, src))
}

/// True if a `declarator` field chain passes through a `function_declarator`
/// node, i.e. this declaration is a function prototype rather than a plain
/// variable.
fn contains_function_declarator(node: Node) -> bool {
    if node.kind() == "function_declarator" {
        return true;
    }
    node.child_by_field_name("declarator")
        .map(contains_function_declarator)
        .unwrap_or(false)
}

fn push_symbol(name: &str, raw_kind: &str, node: Node, src: &[u8], out: &mut ParsedFile) {
    let doc = leading_comment_doc(node, src, "comment");
    out.symbols.push(RawSymbol {
        name: name.to_string(),
        raw_kind: raw_kind.to_string(),
        signature: Some(node_text(node, src).lines().next().unwrap_or("").trim().trim_end_matches(';').to_string()),
        start_line: crate::languages::line1(node.start_position().row),
        end_line: crate::languages::line1(node.end_position().row),
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        docstring: doc,
    });
}
