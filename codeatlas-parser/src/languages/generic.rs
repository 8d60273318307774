//! Fallback for extensions with no dedicated grammar: emits one file-level
//! symbol so the schema mapper always has a `File` row to attach, with no
//! edges. Mirrors the teacher's `GenericTextAst` fallback role.

use crate::errors::ParserError;
use crate::language::LanguageKind;
use crate::parsed::{ParsedFile, RawSymbol};
use crate::parser_trait::LanguageParser;

pub struct GenericTextParser;

impl LanguageParser for GenericTextParser {
    fn language(&self) -> LanguageKind {
        LanguageKind::Other
    }

    fn parse(&mut self, _abs_path: &str, rel_path: &str, bytes: &[u8]) -> Result<ParsedFile, ParserError> {
        let text = String::from_utf8_lossy(bytes);
        let line_count = text.lines().count().max(1) as u32;
        let mut out = ParsedFile::empty(LanguageKind::Other, rel_path.to_string());
        out.symbols.push(RawSymbol {
            name: rel_path.to_string(),
            raw_kind: "module".into(),
            signature: None,
            start_line: 1,
            end_line: line_count,
            start_byte: 0,
            end_byte: bytes.len(),
            docstring: None,
        });
        Ok(out)
    }
}
