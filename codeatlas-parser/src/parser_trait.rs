//! The parser contract (spec §6). A `LanguageParser` owns its tree-sitter
//! `Parser` instance — parsers are not thread-safe, so the pool gives each
//! worker its own set (spec §4.1).

use crate::errors::ParserError;
use crate::language::LanguageKind;
use crate::parsed::ParsedFile;

pub trait LanguageParser: Send {
    fn language(&self) -> LanguageKind;

    /// Parse one file's bytes into the uniform `ParsedFile` shape.
    /// Implementations should prefer returning partial symbols with
    /// `errors` populated over failing the whole file outright.
    fn parse(&mut self, abs_path: &str, rel_path: &str, bytes: &[u8]) -> Result<ParsedFile, ParserError>;
}
