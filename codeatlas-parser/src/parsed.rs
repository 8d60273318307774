//! The uniform shape every language parser produces (spec §6: "each
//! language parser exposes `parse(absPath, bytes) -> ParsedFile{...}`; the
//! core never inspects language-specific AST detail beyond this shape").

use crate::language::LanguageKind;
use serde::{Deserialize, Serialize};

/// A file handed to the parser pool. Scanning/gitignore semantics are out
/// of scope (spec §1); this struct is the boundary the scanner hands off
/// across.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedFile {
    pub abs_path: String,
    pub rel_path: String,
    pub language: LanguageKind,
    pub size: u64,
}

/// A symbol as the raw parser sees it, before the schema mapper assigns ids
/// or validates the kind against the canonical closed set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSymbol {
    pub name: String,
    /// Language-specific kind string (e.g. "function_item", "class_def").
    /// The schema mapper's kind table resolves this to a `SymbolKind`.
    pub raw_kind: String,
    pub signature: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
    pub start_byte: usize,
    pub end_byte: usize,
    pub docstring: Option<String>,
}

/// The target of a raw edge: either a local name resolvable within the same
/// file (schema mapper tries same-file resolution first), or an external
/// module string that stays unresolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RawTarget {
    Name(String),
    Module(String),
}

/// A relationship the parser observed syntactically, before cross-symbol
/// resolution. `source_symbol` is `None` for file-level relationships (e.g.
/// a bare `import` with no enclosing symbol).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEdge {
    pub edge_type: String,
    pub source_symbol: Option<String>,
    pub target: RawTarget,
    pub line_number: Option<u32>,
}

/// Kind of failure recorded alongside a file (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Filesystem,
    Parse,
    Mapping,
}

/// A single parse failure with enough context to locate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedParseError {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub error_type: ParseErrorKind,
}

/// The per-file parser output. May be partial: a language with error
/// tolerance can return the symbols it did manage to extract alongside
/// `errors` describing what it couldn't.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFile {
    pub language: LanguageKind,
    pub path: String,
    pub symbols: Vec<RawSymbol>,
    pub raw_edges: Vec<RawEdge>,
    pub errors: Vec<DetailedParseError>,
}

impl ParsedFile {
    pub fn empty(language: LanguageKind, path: String) -> Self {
        Self {
            language,
            path,
            symbols: Vec::new(),
            raw_edges: Vec::new(),
            errors: Vec::new(),
        }
    }
}
