use thiserror::Error;

/// Errors a single `LanguageParser::parse` call can fail with. A fatal
/// initialization error (spec §4.1: "fatal language-parser initialization
/// error aborts the whole run") is distinguished from an ordinary per-file
/// parse failure by `ParserError::Init`.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("failed to initialize parser for {language}: {message}")]
    Init { language: String, message: String },

    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("tree-sitter failed to parse {path}")]
    TreeSitter { path: String },

    #[error("utf-8 decode error in {path}")]
    Utf8 { path: String },
}

impl ParserError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ParserError::Init { .. })
    }
}
