//! Language detection by extension. The core treats a language parser as an
//! opaque producer of a `ParsedFile` (spec §6); this module only decides
//! which one to hand a given file to.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageKind {
    Rust,
    Python,
    TypeScript,
    JavaScript,
    C,
    Cpp,
    ObjectiveC,
    Other,
}

impl LanguageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageKind::Rust => "rust",
            LanguageKind::Python => "python",
            LanguageKind::TypeScript => "typescript",
            LanguageKind::JavaScript => "javascript",
            LanguageKind::C => "c",
            LanguageKind::Cpp => "cpp",
            LanguageKind::ObjectiveC => "objective_c",
            LanguageKind::Other => "other",
        }
    }
}

pub fn detect(path: &str) -> LanguageKind {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "rs" => LanguageKind::Rust,
        "py" | "pyi" => LanguageKind::Python,
        "ts" | "tsx" | "mts" | "cts" => LanguageKind::TypeScript,
        "js" | "jsx" | "mjs" | "cjs" => LanguageKind::JavaScript,
        "h" | "hpp" | "hh" | "hxx" => LanguageKind::C,
        "c" => LanguageKind::C,
        "cpp" | "cc" | "cxx" => LanguageKind::Cpp,
        "m" | "mm" => LanguageKind::ObjectiveC,
        _ => LanguageKind::Other,
    }
}

/// Declaration file extensions recognized by the header/impl associator
/// (spec §4.3 step 1).
pub const DECLARATION_EXTENSIONS: &[&str] = &["h", "hpp", "hh", "hxx"];

/// Definition file extensions recognized by the header/impl associator.
pub const DEFINITION_EXTENSIONS: &[&str] = &["c", "cpp", "cc", "cxx", "m", "mm"];
