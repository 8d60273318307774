//! Relational entities: `Repository`, `StoredFile`, `StoredSymbol`, `StoredEdge`, `Vector`.
//!
//! These mirror the tables in spec §3 one-to-one. Field names match what a
//! `sqlx::FromRow` mapping (see `codeatlas-storage`) would bind against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identifies a logical codebase being indexed. Created or upserted on the
/// first run; never duplicated across runs of the same `repo_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub repo_id: Uuid,
    pub name: String,
    pub url: Option<String>,
    pub branch: Option<String>,
    pub commit_hash: Option<String>,
    pub metadata: serde_json::Value,
}

/// Lightweight handle passed around once a repository row exists, so callers
/// don't need to thread the full `Repository` through every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryRef {
    pub repo_id: Uuid,
}

/// Symbol kind, closed set (spec §3). Unknown kinds from a language parser
/// are rejected at the schema-mapper boundary with a `mapping` error, not
/// silently coerced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Interface,
    Protocol,
    Enum,
    Variable,
    Field,
    Property,
    Package,
    Module,
    Namespace,
    Annotation,
    Macro,
    Typedef,
}

impl SymbolKind {
    /// Every accepted raw kind string, used by the schema mapper's kind
    /// mapping table and by tests asserting the closed set stays closed.
    pub const ALL: &'static [SymbolKind] = &[
        SymbolKind::Function,
        SymbolKind::Method,
        SymbolKind::Class,
        SymbolKind::Struct,
        SymbolKind::Interface,
        SymbolKind::Protocol,
        SymbolKind::Enum,
        SymbolKind::Variable,
        SymbolKind::Field,
        SymbolKind::Property,
        SymbolKind::Package,
        SymbolKind::Module,
        SymbolKind::Namespace,
        SymbolKind::Annotation,
        SymbolKind::Macro,
        SymbolKind::Typedef,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Protocol => "protocol",
            SymbolKind::Enum => "enum",
            SymbolKind::Variable => "variable",
            SymbolKind::Field => "field",
            SymbolKind::Property => "property",
            SymbolKind::Package => "package",
            SymbolKind::Module => "module",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Annotation => "annotation",
            SymbolKind::Macro => "macro",
            SymbolKind::Typedef => "typedef",
        }
    }
}

impl std::str::FromStr for SymbolKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SymbolKind::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or(())
    }
}

/// Edge type, closed set (spec §3). Mirrored by `codeatlas-graph`'s
/// relationship-label mapping, which uppercases the same strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Import,
    Includes,
    Call,
    CallsDeclaration,
    Extends,
    Implements,
    Conforms,
    ImplementsHeader,
    ImplementsDeclaration,
    DeclaresInHeader,
    InstantiatesTemplate,
    ExtendsType,
    AnnotatedWith,
    Reference,
    Overrides,
}

impl EdgeType {
    pub const ALL: &'static [EdgeType] = &[
        EdgeType::Import,
        EdgeType::Includes,
        EdgeType::Call,
        EdgeType::CallsDeclaration,
        EdgeType::Extends,
        EdgeType::Implements,
        EdgeType::Conforms,
        EdgeType::ImplementsHeader,
        EdgeType::ImplementsDeclaration,
        EdgeType::DeclaresInHeader,
        EdgeType::InstantiatesTemplate,
        EdgeType::ExtendsType,
        EdgeType::AnnotatedWith,
        EdgeType::Reference,
        EdgeType::Overrides,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Import => "import",
            EdgeType::Includes => "includes",
            EdgeType::Call => "call",
            EdgeType::CallsDeclaration => "calls_declaration",
            EdgeType::Extends => "extends",
            EdgeType::Implements => "implements",
            EdgeType::Conforms => "conforms",
            EdgeType::ImplementsHeader => "implements_header",
            EdgeType::ImplementsDeclaration => "implements_declaration",
            EdgeType::DeclaresInHeader => "declares_in_header",
            EdgeType::InstantiatesTemplate => "instantiates_template",
            EdgeType::ExtendsType => "extends_type",
            EdgeType::AnnotatedWith => "annotated_with",
            EdgeType::Reference => "reference",
            EdgeType::Overrides => "overrides",
        }
    }

    /// Upper-snake relationship label for the property graph (spec §4.6:
    /// "identity uppercasing").
    pub fn relationship_label(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

/// A source file that has been indexed. Replaced (not duplicated) whenever
/// its checksum changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub file_id: Uuid,
    pub repo_id: Uuid,
    pub path: String,
    pub language: String,
    pub size: u64,
    pub checksum: String,
    pub updated_at: DateTime<Utc>,
}

/// A named code entity with a kind, a signature and a source span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSymbol {
    pub symbol_id: Uuid,
    pub file_id: Uuid,
    pub name: String,
    pub kind: SymbolKind,
    pub signature: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
    pub start_byte: u32,
    pub end_byte: u32,
    pub docstring: Option<String>,
    pub semantic_summary: Option<String>,
}

impl StoredSymbol {
    /// True when this symbol is worth embedding, per spec §4.5 input
    /// selection: non-empty docstring OR semantic summary.
    pub fn is_embedding_candidate(&self) -> bool {
        self.docstring.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self
                .semantic_summary
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty())
    }
}

/// A directed relationship between two symbols, or a file-level pairing
/// (header/implementation) when `source_id`/`target_id` are absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEdge {
    pub edge_id: Uuid,
    pub edge_type: EdgeType,
    /// Non-empty for symbol-sourced edges; `None` for file-level pairings.
    pub source_id: Option<Uuid>,
    pub target_id: Option<Uuid>,
    pub source_file: String,
    pub target_file: Option<String>,
    pub target_module: Option<String>,
    pub line_number: Option<u32>,
}

impl StoredEdge {
    /// Invariant from spec §3: if neither `target_id` nor `target_module`
    /// is set, the edge must be a file-level pairing with `target_file` set.
    pub fn is_structurally_valid(&self) -> bool {
        self.target_id.is_some() || self.target_module.is_some() || self.target_file.is_some()
    }
}

/// One embedding for one entity revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vector {
    pub vector_id: Uuid,
    pub entity_id: Uuid,
    pub entity_type: String,
    pub embedding: Vec<f32>,
    pub content: String,
    pub model: String,
    pub chunk_index: u32,
}

/// Free-form per-run counters keyed by a label, used by summary/report code
/// that wants `BTreeMap<String, usize>` without pulling in a metrics crate.
pub type Counters = BTreeMap<String, usize>;
