//! Canonical data model shared by every CodeAtlas crate.
//!
//! This crate has no behavior of its own: it is the vocabulary the parser,
//! schema mapper, graph builder, embedder and indexer all speak. Keeping it
//! dependency-light (serde, uuid, thiserror, chrono) means every downstream
//! crate can depend on it without pulling in tokio, sqlx or tree-sitter.

pub mod entities;
pub mod error;
pub mod ids;
pub mod payload;

pub use entities::{
    EdgeType, Repository, RepositoryRef, StoredEdge, StoredFile, StoredSymbol, SymbolKind,
    Vector,
};
pub use error::{ErrorType, IndexerError};
pub use payload::{
    IndexOptions, IndexOutcome, IndexRequest, IndexStatus, MappedFile, ParseOutput,
};
