//! Storage-local error taxonomy, converted to `codeatlas_types::IndexerError`
//! at the indexer boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),

    #[error("graph store error: {0}")]
    Graph(String),

    #[error("vector store error: {0}")]
    Vector(String),

    #[error("dimension invariant violated: store is {store}-dimensional, got {got}")]
    DimensionMismatch { store: usize, got: usize },

    #[error("not found: {0}")]
    NotFound(String),
}
