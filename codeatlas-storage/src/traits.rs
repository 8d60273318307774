//! Storage capability contract (spec §1: "the underlying relational/graph/
//! vector store, treated as a capability contract"). The indexer depends
//! only on these traits; concrete backends live in `postgres`, `qdrant_store`
//! and `in_memory`.

use crate::errors::StorageError;
use async_trait::async_trait;
use codeatlas_types::{Repository, StoredEdge, StoredFile, StoredSymbol, Vector};
use std::collections::HashMap;
use uuid::Uuid;

#[async_trait]
pub trait RelationalStore: Send + Sync {
    async fn upsert_repository(&self, repo: &Repository) -> Result<(), StorageError>;

    /// `None` when the file has never been indexed (spec §4.4.1 step 3:
    /// incremental filter).
    async fn get_file_checksum(&self, repo_id: Uuid, path: &str) -> Result<Option<String>, StorageError>;

    /// Batched `ON CONFLICT (repo_id, path) DO UPDATE` (spec §4.4.1 step 5).
    /// Returns the authoritative path → file_id map.
    async fn upsert_files(&self, files: &[StoredFile]) -> Result<HashMap<String, Uuid>, StorageError>;

    /// Deletes old symbols for `file_id` then inserts `symbols` (spec §4.4.1
    /// step 6: "all symbols of a file are replaced atomically").
    async fn replace_symbols(&self, file_id: Uuid, symbols: &[StoredSymbol]) -> Result<(), StorageError>;

    /// Batched insert; orphan edges (unresolved `target_module`) are valid
    /// (spec §4.4.1 step 7).
    async fn insert_edges(&self, edges: &[StoredEdge]) -> Result<(), StorageError>;

    async fn insert_vectors(&self, vectors: &[Vector]) -> Result<(), StorageError>;

    /// Bulk-load session tuning (spec §4.4.1 step 4). No-op by default;
    /// `PostgresRelationalStore` overrides it. Must be released even on
    /// error by the caller invoking `finalize_bulk_load`.
    async fn prepare_bulk_load(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Best-effort maintenance (spec §4.4.1 step 10): failure here is
    /// warning-level, never fatal — callers should log, not propagate.
    async fn finalize_bulk_load(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Upserts a vertex for a persisted symbol (spec §4.6). A `false`
    /// return means the kind has no graph label and was skipped.
    async fn upsert_symbol_vertex(&self, symbol: &StoredSymbol) -> Result<bool, StorageError>;

    /// Upserts a relationship for a persisted edge. A `false` return means
    /// the missing-target policy applied and nothing was projected.
    async fn upsert_edge_relationship(&self, edge: &StoredEdge) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Spec §3 dimension invariant: the first upsert fixes the store's
    /// dimension; later upserts at a different length fail fast.
    async fn upsert_vector(&self, vector: &Vector) -> Result<(), StorageError>;
}
