//! In-memory reference implementation of the storage contract. Mirrors the
//! role the teacher's `NoOpVectorSearch` plays for Qdrant-less testing, but
//! actually retains what it's given so indexer tests (spec §8 scenarios)
//! can assert on post-run state without a database.

use crate::errors::StorageError;
use crate::traits::{RelationalStore, VectorStore};
use async_trait::async_trait;
use codeatlas_types::{Repository, StoredEdge, StoredFile, StoredSymbol, Vector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryRelationalStore {
    repositories: Mutex<HashMap<Uuid, Repository>>,
    files: Mutex<HashMap<(Uuid, String), StoredFile>>,
    symbols: Mutex<HashMap<Uuid, Vec<StoredSymbol>>>,
    edges: Mutex<Vec<StoredEdge>>,
    vectors: Mutex<Vec<Vector>>,
}

impl InMemoryRelationalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }

    pub async fn symbol_count(&self) -> usize {
        self.symbols.lock().await.values().map(|v| v.len()).sum()
    }

    pub async fn edge_count(&self) -> usize {
        self.edges.lock().await.len()
    }

    pub async fn vector_count(&self) -> usize {
        self.vectors.lock().await.len()
    }
}

#[async_trait]
impl RelationalStore for InMemoryRelationalStore {
    async fn upsert_repository(&self, repo: &Repository) -> Result<(), StorageError> {
        self.repositories.lock().await.insert(repo.repo_id, repo.clone());
        Ok(())
    }

    async fn get_file_checksum(&self, repo_id: Uuid, path: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .files
            .lock()
            .await
            .get(&(repo_id, path.to_string()))
            .map(|f| f.checksum.clone()))
    }

    async fn upsert_files(&self, files: &[StoredFile]) -> Result<HashMap<String, Uuid>, StorageError> {
        let mut guard = self.files.lock().await;
        let mut out = HashMap::with_capacity(files.len());
        for file in files {
            out.insert(file.path.clone(), file.file_id);
            guard.insert((file.repo_id, file.path.clone()), file.clone());
        }
        Ok(out)
    }

    async fn replace_symbols(&self, file_id: Uuid, symbols: &[StoredSymbol]) -> Result<(), StorageError> {
        self.symbols.lock().await.insert(file_id, symbols.to_vec());
        Ok(())
    }

    async fn insert_edges(&self, edges: &[StoredEdge]) -> Result<(), StorageError> {
        self.edges.lock().await.extend(edges.iter().cloned());
        Ok(())
    }

    async fn insert_vectors(&self, vectors: &[Vector]) -> Result<(), StorageError> {
        self.vectors.lock().await.extend(vectors.iter().cloned());
        Ok(())
    }
}

/// In-memory `VectorStore` enforcing the same dimension invariant a real
/// vector database would (spec §3).
#[derive(Default)]
pub struct InMemoryVectorStore {
    dimension: AtomicUsize,
    vectors: Mutex<Vec<Vector>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.vectors.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert_vector(&self, vector: &Vector) -> Result<(), StorageError> {
        let got = vector.embedding.len();
        let expected = self.dimension.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
            if cur == 0 { Some(got) } else { Some(cur) }
        }).unwrap_or(got);
        if expected != got {
            return Err(StorageError::DimensionMismatch { store: expected, got });
        }
        self.vectors.lock().await.push(vector.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeatlas_types::EdgeType;
    use chrono::Utc;

    fn repo() -> Repository {
        Repository {
            repo_id: Uuid::new_v4(),
            name: "demo".into(),
            url: None,
            branch: None,
            commit_hash: None,
            metadata: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn upsert_repository_then_checksum_lookup_reflects_files() {
        let store = InMemoryRelationalStore::new();
        let r = repo();
        store.upsert_repository(&r).await.unwrap();
        let file = StoredFile {
            file_id: Uuid::new_v4(),
            repo_id: r.repo_id,
            path: "a.rs".into(),
            language: "rust".into(),
            size: 1,
            checksum: "abc".into(),
            updated_at: Utc::now(),
        };
        store.upsert_files(&[file]).await.unwrap();
        assert_eq!(
            store.get_file_checksum(r.repo_id, "a.rs").await.unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(store.get_file_checksum(r.repo_id, "missing.rs").await.unwrap(), None);
    }

    #[tokio::test]
    async fn vector_store_rejects_dimension_mismatch() {
        let store = InMemoryVectorStore::new();
        let v = |dim: usize| Vector {
            vector_id: Uuid::new_v4(),
            entity_id: Uuid::new_v4(),
            entity_type: "symbol".into(),
            embedding: vec![0.0; dim],
            content: "x".into(),
            model: "m".into(),
            chunk_index: 0,
        };
        store.upsert_vector(&v(3)).await.unwrap();
        let err = store.upsert_vector(&v(4)).await.unwrap_err();
        assert!(matches!(err, StorageError::DimensionMismatch { store: 3, got: 4 }));
    }

    #[tokio::test]
    async fn edge_insert_accumulates() {
        let store = InMemoryRelationalStore::new();
        let edge = StoredEdge {
            edge_id: Uuid::new_v4(),
            edge_type: EdgeType::Call,
            source_id: None,
            target_id: None,
            source_file: "a.rs".into(),
            target_file: Some("b.rs".into()),
            target_module: None,
            line_number: None,
        };
        store.insert_edges(&[edge]).await.unwrap();
        assert_eq!(store.edge_count().await, 1);
    }
}
