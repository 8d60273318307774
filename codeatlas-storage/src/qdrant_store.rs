//! Qdrant-backed `VectorStore`. Enforces the dimension invariant (spec §3)
//! in-process before ever calling out, since Qdrant itself would otherwise
//! just reject the point with a less specific error.

use crate::errors::StorageError;
use crate::traits::VectorStore;
use async_trait::async_trait;
use codeatlas_types::Vector;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{PointStruct, UpsertPointsBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;

pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: AtomicUsize,
    dimension_set: OnceCell<()>,
}

impl QdrantVectorStore {
    pub fn new(client: Qdrant, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
            dimension: AtomicUsize::new(0),
            dimension_set: OnceCell::new(),
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert_vector(&self, vector: &Vector) -> Result<(), StorageError> {
        let got = vector.embedding.len();
        self.dimension_set
            .get_or_init(|| async { self.dimension.store(got, Ordering::SeqCst) })
            .await;
        let expected = self.dimension.load(Ordering::SeqCst);
        if got != expected {
            return Err(StorageError::DimensionMismatch { store: expected, got });
        }

        let point = PointStruct::new(
            vector.vector_id.to_string(),
            vector.embedding.clone(),
            [
                ("entity_id", vector.entity_id.to_string().into()),
                ("entity_type", vector.entity_type.clone().into()),
                ("model", vector.model.clone().into()),
                ("chunk_index", (vector.chunk_index as i64).into()),
            ],
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(self.collection.clone(), vec![point]))
            .await
            .map_err(|e| StorageError::Vector(e.to_string()))?;
        Ok(())
    }
}
