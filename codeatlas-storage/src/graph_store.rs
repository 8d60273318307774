//! In-process `GraphStore`: wraps a `codeatlas_graph::GraphBuilder` behind a
//! mutex so the indexer's worker pool can upsert concurrently. The property
//! graph lives for the process lifetime and is rebuilt incrementally on
//! each run; no separate graph database is required by spec §4.6.

use crate::errors::StorageError;
use crate::traits::GraphStore;
use async_trait::async_trait;
use codeatlas_graph::GraphBuilder;
use codeatlas_types::{StoredEdge, StoredSymbol};
use tokio::sync::Mutex;

pub struct InProcessGraphStore {
    builder: Mutex<GraphBuilder>,
}

impl Default for InProcessGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InProcessGraphStore {
    pub fn new() -> Self {
        Self {
            builder: Mutex::new(GraphBuilder::new()),
        }
    }

    pub async fn vertex_count(&self) -> usize {
        self.builder.lock().await.vertex_count()
    }

    pub async fn edge_count(&self) -> usize {
        self.builder.lock().await.edge_count()
    }
}

#[async_trait]
impl GraphStore for InProcessGraphStore {
    async fn upsert_symbol_vertex(&self, symbol: &StoredSymbol) -> Result<bool, StorageError> {
        Ok(self.builder.lock().await.upsert_symbol(symbol))
    }

    async fn upsert_edge_relationship(&self, edge: &StoredEdge) -> Result<bool, StorageError> {
        Ok(self.builder.lock().await.upsert_edge(edge))
    }
}
