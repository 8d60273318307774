//! Storage capability contract (spec §1/§6) plus three implementations:
//! `postgres`/`qdrant_store` for production, `in_memory` for tests and
//! local runs without external services.

pub mod errors;
pub mod graph_store;
pub mod in_memory;
pub mod postgres;
pub mod qdrant_store;
pub mod traits;

pub use errors::StorageError;
pub use graph_store::InProcessGraphStore;
pub use in_memory::{InMemoryRelationalStore, InMemoryVectorStore};
pub use postgres::PostgresRelationalStore;
pub use qdrant_store::QdrantVectorStore;
pub use traits::{GraphStore, RelationalStore, VectorStore};
