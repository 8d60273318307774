//! Pipeline orchestration (spec §4.4): validates a mapped, associated
//! `IndexRequest`, writes it through the storage capability contract,
//! projects it into the property graph, and optionally generates
//! embeddings. This crate has no parsing or schema-mapping logic of its
//! own — that lives upstream in `codeatlas-parser`/`codeatlas-schema`.

pub mod backpressure;
pub mod batch_optimizer;
pub mod pipeline;
pub mod validate;

pub use pipeline::Indexer;
