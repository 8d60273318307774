//! Rate-limited, retrying, batched client for an external embedding HTTP
//! service (spec §4.5). Targets a generic `/v1/embeddings`-style contract
//! (`{input, model} -> {data: [{index, embedding}]}`) rather than any one
//! vendor's native API, so the indexer can point this crate at whatever
//! OpenAI-compatible endpoint the deployment wires up.

pub mod client;
pub mod config;
pub mod embedder;
pub mod errors;
pub mod rate_limiter;
pub mod retry;

pub use client::EmbedderClient;
pub use config::EmbedderConfig;
pub use embedder::{Embedder, EmbeddingInput, select_inputs};
pub use errors::EmbedderError;
