//! Embedder-local error taxonomy. Converted to `codeatlas_types::IndexerError`
//! at the indexer boundary rather than exposed directly (spec §9: tagged
//! variant, no polymorphic `Error` base).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("config error: {0}")]
    Config(String),

    #[error("network error calling embedding service: {0}")]
    Network(String),

    #[error("embedding service returned HTTP {status}: {body}")]
    PermanentHttp { status: u16, body: String },

    #[error("embedding service rate-limited or unavailable (HTTP {status}): {body}")]
    Transient { status: u16, body: String },

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("response dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl EmbedderError {
    /// Transient failures (429/5xx/network) are retried with backoff;
    /// everything else fails the batch immediately (spec §4.5).
    pub fn is_retryable(&self) -> bool {
        matches!(self, EmbedderError::Network(_) | EmbedderError::Transient { .. })
    }

    /// Permanent failures fail the whole run, not just the batch (spec §4.5:
    /// "Dimension check... mismatch is a permanent error and fails the run").
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EmbedderError::DimensionMismatch { .. } | EmbedderError::PermanentHttp { .. }
        )
    }
}
