//! Closed error taxonomy (spec §7).
//!
//! Every stage emits `IndexerError` values instead of bubbling arbitrary
//! error types. This keeps the final report machine-readable and avoids the
//! polymorphic-`Error`-base pattern the design notes call out as needing
//! re-architecture (spec §9): a tagged variant plus a free-form message,
//! not a trait object hierarchy.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The closed taxonomy from spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Validation,
    Filesystem,
    Parse,
    Mapping,
    Database,
    Graph,
    Embedding,
    Network,
    Timeout,
    Cancelled,
    Internal,
}

/// A single reported failure, carrying enough context (entity id / file
/// path) to let the caller locate it without re-running the pipeline.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{error_type:?}: {message}")]
pub struct IndexerError {
    pub error_type: ErrorType,
    pub message: String,
    pub entity_id: Option<Uuid>,
    pub file_path: Option<String>,
    pub retryable: bool,
}

impl IndexerError {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            entity_id: None,
            file_path: None,
            retryable: false,
        }
    }

    pub fn with_entity(mut self, entity_id: Uuid) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorType::Validation, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorType::Cancelled, "run cancelled")
    }

    /// Stage-level policy from spec §7: these types abort the whole run
    /// instead of being accumulated and recovered from locally.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.error_type,
            ErrorType::Validation | ErrorType::Cancelled | ErrorType::Timeout
        )
    }
}
