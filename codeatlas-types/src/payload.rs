//! External interface contracts (spec §6): the indexing payload the core
//! receives from a CLI/HTTP caller, and the result it hands back. Both are
//! plain serde structs — building the CLI/HTTP surface itself is out of
//! scope (spec §1).

use crate::entities::{StoredEdge, StoredFile, StoredSymbol};
use crate::error::IndexerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// One file plus the symbols it owns, already through the schema mapper and
/// header/impl associator. This is the unit the indexer replaces atomically
/// when a file is re-indexed (spec §3: "all symbols of a file are replaced
/// atomically").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedFile {
    pub file: StoredFile,
    pub symbols: Vec<StoredSymbol>,
}

/// The mapped, associated output of parsing a repository: ready for the
/// indexer's validate/write/project/embed pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOutput {
    pub files: Vec<MappedFile>,
    pub relationships: Vec<StoredEdge>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Per-run knobs (spec §6 / §4.4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOptions {
    pub incremental: bool,
    pub skip_vectors: bool,
    pub batch_size: usize,
    pub worker_count: usize,
    pub embedding_model: Option<String>,
    pub use_transactions: bool,
    /// Per-run total deadline (spec §5): the whole pipeline is aborted with
    /// `status = failed` if it's still running past this.
    pub total_deadline: Duration,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            incremental: false,
            skip_vectors: false,
            batch_size: 50,
            worker_count: num_cpus(),
            embedding_model: None,
            use_transactions: true,
            total_deadline: Duration::from_secs(30 * 60),
        }
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// The indexing payload (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRequest {
    pub repo_id: Option<Uuid>,
    pub repo_name: String,
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub commit_hash: Option<String>,
    pub parse_output: ParseOutput,
    pub options: IndexOptions,
}

/// Final run status (spec §4.4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexStatus {
    Success,
    SuccessWithWarnings,
    PartialSuccess,
    Failed,
}

/// The indexing result (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOutcome {
    pub repo_id: Uuid,
    pub status: IndexStatus,
    pub files_processed: usize,
    pub symbols_created: usize,
    pub edges_created: usize,
    pub vectors_created: usize,
    pub errors: Vec<IndexerError>,
    pub duration: Duration,
}

impl IndexOutcome {
    /// Derive the closed-set status from accumulated errors and per-file
    /// success/failure counts (spec §4.4.4).
    pub fn derive_status(
        files_attempted: usize,
        files_succeeded: usize,
        core_errors: usize,
        warning_errors: usize,
    ) -> IndexStatus {
        if files_attempted > 0 && files_succeeded == 0 {
            return IndexStatus::Failed;
        }
        if core_errors > 0 && files_succeeded > 0 {
            return IndexStatus::PartialSuccess;
        }
        if core_errors > 0 {
            return IndexStatus::Failed;
        }
        if warning_errors > 0 {
            return IndexStatus::SuccessWithWarnings;
        }
        IndexStatus::Success
    }
}
