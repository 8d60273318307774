//! CodeAtlas: parses a repository's source files, normalizes them into a
//! canonical symbol/edge model, writes that model into a relational store,
//! projects it into a property graph, and optionally generates embeddings
//! for retrieval.
//!
//! This crate is the thin facade over the pipeline; it owns no logic of its
//! own beyond wiring `codeatlas-parser` → `codeatlas-schema` →
//! `codeatlas-storage`/`codeatlas-graph` → `codeatlas-embedder` →
//! `codeatlas-indexer` together. Serving queries, authentication and
//! deployment orchestration are out of scope (spec §1) — this is a write
//! path only.

pub mod config;

use chrono::Utc;
use codeatlas_embedder::{Embedder, EmbedderClient, EmbedderConfig};
use codeatlas_indexer::Indexer;
use codeatlas_parser::{ParserPool, ScannedFile, detect};
use codeatlas_schema::{HeaderImplAssociator, SchemaMapper};
use codeatlas_storage::{GraphStore, InProcessGraphStore, RelationalStore, VectorStore};
use codeatlas_types::{ErrorType, IndexOptions, IndexOutcome, IndexRequest, IndexStatus, IndexerError, ParseOutput, StoredEdge, ids};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub use codeatlas_embedder as embedder;
pub use codeatlas_graph as graph;
pub use codeatlas_indexer as indexer;
pub use codeatlas_parser as parser;
pub use codeatlas_schema as schema;
pub use codeatlas_storage as storage;
pub use codeatlas_types::*;

/// One file handed to `Atlas::index_repository`: an absolute path tree-sitter
/// can read from disk, the repo-relative path used as its canonical key, and
/// its bytes (kept here only for the checksum — the parser pool re-reads the
/// file from `abs_path` itself, matching the opaque `parse(absPath, bytes)`
/// contract in spec §6).
pub struct SourceFile {
    pub abs_path: String,
    pub rel_path: String,
    pub bytes: Vec<u8>,
}

/// Wires the pipeline crates together behind one entry point.
pub struct Atlas {
    relational: Arc<dyn RelationalStore>,
    graph: Arc<dyn GraphStore>,
    vectors: Arc<dyn VectorStore>,
    embedder: Option<Arc<Embedder>>,
    pool: ParserPool,
}

impl Atlas {
    pub fn new(
        relational: Arc<dyn RelationalStore>,
        graph: Arc<dyn GraphStore>,
        vectors: Arc<dyn VectorStore>,
        embedder_config: Option<EmbedderConfig>,
        worker_count: usize,
    ) -> Result<Self, codeatlas_embedder::EmbedderError> {
        let embedder = match embedder_config {
            Some(c) => Some(Arc::new(Embedder::new(EmbedderClient::new(c)?))),
            None => None,
        };
        Ok(Self {
            relational,
            graph,
            vectors,
            embedder,
            pool: ParserPool::new(worker_count.max(1)),
        })
    }

    /// In-memory backend wiring: no database, no Qdrant, no embedding
    /// service. Useful for tests and local runs.
    pub fn in_memory(worker_count: usize) -> Self {
        Self::new(
            Arc::new(codeatlas_storage::InMemoryRelationalStore::new()),
            Arc::new(InProcessGraphStore::new()),
            Arc::new(codeatlas_storage::InMemoryVectorStore::new()),
            None,
            worker_count,
        )
        .expect("no embedder config means no client construction to fail")
    }

    /// Parses `files`, maps and associates them, then runs the full
    /// indexing pipeline against `repo_name` (spec §2: leaves-first
    /// dependency order, driven end to end from one call). `cancel` is the
    /// cooperative cancellation signal (spec §5) — cancel it to abort the
    /// run early; the total deadline in `options.total_deadline` applies
    /// regardless of whether `cancel` is ever fired.
    pub async fn index_repository(
        &self,
        repo_id: Option<Uuid>,
        repo_name: String,
        files: Vec<SourceFile>,
        options: IndexOptions,
        cancel: tokio_util::sync::CancellationToken,
    ) -> IndexOutcome {
        let repo_id = repo_id.unwrap_or_else(ids::new_id);
        let (parse_output, parse_errors) = self.build_parse_output(repo_id, files).await;

        if parse_output.files.is_empty() && !parse_errors.is_empty() {
            return IndexOutcome {
                repo_id,
                status: IndexStatus::Failed,
                files_processed: 0,
                symbols_created: 0,
                edges_created: 0,
                vectors_created: 0,
                errors: parse_errors,
                duration: Duration::default(),
            };
        }

        let request = IndexRequest {
            repo_id: Some(repo_id),
            repo_name,
            repo_url: None,
            branch: None,
            commit_hash: None,
            parse_output,
            options,
        };

        let indexer = Indexer::new(
            self.relational.clone(),
            self.graph.clone(),
            self.vectors.clone(),
            self.embedder.clone(),
        );
        let mut outcome = indexer.run(request, cancel).await;
        outcome.errors.splice(0..0, parse_errors);
        outcome
    }

    /// Parse + schema-map + associate (spec §4.1-§4.3): tree-sitter
    /// extraction, raw-kind normalization, and cross-file header/impl
    /// linking, ahead of the indexer proper.
    async fn build_parse_output(&self, repo_id: Uuid, files: Vec<SourceFile>) -> (ParseOutput, Vec<IndexerError>) {
        let checksums: std::collections::HashMap<String, String> =
            files.iter().map(|f| (f.rel_path.clone(), checksum_of(&f.bytes))).collect();
        let sizes: std::collections::HashMap<String, u64> =
            files.iter().map(|f| (f.rel_path.clone(), f.bytes.len() as u64)).collect();

        let requests: Vec<ScannedFile> = files
            .iter()
            .map(|f| ScannedFile {
                abs_path: f.abs_path.clone(),
                rel_path: f.rel_path.clone(),
                language: detect(&f.rel_path),
                size: f.bytes.len() as u64,
            })
            .collect();

        let (parsed, parser_errors) = self.pool.run(requests).await;
        let mut errors: Vec<IndexerError> = parser_errors
            .into_iter()
            .map(|e| {
                let error_type = match e.error_type {
                    codeatlas_parser::ParseErrorKind::Filesystem => ErrorType::Filesystem,
                    codeatlas_parser::ParseErrorKind::Parse => ErrorType::Parse,
                    codeatlas_parser::ParseErrorKind::Mapping => ErrorType::Mapping,
                };
                IndexerError::new(error_type, e.message).with_file(e.file)
            })
            .collect();

        let now = Utc::now();
        let mut mapped = Vec::with_capacity(parsed.len());
        let mut relationships: Vec<StoredEdge> = Vec::new();

        for p in &parsed {
            let checksum = checksums.get(&p.path).cloned().unwrap_or_default();
            let scanned_file = ScannedFile {
                abs_path: String::new(),
                rel_path: p.path.clone(),
                language: p.language,
                size: sizes.get(&p.path).copied().unwrap_or(0),
            };
            let (file, edges, mapping_errors) = SchemaMapper::map_file(repo_id, &scanned_file, p, checksum, now);
            errors.extend(mapping_errors);
            relationships.extend(edges);
            mapped.push(file);
        }

        relationships.extend(HeaderImplAssociator::associate(&mapped));

        (
            ParseOutput {
                files: mapped,
                relationships,
                metadata: serde_json::json!({}),
            },
            errors,
        )
    }
}

fn checksum_of(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
