//! Orchestrates the ten-stage pipeline (spec §4.4.1) over the storage,
//! graph and embedder crates. No stage here touches a raw `ParsedFile` —
//! everything arriving in `IndexRequest.parse_output` is already mapped and
//! associated.
//!
//! Transaction discipline (spec §4.4.3) is approximated at this level
//! rather than inside the storage trait: a file's symbols and its outgoing
//! edges are treated as one unit. In `use_transactions` mode a
//! `replace_symbols` failure skips that file's edges and marks the file
//! failed; in no-transaction mode edges are attempted independently so
//! partial mid-file state can survive, per spec.

use crate::backpressure::{StreamingController, estimate_retained_bytes};
use crate::batch_optimizer::BatchOptimizer;
use crate::validate;
use codeatlas_embedder::Embedder;
use codeatlas_storage::{GraphStore, RelationalStore, VectorStore};
use codeatlas_types::{
    ErrorType, IndexOutcome, IndexRequest, IndexStatus, IndexerError, MappedFile, Repository, StoredEdge,
    StoredFile, ids,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

pub struct Indexer {
    relational: Arc<dyn RelationalStore>,
    graph: Arc<dyn GraphStore>,
    vectors: Arc<dyn VectorStore>,
    embedder: Option<Arc<Embedder>>,
}

impl Indexer {
    pub fn new(
        relational: Arc<dyn RelationalStore>,
        graph: Arc<dyn GraphStore>,
        vectors: Arc<dyn VectorStore>,
        embedder: Option<Arc<Embedder>>,
    ) -> Self {
        Self {
            relational,
            graph,
            vectors,
            embedder,
        }
    }

    /// Runs the ten-stage pipeline under a per-run total deadline (spec §5,
    /// `request.options.total_deadline`) and a cooperative cancellation
    /// signal. Exceeding the deadline or observing `cancel` fires is
    /// reported as `status = failed` rather than left to hang or to return
    /// a partial, silently-truncated result.
    pub async fn run(&self, request: IndexRequest, cancel: CancellationToken) -> IndexOutcome {
        let repo_id = request.repo_id.unwrap_or_else(ids::new_id);
        let deadline = request.options.total_deadline;
        let started = Instant::now();

        match tokio::time::timeout(deadline, self.run_inner(request, repo_id, started, cancel)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(repo = %repo_id, deadline_secs = deadline.as_secs(), "run exceeded total deadline");
                IndexOutcome {
                    repo_id,
                    status: IndexStatus::Failed,
                    files_processed: 0,
                    symbols_created: 0,
                    edges_created: 0,
                    vectors_created: 0,
                    errors: vec![IndexerError::new(ErrorType::Timeout, "run exceeded total deadline")],
                    duration: started.elapsed(),
                }
            }
        }
    }

    #[tracing::instrument(level = "info", skip_all, fields(repo = %request.repo_name))]
    async fn run_inner(
        &self,
        request: IndexRequest,
        repo_id: Uuid,
        started: Instant,
        cancel: CancellationToken,
    ) -> IndexOutcome {
        let mut errors: Vec<IndexerError> = Vec::new();

        // 1. Validate — no side effects on failure.
        if let Err(e) = validate::validate(&request) {
            warn!(error = %e, "validation rejected payload");
            return IndexOutcome {
                repo_id,
                status: IndexStatus::Failed,
                files_processed: 0,
                symbols_created: 0,
                edges_created: 0,
                vectors_created: 0,
                errors: vec![e],
                duration: started.elapsed(),
            };
        }

        // 2. Upsert repository.
        let repo = Repository {
            repo_id,
            name: request.repo_name.clone(),
            url: request.repo_url.clone(),
            branch: request.branch.clone(),
            commit_hash: request.commit_hash.clone(),
            metadata: request.parse_output.metadata.clone(),
        };
        if let Err(e) = self.relational.upsert_repository(&repo).await {
            errors.push(IndexerError::new(ErrorType::Database, e.to_string()).retryable());
            return finished(repo_id, IndexStatus::Failed, 0, 0, 0, 0, errors, started);
        }

        let mut cancelled = false;

        // 3. Incremental filter.
        let mut files_to_process: Vec<&MappedFile> = Vec::with_capacity(request.parse_output.files.len());
        for mf in &request.parse_output.files {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            if request.options.incremental {
                match self.relational.get_file_checksum(repo_id, &mf.file.path).await {
                    Ok(Some(existing)) if existing == mf.file.checksum => continue,
                    Ok(_) => {}
                    Err(e) => {
                        errors.push(
                            IndexerError::new(ErrorType::Database, e.to_string()).with_file(mf.file.path.clone()),
                        );
                        continue;
                    }
                }
            }
            files_to_process.push(mf);
        }

        if files_to_process.is_empty() {
            info!("nothing to do after incremental filter");
            let status = if errors.is_empty() { IndexStatus::Success } else { IndexStatus::SuccessWithWarnings };
            return finished(repo_id, status, 0, 0, 0, 0, errors, started);
        }

        // 4. Bulk prepare. Best-effort, warning-level (spec step 4/10).
        if let Err(e) = self.relational.prepare_bulk_load().await {
            warn!(error = %e, "bulk-load tuning failed, continuing without it");
        }

        let batch_optimizer = BatchOptimizer::new(
            request.options.batch_size.clamp(10, 100),
            10,
            100,
            Duration::from_millis(500),
        );
        let controller = StreamingController::new(512, request.options.worker_count.max(1) * 2);

        // 5. Write files, batched by the adaptive optimizer.
        let stored_files: Vec<StoredFile> = files_to_process.iter().map(|mf| mf.file.clone()).collect();
        let mut file_id_map: HashMap<String, Uuid> = HashMap::new();
        let mut idx = 0usize;
        while idx < stored_files.len() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let size = batch_optimizer.current();
            let end = (idx + size).min(stored_files.len());
            let chunk = &stored_files[idx..end];
            let t0 = Instant::now();
            match self.relational.upsert_files(chunk).await {
                Ok(map) => file_id_map.extend(map),
                Err(e) => {
                    for f in chunk {
                        errors.push(
                            IndexerError::new(ErrorType::Database, e.to_string())
                                .with_file(f.path.clone())
                                .retryable(),
                        );
                    }
                }
            }
            batch_optimizer.record_latency(t0.elapsed());
            idx = end;
        }

        // 6/7. Replace symbols then write each file's outgoing edges.
        let edges_by_source: HashMap<&str, Vec<&StoredEdge>> =
            request.parse_output.relationships.iter().fold(HashMap::new(), |mut acc, e| {
                acc.entry(e.source_file.as_str()).or_default().push(e);
                acc
            });

        let mut symbols_created = 0usize;
        let mut inserted_edges: Vec<StoredEdge> = Vec::new();
        let mut files_for_graph: Vec<&MappedFile> = Vec::new();

        for mf in &files_to_process {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let Some(&file_id) = file_id_map.get(mf.file.path.as_str()) else {
                continue;
            };

            let file_edges: Vec<StoredEdge> = edges_by_source
                .get(mf.file.path.as_str())
                .map(|v| v.iter().map(|e| (*e).clone()).collect())
                .unwrap_or_default();

            let _slot = controller.acquire_slot().await;
            let estimate = estimate_retained_bytes(mf.file.size as usize, mf.symbols.len(), file_edges.len());
            let guard = match controller.reserve(estimate).await {
                Ok(g) => g,
                Err(e) => {
                    errors.push(
                        IndexerError::new(ErrorType::Internal, e.to_string()).with_file(mf.file.path.clone()),
                    );
                    continue;
                }
            };

            let t0 = Instant::now();
            let replace_result = self.relational.replace_symbols(file_id, &mf.symbols).await;
            batch_optimizer.record_latency(t0.elapsed());
            drop(guard);

            match replace_result {
                Ok(()) => {
                    symbols_created += mf.symbols.len();
                    let edges_ok = if file_edges.is_empty() {
                        true
                    } else {
                        match self.relational.insert_edges(&file_edges).await {
                            Ok(()) => {
                                inserted_edges.extend(file_edges.clone());
                                true
                            }
                            Err(e) => {
                                errors.push(
                                    IndexerError::new(ErrorType::Database, e.to_string())
                                        .with_file(mf.file.path.clone())
                                        .retryable(),
                                );
                                false
                            }
                        }
                    };
                    if edges_ok || !request.options.use_transactions {
                        files_for_graph.push(mf);
                    }
                }
                Err(e) => {
                    errors.push(
                        IndexerError::new(ErrorType::Database, e.to_string())
                            .with_file(mf.file.path.clone())
                            .retryable(),
                    );
                    if !request.options.use_transactions && !file_edges.is_empty() {
                        if self.relational.insert_edges(&file_edges).await.is_ok() {
                            inserted_edges.extend(file_edges);
                        }
                    }
                }
            }
        }

        // 8. Build graph: vertices for every symbol of a successfully
        // written file, relationships for every edge whose endpoints both
        // resolved to symbols (spec §4.6 missing-target policy).
        for mf in &files_for_graph {
            for sym in &mf.symbols {
                if let Err(e) = self.graph.upsert_symbol_vertex(sym).await {
                    errors.push(
                        IndexerError::new(ErrorType::Graph, e.to_string()).with_entity(sym.symbol_id).retryable(),
                    );
                }
            }
        }
        for edge in inserted_edges.iter().filter(|e| e.source_id.is_some() && e.target_id.is_some()) {
            if let Err(e) = self.graph.upsert_edge_relationship(edge).await {
                errors.push(IndexerError::new(ErrorType::Graph, e.to_string()).with_entity(edge.edge_id).retryable());
            }
        }

        // 9. Generate embeddings.
        let mut vectors_created = 0usize;
        if !cancelled && !request.options.skip_vectors {
            if let Some(embedder) = &self.embedder {
                let mapped: Vec<MappedFile> = files_for_graph.iter().map(|mf| (*mf).clone()).collect();
                let inputs = codeatlas_embedder::select_inputs(&mapped);
                if !inputs.is_empty() {
                    let model = request
                        .options
                        .embedding_model
                        .clone()
                        .unwrap_or_else(|| embedder.config().model.clone());
                    match embedder.run(inputs, &model, &cancel).await {
                        Ok((vectors, warnings)) => {
                            errors.extend(warnings);
                            for v in &vectors {
                                if let Err(e) = self.vectors.upsert_vector(v).await {
                                    errors.push(IndexerError::new(ErrorType::Database, e.to_string()).retryable());
                                    continue;
                                }
                                vectors_created += 1;
                            }
                            if let Err(e) = self.relational.insert_vectors(&vectors).await {
                                errors.push(IndexerError::new(ErrorType::Database, e.to_string()).retryable());
                            }
                        }
                        Err(e) => errors.push(e),
                    }
                }
            }
        }

        // 10. Analyze and reset. Best-effort, warning-level only.
        if let Err(e) = self.relational.finalize_bulk_load().await {
            warn!(error = %e, "post-run maintenance failed");
        }

        let files_succeeded = files_for_graph.len();
        let files_attempted = files_to_process.len();

        let status = if cancelled {
            errors.push(IndexerError::cancelled());
            IndexStatus::Failed
        } else {
            // "Core" failures are ones that block a file/symbol/edge from
            // being written; embedding partial-completion is warning-level
            // (spec §4.4.4: "embeddings when skip_vectors=false but
            // embedder returns some empties").
            let warning_errors = errors.iter().filter(|e| matches!(e.error_type, ErrorType::Embedding)).count();
            let core_errors = errors.len() - warning_errors;
            IndexOutcome::derive_status(files_attempted, files_succeeded, core_errors, warning_errors)
        };

        finished(
            repo_id,
            status,
            files_succeeded,
            symbols_created,
            inserted_edges.len(),
            vectors_created,
            errors,
            started,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn finished(
    repo_id: Uuid,
    status: IndexStatus,
    files_processed: usize,
    symbols_created: usize,
    edges_created: usize,
    vectors_created: usize,
    errors: Vec<IndexerError>,
    started: Instant,
) -> IndexOutcome {
    IndexOutcome {
        repo_id,
        status,
        files_processed,
        symbols_created,
        edges_created,
        vectors_created,
        errors,
        duration: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use async_trait::async_trait;
    use codeatlas_storage::{InMemoryRelationalStore, InMemoryVectorStore, InProcessGraphStore, RelationalStore, StorageError};
    use codeatlas_types::{EdgeType, IndexOptions, ParseOutput, StoredSymbol, SymbolKind};
    use std::collections::HashMap;

    /// Wraps an in-memory store and fails `replace_symbols` for one chosen
    /// file, to exercise the mid-run failure path (a later file in the same
    /// payload should still succeed independently).
    struct FlakyRelationalStore {
        inner: InMemoryRelationalStore,
        fails_file: Uuid,
    }

    #[async_trait]
    impl RelationalStore for FlakyRelationalStore {
        async fn upsert_repository(&self, repo: &codeatlas_types::Repository) -> Result<(), StorageError> {
            self.inner.upsert_repository(repo).await
        }
        async fn get_file_checksum(&self, repo_id: Uuid, path: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_file_checksum(repo_id, path).await
        }
        async fn upsert_files(&self, files: &[StoredFile]) -> Result<HashMap<String, Uuid>, StorageError> {
            self.inner.upsert_files(files).await
        }
        async fn replace_symbols(&self, file_id: Uuid, symbols: &[StoredSymbol]) -> Result<(), StorageError> {
            if file_id == self.fails_file {
                return Err(StorageError::Database("simulated write failure".into()));
            }
            self.inner.replace_symbols(file_id, symbols).await
        }
        async fn insert_edges(&self, edges: &[StoredEdge]) -> Result<(), StorageError> {
            self.inner.insert_edges(edges).await
        }
        async fn insert_vectors(&self, vectors: &[codeatlas_types::Vector]) -> Result<(), StorageError> {
            self.inner.insert_vectors(vectors).await
        }
    }

    fn symbol(file_id: Uuid, name: &str, docstring: Option<&str>) -> StoredSymbol {
        StoredSymbol {
            symbol_id: Uuid::new_v4(),
            file_id,
            name: name.into(),
            kind: SymbolKind::Function,
            signature: None,
            start_line: 1,
            end_line: 2,
            start_byte: 0,
            end_byte: 10,
            docstring: docstring.map(str::to_string),
            semantic_summary: None,
        }
    }

    fn file(path: &str, symbols: Vec<StoredSymbol>) -> MappedFile {
        MappedFile {
            file: StoredFile {
                file_id: Uuid::new_v4(),
                repo_id: Uuid::new_v4(),
                path: path.into(),
                language: "rust".into(),
                size: 100,
                checksum: format!("checksum-{path}"),
                updated_at: Utc::now(),
            },
            symbols,
        }
    }

    fn indexer() -> (Indexer, Arc<InMemoryRelationalStore>, Arc<InProcessGraphStore>) {
        let relational = Arc::new(InMemoryRelationalStore::new());
        let graph = Arc::new(InProcessGraphStore::new());
        let vectors = Arc::new(InMemoryVectorStore::new());
        let idx = Indexer::new(relational.clone(), graph.clone(), vectors, None);
        (idx, relational, graph)
    }

    #[tokio::test]
    async fn fresh_index_with_no_vectors_succeeds() {
        let (idx, relational, graph) = indexer();
        let mut a_sym = symbol(Uuid::new_v4(), "a", None);
        let mut b_sym = symbol(Uuid::new_v4(), "b", None);
        let a = file("a.rs", vec![]);
        a_sym.file_id = a.file.file_id;
        let b = file("b.rs", vec![]);
        b_sym.file_id = b.file.file_id;
        let mut a = a;
        let mut b = b;
        a.symbols.push(a_sym.clone());
        b.symbols.push(b_sym.clone());

        let edge = StoredEdge {
            edge_id: Uuid::new_v4(),
            edge_type: EdgeType::Call,
            source_id: Some(a_sym.symbol_id),
            target_id: Some(b_sym.symbol_id),
            source_file: "a.rs".into(),
            target_file: None,
            target_module: None,
            line_number: None,
        };

        let request = IndexRequest {
            repo_id: None,
            repo_name: "demo".into(),
            repo_url: None,
            branch: None,
            commit_hash: None,
            parse_output: ParseOutput {
                files: vec![a, b],
                relationships: vec![edge],
                metadata: serde_json::json!({}),
            },
            options: IndexOptions {
                skip_vectors: true,
                ..IndexOptions::default()
            },
        };

        let outcome = idx.run(request, CancellationToken::new()).await;
        assert_eq!(outcome.status, IndexStatus::Success);
        assert_eq!(outcome.files_processed, 2);
        assert_eq!(outcome.symbols_created, 2);
        assert_eq!(outcome.edges_created, 1);
        assert_eq!(outcome.vectors_created, 0);
        assert!(outcome.errors.is_empty());
        assert_eq!(relational.file_count().await, 2);
        assert_eq!(graph.vertex_count().await, 2);
        assert_eq!(graph.edge_count().await, 1);
    }

    #[tokio::test]
    async fn incremental_rerun_with_unchanged_checksum_is_a_no_op() {
        let (idx, _relational, _graph) = indexer();
        let f = file("a.rs", vec![symbol(Uuid::new_v4(), "a", None)]);

        let mk_request = |f: MappedFile, incremental: bool| IndexRequest {
            repo_id: None,
            repo_name: "demo".into(),
            repo_url: None,
            branch: None,
            commit_hash: None,
            parse_output: ParseOutput {
                files: vec![f],
                relationships: vec![],
                metadata: serde_json::json!({}),
            },
            options: IndexOptions {
                skip_vectors: true,
                incremental,
                ..IndexOptions::default()
            },
        };

        let first = idx.run(mk_request(f.clone(), false), CancellationToken::new()).await;
        assert_eq!(first.status, IndexStatus::Success);
        assert_eq!(first.files_processed, 1);

        let mut second_request = mk_request(f, true);
        second_request.repo_id = Some(first.repo_id);
        let second = idx.run(second_request, CancellationToken::new()).await;
        assert_eq!(second.status, IndexStatus::Success);
        assert_eq!(second.files_processed, 0);
        assert_eq!(second.symbols_created, 0);
        assert_eq!(second.edges_created, 0);
    }

    #[tokio::test]
    async fn validation_failure_aborts_before_any_write() {
        let (idx, relational, _graph) = indexer();
        let edge = StoredEdge {
            edge_id: Uuid::new_v4(),
            edge_type: EdgeType::Call,
            source_id: Some(Uuid::new_v4()),
            target_id: Some(Uuid::new_v4()),
            source_file: "a.rs".into(),
            target_file: None,
            target_module: None,
            line_number: None,
        };
        let request = IndexRequest {
            repo_id: None,
            repo_name: "demo".into(),
            repo_url: None,
            branch: None,
            commit_hash: None,
            parse_output: ParseOutput {
                files: vec![file("a.rs", vec![])],
                relationships: vec![edge],
                metadata: serde_json::json!({}),
            },
            options: IndexOptions::default(),
        };

        let outcome = idx.run(request, CancellationToken::new()).await;
        assert_eq!(outcome.status, IndexStatus::Failed);
        assert_eq!(outcome.files_processed, 0);
        assert_eq!(relational.file_count().await, 0);
    }

    #[tokio::test]
    async fn mid_run_write_failure_excludes_only_the_failing_file() {
        let a = file("a.rs", vec![symbol(Uuid::new_v4(), "a", None)]);
        let b = file("b.rs", vec![symbol(Uuid::new_v4(), "b", None)]);

        let relational = Arc::new(FlakyRelationalStore {
            inner: InMemoryRelationalStore::new(),
            fails_file: a.file.file_id,
        });
        let graph = Arc::new(InProcessGraphStore::new());
        let vectors = Arc::new(InMemoryVectorStore::new());
        let idx = Indexer::new(relational.clone(), graph.clone(), vectors, None);

        let request = IndexRequest {
            repo_id: None,
            repo_name: "demo".into(),
            repo_url: None,
            branch: None,
            commit_hash: None,
            parse_output: ParseOutput {
                files: vec![a, b],
                relationships: vec![],
                metadata: serde_json::json!({}),
            },
            options: IndexOptions {
                skip_vectors: true,
                use_transactions: true,
                ..IndexOptions::default()
            },
        };

        let outcome = idx.run(request, CancellationToken::new()).await;
        assert_eq!(outcome.status, IndexStatus::PartialSuccess);
        assert_eq!(outcome.files_processed, 1);
        assert_eq!(outcome.symbols_created, 1);
        assert_eq!(graph.vertex_count().await, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(outcome.errors[0].error_type, ErrorType::Database));
    }

    #[tokio::test]
    async fn header_impl_declarations_carry_through_unmodified() {
        let (idx, relational, _graph) = indexer();
        let mut header = file("widget.h", vec![]);
        let mut implementation = file("widget.c", vec![]);
        let header_sym = symbol(header.file.file_id, "Widget::draw", None);
        let impl_sym = symbol(implementation.file.file_id, "Widget::draw", Some("renders the widget"));
        header.symbols.push(header_sym);
        implementation.symbols.push(impl_sym.clone());

        let edge = StoredEdge {
            edge_id: Uuid::new_v4(),
            edge_type: EdgeType::ImplementsHeader,
            source_id: Some(impl_sym.symbol_id),
            target_id: Some(header.symbols[0].symbol_id),
            source_file: "widget.c".into(),
            target_file: Some("widget.h".into()),
            target_module: None,
            line_number: None,
        };

        let request = IndexRequest {
            repo_id: None,
            repo_name: "demo".into(),
            repo_url: None,
            branch: None,
            commit_hash: None,
            parse_output: ParseOutput {
                files: vec![header, implementation],
                relationships: vec![edge],
                metadata: serde_json::json!({}),
            },
            options: IndexOptions {
                skip_vectors: true,
                ..IndexOptions::default()
            },
        };

        let outcome = idx.run(request, CancellationToken::new()).await;
        assert_eq!(outcome.status, IndexStatus::Success);
        assert_eq!(outcome.files_processed, 2);
        assert_eq!(outcome.edges_created, 1);
        assert_eq!(relational.symbol_count().await, 2);
    }
}
