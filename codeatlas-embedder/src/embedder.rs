//! Input selection, batching and fan-out (spec §4.5): picks embeddable
//! symbols, groups them into `batch_size` chunks, and runs chunks
//! concurrently up to the configured in-flight limit.

use crate::client::EmbedderClient;
use crate::errors::EmbedderError;
use codeatlas_types::{ErrorType, IndexerError, MappedFile, Vector, ids};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub entity_id: Uuid,
    pub entity_type: String,
    pub content: String,
}

/// Input selection (spec §4.5): symbols with a non-empty docstring or
/// semantic summary. File-level module summaries are not produced by any
/// upstream component in this pipeline, so only symbols are selected.
pub fn select_inputs(files: &[MappedFile]) -> Vec<EmbeddingInput> {
    files
        .iter()
        .flat_map(|f| f.symbols.iter())
        .filter(|s| s.is_embedding_candidate())
        .map(|s| EmbeddingInput {
            entity_id: s.symbol_id,
            entity_type: "symbol".to_string(),
            content: s
                .docstring
                .clone()
                .filter(|d| !d.trim().is_empty())
                .or_else(|| s.semantic_summary.clone())
                .unwrap_or_default(),
        })
        .collect()
}

pub struct Embedder {
    client: EmbedderClient,
}

impl Embedder {
    pub fn new(client: EmbedderClient) -> Self {
        Self { client }
    }

    pub fn config(&self) -> &crate::config::EmbedderConfig {
        self.client.config()
    }

    /// Runs every input through the embedding service. Returns the produced
    /// vectors plus any non-fatal per-batch errors (spec §4.4.4:
    /// `success_with_warnings` when the embedder returns some empties). A
    /// fatal error (dimension mismatch, permanent HTTP failure) aborts
    /// immediately — spec §4.5: "mismatch is a permanent error and fails the
    /// run". `cancel` carries the cooperative cancellation signal (spec
    /// §5): checked before starting and raced against the whole batch
    /// fan-out, so a cancelled run doesn't wait for in-flight HTTP calls to
    /// drain.
    pub async fn run(
        &self,
        inputs: Vec<EmbeddingInput>,
        model: &str,
        cancel: &CancellationToken,
    ) -> Result<(Vec<Vector>, Vec<IndexerError>), IndexerError> {
        if cancel.is_cancelled() {
            return Err(IndexerError::cancelled());
        }

        let batch_size = self.client.config().batch_size.max(1);
        let batches: Vec<Vec<EmbeddingInput>> = inputs
            .chunks(batch_size)
            .map(|c| c.to_vec())
            .collect();
        let concurrency = self.client.config().max_concurrent_batches.max(1);

        let fanout = stream::iter(batches)
            .map(|batch| async move {
                let texts: Vec<String> = batch.iter().map(|i| i.content.clone()).collect();
                match self.client.embed_batch(&texts).await {
                    Ok(embeddings) => Ok(batch
                        .into_iter()
                        .zip(embeddings)
                        .map(|(input, embedding)| Vector {
                            vector_id: ids::new_id(),
                            entity_id: input.entity_id,
                            entity_type: input.entity_type,
                            embedding,
                            content: input.content,
                            model: model.to_string(),
                            chunk_index: 0,
                        })
                        .collect::<Vec<_>>()),
                    Err(e) => Err(embedder_error_to_indexer_error(e)),
                }
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<Result<Vec<Vector>, IndexerError>>>();

        let results = tokio::select! {
            r = fanout => r,
            _ = cancel.cancelled() => return Err(IndexerError::cancelled()),
        };

        let mut vectors = Vec::new();
        let mut warnings = Vec::new();
        for r in results {
            match r {
                Ok(v) => vectors.extend(v),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warnings.push(e),
            }
        }
        Ok((vectors, warnings))
    }
}

fn embedder_error_to_indexer_error(e: EmbedderError) -> IndexerError {
    let fatal = e.is_fatal();
    let err = IndexerError::new(ErrorType::Embedding, e.to_string());
    if fatal { err } else { err.retryable() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use codeatlas_types::{StoredFile, StoredSymbol, SymbolKind};

    fn mapped_file() -> MappedFile {
        MappedFile {
            file: StoredFile {
                file_id: Uuid::new_v4(),
                repo_id: Uuid::new_v4(),
                path: "lib.rs".into(),
                language: "rust".into(),
                size: 1,
                checksum: "x".into(),
                updated_at: Utc::now(),
            },
            symbols: vec![
                StoredSymbol {
                    symbol_id: Uuid::new_v4(),
                    file_id: Uuid::new_v4(),
                    name: "documented".into(),
                    kind: SymbolKind::Function,
                    signature: None,
                    start_line: 1,
                    end_line: 1,
                    start_byte: 0,
                    end_byte: 1,
                    docstring: Some("does a thing".into()),
                    semantic_summary: None,
                },
                StoredSymbol {
                    symbol_id: Uuid::new_v4(),
                    file_id: Uuid::new_v4(),
                    name: "undocumented".into(),
                    kind: SymbolKind::Function,
                    signature: None,
                    start_line: 2,
                    end_line: 2,
                    start_byte: 2,
                    end_byte: 3,
                    docstring: None,
                    semantic_summary: None,
                },
            ],
        }
    }

    #[test]
    fn selects_only_documented_symbols() {
        let inputs = select_inputs(&[mapped_file()]);
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].content, "does a thing");
    }
}
