//! Embedder configuration (spec §4.5/§6). Knobs mirror the contract
//! directly: batch size, rate limit, retry budget, request timeout, and the
//! dimension every returned vector must match.

use std::time::Duration;

/// Which embedding backend `endpoint` points at (spec §6: "backend kind
/// {openai, local}"). Authentication differs by kind: a hosted OpenAI-style
/// backend requires a bearer token, a local one typically doesn't.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbeddingBackend {
    OpenAi,
    Local,
}

#[derive(Clone, Debug)]
pub struct EmbedderConfig {
    pub backend: EmbeddingBackend,
    /// Full URL of the `/v1/embeddings`-shaped endpoint.
    pub endpoint: String,
    /// Bearer token sent as `Authorization: Bearer <key>`. Optional — a
    /// local backend commonly runs without auth.
    pub api_key: Option<String>,
    pub model: String,
    pub dimensions: usize,
    pub batch_size: usize,
    pub max_requests_per_second: f64,
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Per-HTTP-request deadline (spec §5, default 30s).
    pub request_timeout: Duration,
    /// Batches in flight at once; spec §4.5 ties this to the rate budget.
    pub max_concurrent_batches: usize,
}

impl EmbedderConfig {
    /// Recognized vars, per spec §6's canonical configuration environment:
    /// `EMBEDDING_BACKEND` (default "openai"), `API_ENDPOINT` (required),
    /// `API_KEY` (optional), `MODEL` (default "text-embedding-3-small"),
    /// `DIMENSIONS` (default 1536), `BATCH_SIZE` (default 50),
    /// `MAX_REQUESTS_PER_SECOND` (default 5), `MAX_RETRIES` (default 5),
    /// `BASE_RETRY_DELAY` / `MAX_RETRY_DELAY` (milliseconds, default 200 /
    /// 30000), `TIMEOUT` (seconds, default 30).
    pub fn from_env() -> Result<Self, crate::errors::EmbedderError> {
        use crate::errors::EmbedderError;
        use std::env;

        let backend = match env::var("EMBEDDING_BACKEND").unwrap_or_else(|_| "openai".into()).to_ascii_lowercase().as_str() {
            "local" => EmbeddingBackend::Local,
            _ => EmbeddingBackend::OpenAi,
        };
        let endpoint =
            env::var("API_ENDPOINT").map_err(|_| EmbedderError::Config("API_ENDPOINT is required".into()))?;
        let api_key = env::var("API_KEY").ok().filter(|k| !k.is_empty());
        let model = env::var("MODEL").unwrap_or_else(|_| "text-embedding-3-small".into());
        let dimensions = env::var("DIMENSIONS").ok().and_then(|s| s.parse().ok()).unwrap_or(1536);
        let batch_size = env::var("BATCH_SIZE").ok().and_then(|s| s.parse().ok()).unwrap_or(50);
        let max_requests_per_second = env::var("MAX_REQUESTS_PER_SECOND")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5.0);
        let max_retries = env::var("MAX_RETRIES").ok().and_then(|s| s.parse().ok()).unwrap_or(5);
        let base_delay_ms: u64 = env::var("BASE_RETRY_DELAY").ok().and_then(|s| s.parse().ok()).unwrap_or(200);
        let max_delay_ms: u64 = env::var("MAX_RETRY_DELAY").ok().and_then(|s| s.parse().ok()).unwrap_or(30_000);
        let timeout_secs: u64 = env::var("TIMEOUT").ok().and_then(|s| s.parse().ok()).unwrap_or(30);

        Ok(Self {
            backend,
            endpoint,
            api_key,
            model,
            dimensions,
            batch_size,
            max_requests_per_second,
            max_retries,
            base_delay: Duration::from_millis(base_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
            request_timeout: Duration::from_secs(timeout_secs),
            max_concurrent_batches: max_requests_per_second.ceil().max(1.0) as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_defaults_to_openai_for_unrecognized_values() {
        assert_eq!(
            match "bogus".to_ascii_lowercase().as_str() {
                "local" => EmbeddingBackend::Local,
                _ => EmbeddingBackend::OpenAi,
            },
            EmbeddingBackend::OpenAi
        );
    }
}
