//! HTTP client for the embedding service (spec §4.5/§6): POSTs
//! `{input: string[], model: string}` to `config.endpoint` and expects back
//! `{data: [{index, embedding}]}`. Rate limiting, retry and the dimension
//! check all live here so `Embedder` only deals in batches of text.

use crate::config::EmbedderConfig;
use crate::errors::EmbedderError;
use crate::rate_limiter::TokenBucket;
use crate::retry::{backoff_delay, sample_jitter};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

pub struct EmbedderClient {
    http: Client,
    config: EmbedderConfig,
    limiter: TokenBucket,
}

impl EmbedderClient {
    /// Builds the HTTP client with a request timeout (spec §5) and, if
    /// configured, a bearer `Authorization` header so every request carries
    /// auth without each call site having to set it.
    pub fn new(config: EmbedderConfig) -> Result<Self, EmbedderError> {
        let mut headers = header::HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {key}"))
                    .map_err(|e| EmbedderError::Config(format!("invalid API key header: {e}")))?,
            );
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| EmbedderError::Config(format!("failed to build http client: {e}")))?;

        let limiter = TokenBucket::new(config.max_requests_per_second);
        Ok(Self { http, config, limiter })
    }

    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }

    /// Embeds one batch, retrying transient failures with backoff up to
    /// `max_retries`. Returns embeddings in input order.
    #[tracing::instrument(level = "debug", skip_all, fields(batch_size = inputs.len()))]
    pub async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        let mut attempt = 0u32;
        loop {
            self.limiter.acquire().await;
            match self.try_once(inputs).await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = backoff_delay(self.config.base_delay, self.config.max_delay, attempt, sample_jitter(attempt));
                    warn!(attempt, error = %e, delay_ms = delay.as_millis(), "retrying embedding batch");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    return Err(EmbedderError::RetriesExhausted {
                        attempts: attempt + 1,
                        last: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_once(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        let req = EmbeddingRequest {
            input: inputs,
            model: &self.config.model,
        };

        let resp = self
            .http
            .post(&self.config.endpoint)
            .json(&req)
            .send()
            .await
            .map_err(|e| EmbedderError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_http_failure(status.as_u16(), body));
        }

        let parsed: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| EmbedderError::Malformed(e.to_string()))?;

        let mut out = vec![Vec::new(); inputs.len()];
        for datum in parsed.data {
            if datum.index >= out.len() {
                return Err(EmbedderError::Malformed(format!(
                    "response index {} out of range for batch of {}",
                    datum.index,
                    inputs.len()
                )));
            }
            if datum.embedding.len() != self.config.dimensions {
                return Err(EmbedderError::DimensionMismatch {
                    got: datum.embedding.len(),
                    want: self.config.dimensions,
                });
            }
            out[datum.index] = datum.embedding;
        }
        debug!("embedded batch successfully");
        Ok(out)
    }
}

fn classify_http_failure(status: u16, body: String) -> EmbedderError {
    match status {
        429 | 500..=599 => EmbedderError::Transient { status, body },
        _ => EmbedderError::PermanentHttp { status, body },
    }
}
