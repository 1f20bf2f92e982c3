//! Embedding providers.
//!
//! Providers turn a seeker's vent or a helper's experience narrative into a
//! fixed-dimension vector. Vectors from one provider instance are comparable
//! by cosine similarity; vectors from different providers are not.

use crate::services::cache::CacheStats;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while embedding text
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Provider returned {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Nothing to embed")]
    EmptyInput,
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(e: reqwest::Error) -> Self {
        EmbeddingError::HttpError(e.to_string())
    }
}

/// Source of text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Dimension of every vector this provider returns
    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts, returning vectors in input order
    ///
    /// Default implementation calls `embed` for each text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Cache statistics, for providers wrapped in a cache
    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }
}

/// OpenAI-compatible `/embeddings` endpoint
pub struct OpenAiEmbeddings {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Inputs sent per request; the API accepts at most 2048
    pub const MAX_BATCH_INPUTS: usize = 512;

    /// Create a provider for `text-embedding-3-small` (1536 dimensions)
    pub fn new(api_key: impl Into<String>) -> Result<Self, EmbeddingError> {
        Self::with_model(Self::DEFAULT_BASE_URL, api_key, "text-embedding-3-small", 1536)
    }

    pub fn with_model(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            dimension,
        })
    }

    /// One request for up to `MAX_BATCH_INPUTS` texts
    async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(EmbeddingError::AuthFailed);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(EmbeddingError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::HttpError(format!("Status {}: {}", status, body)));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if parsed.data.len() != input.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                input.len(),
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|d| d.index);

        parsed
            .data
            .into_iter()
            .map(|d| {
                if d.embedding.len() != self.dimension {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimension,
                        actual: d.embedding.len(),
                    });
                }
                Ok(d.embedding)
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let texts: Vec<String> = texts.iter().map(|t| t.trim().to_string()).collect();
        if texts.is_empty() || texts.iter().any(String::is_empty) {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(Self::MAX_BATCH_INPUTS) {
            embeddings.extend(self.request(chunk).await?);
        }

        tracing::trace!("Embedded {} texts with {}", texts.len(), self.model);
        Ok(embeddings)
    }
}

/// Deterministic local fallback using FNV-1a feature hashing
///
/// Each lowercased word is hashed to a signed bucket; the result is
/// L2-normalized. Texts sharing vocabulary land close together, which is
/// enough for demos and tests but carries no real semantics.
#[derive(Debug, Clone)]
pub struct HashEmbeddings {
    dimension: usize,
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl HashEmbeddings {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn fnv1a(token: &str) -> u64 {
        token.bytes().fold(FNV_OFFSET, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
        })
    }

    /// Synchronous core of [`EmbeddingProvider::embed`]
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dimension];
        let mut tokens = 0usize;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = Self::fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
            tokens += 1;
        }

        if tokens == 0 {
            return Err(EmbeddingError::EmptyInput);
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }
}

impl Default for HashEmbeddings {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddings {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "fnv1a-hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_text(text)
    }
}
