use crate::services::embeddings::{EmbeddingError, EmbeddingProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// In-memory TTL cache in front of an embedding provider
///
/// Identical texts are embedded once per TTL. Failures are never cached, so a
/// provider outage is reported on every call rather than masked.
pub struct CachedEmbeddings<P> {
    inner: P,
    cache: moka::future::Cache<String, Arc<Vec<f32>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: EmbeddingProvider> CachedEmbeddings<P> {
    pub fn new(inner: P, max_entries: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            inner,
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache key: model name plus the trimmed text
    fn key(&self, text: &str) -> String {
        format!("{}:{}", self.inner.model_name(), text.trim())
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            entries: self.cache.entry_count(),
            hit_count: hits,
            miss_count: misses,
            hit_rate: if lookups > 0 { hits as f64 / lookups as f64 } else { 0.0 },
        }
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbeddings<P> {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let key = self.key(text);

        if let Some(vector) = self.cache.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Embedding cache hit");
            return Ok(vector.as_ref().clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let vector = self.inner.embed(text).await?;
        self.cache.insert(key, Arc::new(vector.clone())).await;
        Ok(vector)
    }

    /// Serve hits from the cache and send only the misses to the provider
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut embeddings: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut missing: Vec<usize> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(&self.key(text)).await {
                Some(vector) => embeddings.push(Some(vector.as_ref().clone())),
                None => {
                    embeddings.push(None);
                    missing.push(i);
                }
            }
        }

        self.hits.fetch_add((texts.len() - missing.len()) as u64, Ordering::Relaxed);
        self.misses.fetch_add(missing.len() as u64, Ordering::Relaxed);

        if !missing.is_empty() {
            let pending: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let fetched = self.inner.embed_batch(&pending).await?;
            if fetched.len() != pending.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "Expected {} embeddings, got {}",
                    pending.len(),
                    fetched.len()
                )));
            }

            for (i, vector) in missing.into_iter().zip(fetched) {
                self.cache.insert(self.key(&texts[i]), Arc::new(vector.clone())).await;
                embeddings[i] = Some(vector);
            }
        }

        tracing::debug!("Embedded batch of {} texts", texts.len());
        Ok(embeddings.into_iter().flatten().collect())
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        Some(self.stats())
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub hit_rate: f64,
}
