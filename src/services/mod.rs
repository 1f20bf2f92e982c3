// Service exports
pub mod cache;
pub mod embeddings;
pub mod ingest;
pub mod model;

pub use cache::{CacheStats, CachedEmbeddings};
pub use embeddings::{EmbeddingError, EmbeddingProvider, HashEmbeddings, OpenAiEmbeddings};
pub use ingest::{IngestError, ProfileIngestor};
pub use model::{LinearModel, Link, ModelError};
