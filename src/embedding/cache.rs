//! Bounded embedding cache.
//!
//! Vocabulary labels are re-encoded for every query of every batch, and
//! curation batches repeat the same raw values many times. Entries are keyed by
//! the BLAKE3 hash of the exact input text.

use moka::sync::Cache;
use std::sync::Arc;
use tracing::trace;

use super::error::EmbeddingError;
use super::provider::EmbeddingProvider;

/// Caching decorator around any [`EmbeddingProvider`].
pub struct CachedEmbedder<P> {
    inner: P,
    entries: Cache<[u8; 32], Arc<Vec<f32>>>,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    /// Wraps `inner` with an LRU-bounded cache of `capacity` embeddings.
    pub fn new(inner: P, capacity: u64) -> Self {
        Self {
            inner,
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Number of cached embeddings (approximate until pending tasks run).
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let key = *blake3::hash(text.as_bytes()).as_bytes();
        if let Some(hit) = self.entries.get(&key) {
            trace!(provider = self.inner.name(), "Embedding cache hit");
            return Ok(hit.as_ref().clone());
        }

        let embedding = self.inner.encode(text)?;
        self.entries.insert(key, Arc::new(embedding.clone()));
        Ok(embedding)
    }

    fn is_stub(&self) -> bool {
        self.inner.is_stub()
    }
}
