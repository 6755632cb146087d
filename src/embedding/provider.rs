use std::sync::Arc;

use super::error::EmbeddingError;

/// Turns text into a fixed-length vector.
///
/// Providers are constructed once at start-up and shared read-only; scoring code
/// only ever sees `Arc<dyn EmbeddingProvider>`.
pub trait EmbeddingProvider: Send + Sync {
    /// Name reported in logs (e.g. `sentence`, `biomedical`).
    fn name(&self) -> &str;

    /// Encodes a single string.
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Returns `true` for deterministic test embedders.
    fn is_stub(&self) -> bool {
        false
    }
}

/// Shared provider handle.
pub type SharedProvider = Arc<dyn EmbeddingProvider>;

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).encode(text)
    }

    fn is_stub(&self) -> bool {
        (**self).is_stub()
    }
}
