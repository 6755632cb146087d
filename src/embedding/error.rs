use std::path::PathBuf;
use thiserror::Error;

/// Failures of an [`EmbeddingProvider`](super::EmbeddingProvider) at load or encode time.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// A model directory or one of its required files is absent.
    #[error("model file missing: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("could not load embedder weights: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("could not encode text: {reason}")]
    InferenceFailed { reason: String },

    #[error("could not tokenize text: {reason}")]
    TokenizationFailed { reason: String },

    #[error("embedder misconfigured: {reason}")]
    InvalidConfig { reason: String },
}

// Tensor ops only run during encoding, so a candle error is an inference failure.
impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        Self::InferenceFailed {
            reason: err.to_string(),
        }
    }
}
