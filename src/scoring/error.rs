use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error(
        "provider '{provider}' returned vectors of different lengths (query {query}, candidate {candidate})"
    )]
    DimensionMismatch {
        provider: String,
        query: usize,
        candidate: usize,
    },
}
