//! Embedding providers.
//!
//! - [`EmbeddingProvider`] is the capability the semantic scorer consumes.
//! - [`BertEmbedder`] runs a BERT-family checkpoint with candle (or a stub).
//! - [`CachedEmbedder`] memoizes any provider.

/// BERT encoder wrapper.
pub mod bert;
pub mod cache;
pub mod config;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
pub mod embedder;
mod error;
pub mod provider;
/// Tokenizer loading helpers.
pub mod utils;


pub use cache::CachedEmbedder;
pub use config::{EmbedderConfig, Pooling};
pub use embedder::BertEmbedder;
pub use error::EmbeddingError;
pub use provider::{EmbeddingProvider, SharedProvider};
