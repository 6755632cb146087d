use std::path::PathBuf;

use crate::constants::{DEFAULT_MAX_SEQ_LEN, STUB_EMBEDDING_DIM};
use crate::embedding::error::EmbeddingError;

/// How token states are reduced to one sentence vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pooling {
    /// First (`[CLS]`) token, as used by SapBERT-style entity encoders.
    Cls,
    /// Average over all tokens, as used by sentence-transformers models.
    Mean,
}

#[derive(Debug, Clone)]
/// Configuration for [`BertEmbedder`](super::BertEmbedder).
pub struct EmbedderConfig {
    /// Provider name reported in logs and readiness output.
    pub name: String,
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_dir: PathBuf,
    pub pooling: Pooling,
    /// Max tokens to consider.
    pub max_seq_len: usize,
    /// Output dimension in stub mode.
    pub stub_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl EmbedderConfig {
    /// General-purpose sentence embedder name.
    pub const SENTENCE: &'static str = "sentence";
    /// Biomedical entity embedder name.
    pub const BIOMEDICAL: &'static str = "biomedical";

    pub fn new<P: Into<PathBuf>>(name: impl Into<String>, model_dir: P, pooling: Pooling) -> Self {
        Self {
            name: name.into(),
            model_dir: model_dir.into(),
            pooling,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            stub_dim: STUB_EMBEDDING_DIM,
            testing_stub: false,
        }
    }

    /// Sentence-transformers model (mean pooling).
    pub fn sentence<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self::new(Self::SENTENCE, model_dir, Pooling::Mean)
    }

    /// SapBERT-style biomedical model (CLS pooling).
    pub fn biomedical<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self::new(Self::BIOMEDICAL, model_dir, Pooling::Cls)
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub(name: impl Into<String>) -> Self {
        Self {
            testing_stub: true,
            ..Self::new(name, PathBuf::new(), Pooling::Mean)
        }
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.testing_stub {
            if self.stub_dim == 0 {
                return Err(EmbeddingError::InvalidConfig {
                    reason: "stub_dim must be positive".to_string(),
                });
            }
            return Ok(());
        }

        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be positive".to_string(),
            });
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!("model_dir is required for embedder '{}'", self.name),
            });
        }

        if !self.model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_dir.clone(),
            });
        }

        for file in ["config.json", "model.safetensors", "tokenizer.json"] {
            let path = self.model_dir.join(file);
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path });
            }
        }

        Ok(())
    }
}
