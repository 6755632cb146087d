use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("unsupported type '{type_id}'")]
    UnsupportedType { type_id: String },

    #[error("malformed correction file: {reason}")]
    MalformedInput { reason: String },

    #[error("failed to persist corrections: {0}")]
    Persistence(#[from] StoreError),
}

impl UpdateError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }
}
