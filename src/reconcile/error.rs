use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("malformed query batch: {reason}")]
    MalformedInput { reason: String },
}

impl ReconcileError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }
}
