use thiserror::Error;

use crate::scoring::ScoringError;
use crate::store::StoreError;
use crate::terminology::TerminologyError;

/// Why one candidate source produced no answer for a query.
///
/// Messages are captured as strings so a single failure (e.g. an unreadable
/// vocabulary table) can be reported against every query that needed it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("vocabulary unavailable: {0}")]
    Store(String),

    #[error("terminology service failure: {0}")]
    Terminology(String),

    #[error("scoring failed: {0}")]
    Scoring(String),

    #[error("unsupported type '{0}'")]
    UnsupportedType(String),
}

impl From<StoreError> for SourceError {
    fn from(e: StoreError) -> Self {
        Self::Store(e.to_string())
    }
}

impl From<TerminologyError> for SourceError {
    fn from(e: TerminologyError) -> Self {
        Self::Terminology(e.to_string())
    }
}

impl From<ScoringError> for SourceError {
    fn from(e: ScoringError) -> Self {
        Self::Scoring(e.to_string())
    }
}
