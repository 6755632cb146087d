//! Batch write-back of reconciled values.

pub mod applier;
pub mod error;
pub mod parse;

#[cfg(test)]
mod tests;

pub use applier::BatchUpdater;
pub use error::UpdateError;
pub use parse::{CorrectionRow, SUBJECT_COLUMN, parse_corrections};
