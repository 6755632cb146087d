//! Reconciliation orchestration.
//!
//! A batch is decoded by [`parse_queries`], each query is dispatched to the
//! sources its scope names, and every query's candidates are de-duplicated,
//! ranked by fused score and truncated to its limit. Source failures are
//! isolated per query (see [`QueryResult::errors`]).

pub mod envelope;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod types;


pub use envelope::parse_queries;
pub use error::ReconcileError;
pub use manifest::Manifest;
pub use orchestrator::{Reconciler, rank};
pub use types::{
    Candidate, Query, QueryBatch, QueryResult, QueryScope, ReconciliationResult, SourceFailure,
};
