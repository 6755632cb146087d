//! Persisted reference data and patient records.
//!
//! Reconciliation only reads the two vocabulary tables; the update path writes
//! single fields of `patient` / `registration` rows keyed by `patientid`.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod seed;


pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::model::{UpdateRow, UpdateTarget, VocabularyEntry};

/// Minimal async interface the reconcile and update layers depend on.
pub trait ReferenceStore: Send + Sync {
    /// All rows of `ethnicity(ethnicityid, description)`, ordered by id.
    fn ethnicities(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<VocabularyEntry>, StoreError>> + Send;

    /// All rows of `sexual_orientation(soid, soname)`, ordered by id.
    fn sexual_orientations(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<VocabularyEntry>, StoreError>> + Send;

    /// Writes every row into `target` inside one write scope.
    ///
    /// Returns the number of records actually changed. Either every row is
    /// written or none is.
    fn apply_updates(
        &self,
        target: UpdateTarget,
        rows: &[UpdateRow],
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Cheap reachability check used by the readiness endpoint.
    fn health_check(&self) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
