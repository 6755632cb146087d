use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use super::ReferenceStore;
use super::error::StoreError;
use super::seed;
use crate::model::{UpdateRow, UpdateTarget, VocabularyEntry};

type FieldKey = (&'static str, &'static str, i64);

#[derive(Default)]
struct Tables {
    ethnicities: Vec<VocabularyEntry>,
    sexual_orientations: Vec<VocabularyEntry>,
    fields: HashMap<FieldKey, String>,
}

/// In-process store used when no database is configured, and in tests.
///
/// Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("MemoryStore")
            .field("ethnicities", &tables.ethnicities.len())
            .field("sexual_orientations", &tables.sexual_orientations.len())
            .field("fields", &tables.fields.len())
            .finish()
    }
}

impl MemoryStore {
    pub fn new(
        ethnicities: Vec<VocabularyEntry>,
        sexual_orientations: Vec<VocabularyEntry>,
    ) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                ethnicities,
                sexual_orientations,
                fields: HashMap::new(),
            })),
            unavailable: Arc::default(),
        }
    }

    /// Store pre-loaded with the NHS ethnicity and sexual orientation categories.
    pub fn with_reference_vocabulary() -> Self {
        Self::new(seed::ethnicity_entries(), seed::sexual_orientation_entries())
    }

    /// Registers a subject; updates for unknown subjects match nothing.
    pub fn insert_subject(&self, target: UpdateTarget, subject_id: i64, value: impl Into<String>) {
        self.tables
            .write()
            .fields
            .insert((target.table, target.column, subject_id), value.into());
    }

    /// Current value of one field, if the subject exists.
    pub fn field(&self, target: UpdateTarget, subject_id: i64) -> Option<String> {
        self.tables
            .read()
            .fields
            .get(&(target.table, target.column, subject_id))
            .cloned()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "memory store marked unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl ReferenceStore for MemoryStore {
    async fn ethnicities(&self) -> Result<Vec<VocabularyEntry>, StoreError> {
        self.ensure_available()?;
        Ok(self.tables.read().ethnicities.clone())
    }

    async fn sexual_orientations(&self) -> Result<Vec<VocabularyEntry>, StoreError> {
        self.ensure_available()?;
        Ok(self.tables.read().sexual_orientations.clone())
    }

    async fn apply_updates(
        &self,
        target: UpdateTarget,
        rows: &[UpdateRow],
    ) -> Result<u64, StoreError> {
        self.ensure_available()?;

        let mut tables = self.tables.write();
        let mut affected = 0;
        for row in rows {
            let key = (target.table, target.column, row.subject_id);
            if let Some(slot) = tables.fields.get_mut(&key) {
                slot.clone_from(&row.value);
                affected += 1;
            }
        }

        debug!(table = target.table, column = target.column, affected, "Applied corrections");
        Ok(affected)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.ensure_available()
    }
}
