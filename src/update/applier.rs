use tracing::{debug, info, instrument};

use super::error::UpdateError;
use super::parse::{CorrectionRow, parse_corrections};
use crate::model::{TypeTag, UpdateRow};
use crate::store::ReferenceStore;

/// Writes curated values back to the records they were reconciled from.
#[derive(Debug, Clone)]
pub struct BatchUpdater<S> {
    store: S,
}

impl<S: ReferenceStore> BatchUpdater<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Applies `rows` to the table/column `tag` maps to.
    ///
    /// Rows missing a subject id or a value are skipped. Returns the rows that
    /// were written, in input order; all of them are written in one scope.
    #[instrument(skip(self, rows), fields(type_id = tag.id(), rows = rows.len()))]
    pub async fn apply(
        &self,
        rows: Vec<CorrectionRow>,
        tag: TypeTag,
    ) -> Result<Vec<UpdateRow>, UpdateError> {
        let target = tag.update_target();
        let total = rows.len();

        let updates: Vec<UpdateRow> = rows
            .into_iter()
            .filter_map(|row| {
                Some(UpdateRow {
                    subject_id: row.subject_id?,
                    column: target.column.to_string(),
                    value: row.value?,
                })
            })
            .collect();

        let skipped = total - updates.len();
        if skipped > 0 {
            debug!(skipped, "Skipped incomplete correction rows");
        }
        if updates.is_empty() {
            return Ok(updates);
        }

        let affected = self.store.apply_updates(target, &updates).await?;
        info!(
            table = target.table,
            column = target.column,
            applied = updates.len(),
            affected,
            "Corrections applied"
        );

        Ok(updates)
    }

    /// Resolves `type_id`, parses the uploaded CSV and applies it.
    pub async fn apply_file(
        &self,
        bytes: &[u8],
        type_id: &str,
    ) -> Result<Vec<UpdateRow>, UpdateError> {
        let tag = TypeTag::from_id(type_id).ok_or_else(|| UpdateError::UnsupportedType {
            type_id: type_id.to_string(),
        })?;

        let rows = parse_corrections(bytes, tag.update_target().column)?;
        self.apply(rows, tag).await
    }
}
