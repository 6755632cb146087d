use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument, warn};

use super::ReferenceStore;
use super::error::StoreError;
use crate::model::{UpdateRow, UpdateTarget, VocabularyEntry};

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl PgStore {
    /// Opens a pool and verifies the connection with `SELECT 1`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        info!(max_connections = MAX_CONNECTIONS, "Connected to Postgres");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn vocabulary(&self, sql: &'static str) -> Result<Vec<VocabularyEntry>, StoreError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "Loaded vocabulary");
        Ok(rows
            .into_iter()
            .map(|(id, label)| VocabularyEntry::new(id, label))
            .collect())
    }
}

impl ReferenceStore for PgStore {
    async fn ethnicities(&self) -> Result<Vec<VocabularyEntry>, StoreError> {
        self.vocabulary(
            "SELECT ethnicityid::BIGINT, description FROM ethnicity ORDER BY ethnicityid",
        )
        .await
    }

    async fn sexual_orientations(&self) -> Result<Vec<VocabularyEntry>, StoreError> {
        self.vocabulary("SELECT soid::BIGINT, soname FROM sexual_orientation ORDER BY soid")
            .await
    }

    #[instrument(skip(self, rows), fields(table = target.table, column = target.column, rows = rows.len()))]
    async fn apply_updates(
        &self,
        target: UpdateTarget,
        rows: &[UpdateRow],
    ) -> Result<u64, StoreError> {
        // Identifiers come from the static type table, never from the request.
        let sql = format!(
            "UPDATE {} SET {} = $1 WHERE patientid = $2",
            target.table, target.column
        );

        let mut tx = self.pool.begin().await?;
        let mut affected = 0;
        for row in rows {
            let result = sqlx::query(&sql)
                .bind(&row.value)
                .bind(row.subject_id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                warn!(patientid = row.subject_id, "No record matched correction");
            }
            affected += result.rows_affected();
        }
        tx.commit().await?;

        info!(affected, "Corrections committed");
        Ok(affected)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
