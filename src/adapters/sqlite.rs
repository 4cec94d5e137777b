//! SQLite record store

use super::store::RecordStore;
use crate::config::DatabaseConfig;
use crate::domain::{MedmaskError, NewPatient, PatientId, PatientRecord, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;

const SELECT_COLUMNS: &str =
    "SELECT id, name, symptoms, discharge_summary, discharge_summary_masked, created_at FROM patients";

/// [`RecordStore`] backed by a SQLite database
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (creating if missing) the database file at `path`
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be opened or the schema
    /// cannot be created.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal),
            )
            .await
            .map_err(|e| {
                MedmaskError::Storage(format!("Failed to open {}: {}", path.display(), e))
            })?;

        Self::initialize_schema(&pool).await?;
        tracing::debug!(path = %path.display(), "SQLite record store opened");

        Ok(Self { pool })
    }

    /// Open a private in-memory database
    ///
    /// A single connection is kept for the life of the store; the data goes
    /// away with it.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the schema cannot be created.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::new().in_memory(true))
            .await?;

        Self::initialize_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Open the store described by configuration
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        if config.is_in_memory() {
            Self::in_memory().await
        } else {
            Self::new(&config.path).await
        }
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                symptoms TEXT NOT NULL DEFAULT '',
                discharge_summary TEXT NOT NULL,
                discharge_summary_masked TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| MedmaskError::Storage(format!("Failed to create patients table: {e}")))?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn record_from_row(row: &SqliteRow) -> Result<PatientRecord> {
    let id: i64 = row.try_get("id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(PatientRecord {
        id: PatientId::new(id).map_err(MedmaskError::Storage)?,
        name: row.try_get("name")?,
        symptoms: row.try_get("symptoms")?,
        discharge_summary: row.try_get("discharge_summary")?,
        discharge_summary_masked: row.try_get("discharge_summary_masked")?,
        created_at,
    })
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn save(&self, patient: &NewPatient, masked_summary: &str) -> Result<PatientId> {
        let result = sqlx::query(
            "INSERT INTO patients (name, symptoms, discharge_summary, discharge_summary_masked, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(patient.name())
        .bind(patient.symptoms())
        .bind(patient.discharge_summary())
        .bind(masked_summary)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        PatientId::new(result.last_insert_rowid()).map_err(MedmaskError::Storage)
    }

    async fn list_all(&self) -> Result<Vec<PatientRecord>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn get(&self, id: PatientId) -> Result<Option<PatientRecord>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn delete(&self, id: PatientId) -> Result<Option<PatientRecord>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let record = record_from_row(&row)?;

        sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(record))
    }

    fn backend_name(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(name: &str) -> NewPatient {
        NewPatient::new(name, format!("{name} was discharged"))
            .unwrap()
            .with_symptoms("fever")
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = SqliteRecordStore::in_memory().await.unwrap();
        let id = store.save(&patient("Anna"), "[MASKED] was discharged").await.unwrap();

        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.name, "Anna");
        assert_eq!(record.symptoms, "fever");
        assert_eq!(record.discharge_summary, "Anna was discharged");
        assert_eq!(record.discharge_summary_masked, "[MASKED] was discharged");
    }

    #[tokio::test]
    async fn test_list_all_in_insert_order() {
        let store = SqliteRecordStore::in_memory().await.unwrap();
        let first = store.save(&patient("Anna"), "a").await.unwrap();
        let second = store.save(&patient("Carl"), "b").await.unwrap();

        let records = store.list_all().await.unwrap();
        let ids: Vec<PatientId> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = SqliteRecordStore::in_memory().await.unwrap();
        let id = store.save(&patient("Anna"), "masked").await.unwrap();

        let removed = store.delete(id).await.unwrap().unwrap();
        assert_eq!(removed.name, "Anna");
        assert!(store.get(id).await.unwrap().is_none());
        assert!(store.delete(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("patients.db");

        let id = {
            let store = SqliteRecordStore::new(&path).await.unwrap();
            let id = store.save(&patient("Anna"), "masked").await.unwrap();
            store.close().await;
            id
        };

        let store = SqliteRecordStore::new(&path).await.unwrap();
        assert!(store.get(id).await.unwrap().is_some());
        assert_eq!(store.backend_name(), "sqlite");
    }
}
