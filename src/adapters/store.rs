//! Record store abstraction
//!
//! Storage backends implement [`RecordStore`]. The store never sees an
//! unmasked-only record: the masked summary is computed before `save`.

use crate::domain::{NewPatient, PatientId, PatientRecord, Result};
use async_trait::async_trait;

/// Persistence for patient records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a patient together with its masked discharge summary
    ///
    /// # Errors
    ///
    /// Returns a storage error if the insert fails.
    async fn save(&self, patient: &NewPatient, masked_summary: &str) -> Result<PatientId>;

    /// All records, oldest first
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    async fn list_all(&self) -> Result<Vec<PatientRecord>>;

    /// Fetch one record
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails. A missing record is `Ok(None)`.
    async fn get(&self, id: PatientId) -> Result<Option<PatientRecord>>;

    /// Remove a record, returning it if it existed
    ///
    /// # Errors
    ///
    /// Returns a storage error if the delete fails.
    async fn delete(&self, id: PatientId) -> Result<Option<PatientRecord>>;

    /// Backend name for logs
    fn backend_name(&self) -> &str;
}
