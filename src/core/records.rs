//! Patient record intake and retrieval
//!
//! [`RecordService`] de-identifies the discharge summary at intake and stores
//! both texts side by side, so either view can be shown later without
//! re-running recognition.

use crate::adapters::{RecordStore, SqliteRecordStore};
use crate::config::{FailurePolicy, MedmaskConfig};
use crate::deid::{build_recognizer, DeidEngine, Deidentified};
use crate::domain::{MedmaskError, NewPatient, PatientId, PatientRecord, PatientView, RecordView, Result};
use serde::Serialize;
use std::sync::Arc;

/// Result of adding a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedPatient {
    pub id: PatientId,
    /// Stored de-identified discharge summary
    pub masked_summary: String,
    /// Recognized spans that could not be applied
    pub skipped: usize,
    /// True when recognition failed and only auxiliary patterns were applied
    pub degraded: bool,
}

/// Record service
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    engine: DeidEngine,
    fail_on_recognizer_error: bool,
}

impl RecordService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        engine: DeidEngine,
        fail_on_recognizer_error: bool,
    ) -> Self {
        Self {
            store,
            engine,
            fail_on_recognizer_error,
        }
    }

    /// Wire up the store, recognizer, and mask policy from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the policy, recognizer, or store cannot be created.
    pub async fn from_config(config: &MedmaskConfig) -> Result<Self> {
        let policy = config.masking.build_policy()?;
        let recognizer = build_recognizer(&config.recognizer)?;
        let store = SqliteRecordStore::from_config(&config.database).await?;

        Ok(Self::new(
            Arc::new(store),
            DeidEngine::new(recognizer, policy),
            config.recognizer.on_failure == FailurePolicy::Fail,
        ))
    }

    pub fn engine(&self) -> &DeidEngine {
        &self.engine
    }

    /// De-identify the discharge summary and store the patient
    ///
    /// # Errors
    ///
    /// Returns a storage error if the insert fails, or
    /// `RecognitionUnavailable` when recognition fails and the service was
    /// configured not to degrade.
    pub async fn add_patient(&self, patient: NewPatient) -> Result<AddedPatient> {
        let deidentified = self.deidentify(patient.discharge_summary()).await?;

        let id = self.store.save(&patient, deidentified.text()).await?;

        let skipped = deidentified.outcome.skipped_count();
        crate::log_record_saved!(
            id,
            deidentified.outcome.total_masked(),
            skipped,
            deidentified.degraded
        );

        Ok(AddedPatient {
            id,
            skipped,
            degraded: deidentified.degraded,
            masked_summary: deidentified.into_text(),
        })
    }

    async fn deidentify(&self, text: &str) -> Result<Deidentified> {
        if self.fail_on_recognizer_error {
            self.engine.deidentify(text).await
        } else {
            Ok(self.engine.deidentify_or_degrade(text).await)
        }
    }

    /// All patients in the requested view, oldest first
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list(&self, view: RecordView) -> Result<Vec<PatientView>> {
        let records = self.store.list_all().await?;
        tracing::debug!(count = records.len(), view = ?view, "Listing patients");
        Ok(records.iter().map(|r| r.view(view)).collect())
    }

    /// Remove a patient
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no patient has this id.
    pub async fn delete(&self, id: PatientId) -> Result<PatientRecord> {
        let record = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| MedmaskError::NotFound(format!("Patient {id}")))?;

        tracing::info!(patient_id = %id, "Patient record deleted");
        Ok(record)
    }
}
