//! Patient record domain model
//!
//! A patient record carries the raw discharge summary alongside the masked copy
//! computed at intake time. The masked copy is what the default view shows.

use super::errors::MedmaskError;
use super::ids::PatientId;
use super::result::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated input for a new patient record
///
/// # Examples
///
/// ```
/// use medmask::domain::NewPatient;
///
/// let patient = NewPatient::new("Jane Roe", "Discharged home, follow up with Dr. Lee")
///     .unwrap()
///     .with_symptoms("fever, cough");
/// assert_eq!(patient.symptoms(), "fever, cough");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    name: String,
    symptoms: String,
    discharge_summary: String,
}

impl NewPatient {
    /// Creates a new patient input
    ///
    /// # Errors
    ///
    /// Returns [`MedmaskError::Validation`] if the name or discharge summary is blank.
    pub fn new(name: impl Into<String>, discharge_summary: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let discharge_summary = discharge_summary.into();

        if name.trim().is_empty() {
            return Err(MedmaskError::Validation(
                "Patient name is required".to_string(),
            ));
        }
        if discharge_summary.trim().is_empty() {
            return Err(MedmaskError::Validation(
                "Discharge summary is required".to_string(),
            ));
        }

        Ok(Self {
            name,
            symptoms: String::new(),
            discharge_summary,
        })
    }

    /// Sets the (optional) symptoms field
    pub fn with_symptoms(mut self, symptoms: impl Into<String>) -> Self {
        self.symptoms = symptoms.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symptoms(&self) -> &str {
        &self.symptoms
    }

    pub fn discharge_summary(&self) -> &str {
        &self.discharge_summary
    }
}

/// A persisted patient record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: PatientId,
    pub name: String,
    pub symptoms: String,
    pub discharge_summary: String,
    pub discharge_summary_masked: String,
    pub created_at: DateTime<Utc>,
}

/// Which copy of the free-text fields a listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordView {
    /// De-identified discharge summary
    #[default]
    Masked,
    /// Discharge summary as entered
    Raw,
}

/// A record projected for display in one [`RecordView`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientView {
    pub id: PatientId,
    pub name: String,
    pub symptoms: String,
    pub discharge_summary: String,
}

impl PatientRecord {
    /// Projects the record for the requested view
    pub fn view(&self, view: RecordView) -> PatientView {
        let discharge_summary = match view {
            RecordView::Masked => self.discharge_summary_masked.clone(),
            RecordView::Raw => self.discharge_summary.clone(),
        };
        PatientView {
            id: self.id,
            name: self.name.clone(),
            symptoms: self.symptoms.clone(),
            discharge_summary,
        }
    }
}
