//! Domain models and types for medmask.
//!
//! The domain layer provides:
//! - **Identifiers** ([`PatientId`])
//! - **Patient records** ([`NewPatient`], [`PatientRecord`], [`PatientView`])
//! - **Error types** ([`MedmaskError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, MedmaskError>`]:
//!
//! ```rust
//! use medmask::domain::{MedmaskError, NewPatient, Result};
//!
//! fn example() -> Result<NewPatient> {
//!     let patient = NewPatient::new("Jane Roe", "Discharged in stable condition")?;
//!     Ok(patient)
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod patient;
pub mod result;

pub use errors::MedmaskError;
pub use ids::PatientId;
pub use patient::{NewPatient, PatientRecord, PatientView, RecordView};
pub use result::Result;
