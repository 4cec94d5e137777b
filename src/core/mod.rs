//! Core business logic
//!
//! - [`records`] - Patient intake, listing, and deletion
//!
//! # Example
//!
//! ```rust,no_run
//! use medmask::config::load_config;
//! use medmask::core::RecordService;
//! use medmask::domain::{NewPatient, RecordView};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("medmask.toml")?;
//! let service = RecordService::from_config(&config).await?;
//!
//! let added = service
//!     .add_patient(NewPatient::new("Anna", "Anna was discharged by Dr Carl")?)
//!     .await?;
//! println!("{}: {}", added.id, added.masked_summary);
//!
//! for patient in service.list(RecordView::Masked).await? {
//!     println!("{} {}", patient.name, patient.discharge_summary);
//! }
//! # Ok(())
//! # }
//! ```

pub mod records;

pub use records::{AddedPatient, RecordService};
