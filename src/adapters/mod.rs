//! External system integrations
//!
//! - [`store`] - Record store abstraction (trait-based)
//! - [`sqlite`] - SQLite implementation
//!
//! The entity recognizer adapters live with the de-identification code in
//! [`crate::deid::recognizer`].
//!
//! ```rust,no_run
//! use medmask::adapters::{RecordStore, SqliteRecordStore};
//!
//! # async fn example() -> medmask::domain::Result<()> {
//! let store = SqliteRecordStore::new("patients.db").await?;
//! for record in store.list_all().await? {
//!     println!("{} {}", record.id, record.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod sqlite;
pub mod store;

pub use sqlite::SqliteRecordStore;
pub use store::RecordStore;
