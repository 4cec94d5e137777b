//! Configuration management
//!
//! medmask reads a TOML file (`medmask.toml` by default). Every section is
//! optional; a missing file means defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [database]
//! path = "patients.db"
//!
//! [recognizer]
//! kind = "http"
//! endpoint = "https://api-inference.huggingface.co/models/d4data/biomedical-ner-all"
//! api_token = "${MEDMASK_HF_TOKEN}"
//! on_failure = "patterns_only"
//!
//! [masking]
//! preset = "masked"
//!
//! [[masking.patterns]]
//! name = "mrn"
//! category = "MRN"
//! pattern = "MRN-\\d{6}"
//! ```
//!
//! `${VAR}` placeholders are substituted from the environment before
//! parsing, and `MEDMASK_<SECTION>_<KEY>` variables override parsed values.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, DatabaseConfig, FailurePolicy, LoggingConfig, MaskingConfig,
    MedmaskConfig, PatternConfig, RecognizerConfig, RecognizerKind,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
