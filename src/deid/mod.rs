//! De-identification of free-text fields
//!
//! # Architecture
//!
//! - **Recognition**: an injected [`EntityRecognizer`] returns character-offset spans
//! - **Masking**: [`SpanMasker`] replaces allowed spans right to left, then runs
//!   the auxiliary patterns of the [`MaskPolicy`]
//! - **Engine**: [`DeidEngine`] ties the two together and degrades to
//!   patterns-only masking when recognition is unavailable
//!
//! # Usage
//!
//! ```rust,ignore
//! use medmask::deid::{build_recognizer, DeidEngine, MaskPolicy, MaskPreset};
//!
//! let recognizer = build_recognizer(&config.recognizer)?;
//! let engine = DeidEngine::new(recognizer, MaskPolicy::from_preset(MaskPreset::Labeled)?);
//! let masked = engine.deidentify("Anna met Carl today").await?;
//! ```

pub mod engine;
pub mod masker;
pub mod policy;
pub mod recognizer;
pub mod span;

pub use engine::{DeidEngine, Deidentified};
pub use masker::{MaskOutcome, SpanMasker};
pub use policy::{AuxiliaryPattern, MaskPolicy, MaskPreset, TokenTemplate};
pub use recognizer::{build_recognizer, EntityRecognizer, HttpRecognizer, NoopRecognizer};
pub use span::{RecognizedSpan, SkipReason, SkippedSpan};
