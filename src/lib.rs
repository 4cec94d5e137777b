// medmask - Patient record keeper with de-identified discharge summaries
// Copyright (c) 2025 Medmask Contributors
// Licensed under the MIT License

//! # medmask
//!
//! A small patient record keeper. Each record's free-text discharge summary
//! is de-identified at intake: an entity recognizer finds names, doctors,
//! hospitals and phone numbers, and the span masker replaces them with mask
//! tokens. Both the original and the masked summary are stored, and listings
//! show either view.
//!
//! ## Architecture
//!
//! - [`deid`] - Span masking, mask policies, recognizer seam, engine
//! - [`core`] - Record intake and retrieval
//! - [`adapters`] - Record storage (SQLite)
//! - [`domain`] - Domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Masking
//!
//! Recognized spans carry character offsets into the original text. The
//! masker applies them right to left, so replacing one span never shifts the
//! offsets of spans still to be applied. Spans that are out of range,
//! overlap an applied span, or no longer match their text are skipped and
//! reported rather than aborting the call.
//!
//! ```rust
//! use medmask::deid::{MaskPolicy, MaskPreset, RecognizedSpan, SpanMasker};
//!
//! # fn main() -> medmask::domain::Result<()> {
//! let masker = SpanMasker::new(MaskPolicy::from_preset(MaskPreset::Labeled)?);
//! let spans = [
//!     RecognizedSpan::new(0, 4, "NAME", "Anna"),
//!     RecognizedSpan::new(9, 13, "NAME", "Carl"),
//! ];
//!
//! let outcome = masker.mask("Anna met Carl today", &spans);
//! assert_eq!(outcome.text, "[MASK_NAME] met [MASK_NAME] today");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`] with [`domain::MedmaskError`].
//! The CLI maps errors to exit codes.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod deid;
pub mod domain;
pub mod logging;
