//! De-identification engine
//!
//! [`DeidEngine`] couples an injected [`EntityRecognizer`] with a
//! [`SpanMasker`]. It owns no model state of its own: the recognizer's
//! lifecycle belongs to whoever constructed it.
//!
//! # Examples
//!
//! ```no_run
//! use medmask::deid::{DeidEngine, MaskPolicy, MaskPreset, NoopRecognizer};
//! use std::sync::Arc;
//!
//! # async fn example() -> medmask::domain::Result<()> {
//! let policy = MaskPolicy::from_preset(MaskPreset::Masked)?;
//! let engine = DeidEngine::new(Arc::new(NoopRecognizer), policy);
//!
//! let result = engine.deidentify("Call 5551234567").await?;
//! assert_eq!(result.text(), "Call [MASKED]");
//! # Ok(())
//! # }
//! ```

use super::masker::{MaskOutcome, SpanMasker};
use super::policy::MaskPolicy;
use super::recognizer::EntityRecognizer;
use super::span::RecognizedSpan;
use crate::domain::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Result of de-identifying one text field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deidentified {
    /// Masking outcome
    pub outcome: MaskOutcome,
    /// True when the recognizer failed and only auxiliary patterns ran
    pub degraded: bool,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl Deidentified {
    /// The masked text
    pub fn text(&self) -> &str {
        &self.outcome.text
    }

    pub fn into_text(self) -> String {
        self.outcome.text
    }
}

/// De-identification engine
pub struct DeidEngine {
    recognizer: Arc<dyn EntityRecognizer>,
    masker: SpanMasker,
}

impl DeidEngine {
    /// Create an engine around an already constructed recognizer
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, policy: MaskPolicy) -> Self {
        Self {
            recognizer,
            masker: SpanMasker::new(policy),
        }
    }

    pub fn masker(&self) -> &SpanMasker {
        &self.masker
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Recognize entities in `text` and mask them
    ///
    /// Empty text is returned unchanged without calling the recognizer.
    ///
    /// # Errors
    ///
    /// Propagates [`MedmaskError::RecognitionUnavailable`](crate::domain::MedmaskError::RecognitionUnavailable)
    /// from the recognizer.
    pub async fn deidentify(&self, text: &str) -> Result<Deidentified> {
        let start = Instant::now();

        if text.is_empty() {
            return Ok(Deidentified {
                outcome: self.masker.mask(text, &[]),
                degraded: false,
                processing_time_ms: 0,
            });
        }

        let spans = self.recognizer.recognize(text).await?;
        let outcome = self.masker.mask(text, &spans);

        Ok(Deidentified {
            outcome,
            degraded: false,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Like [`deidentify`](Self::deidentify), but never fails
    ///
    /// When the recognizer is unavailable the text is masked with auxiliary
    /// patterns only and the result is marked degraded.
    pub async fn deidentify_or_degrade(&self, text: &str) -> Deidentified {
        let start = Instant::now();

        match self.deidentify(text).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    recognizer = self.recognizer.name(),
                    error = %e,
                    "Entity recognition failed, masking with patterns only"
                );
                Deidentified {
                    outcome: self.masker.mask_patterns_only(text),
                    degraded: true,
                    processing_time_ms: start.elapsed().as_millis() as u64,
                }
            }
        }
    }

    /// Mask `text` with spans obtained elsewhere
    pub fn mask_spans(&self, text: &str, spans: &[RecognizedSpan]) -> MaskOutcome {
        self.masker.mask(text, spans)
    }
}
