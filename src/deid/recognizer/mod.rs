//! Entity recognizer seam
//!
//! The recognizer is an external model treated as a black box. Implementations
//! are constructed once at startup and handed to the
//! [`DeidEngine`](crate::deid::DeidEngine) explicitly.

pub mod http;

use crate::config::{RecognizerConfig, RecognizerKind};
use crate::deid::span::RecognizedSpan;
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use http::HttpRecognizer;

/// Trait for entity recognizers
///
/// Returned offsets are character indices into `text`, end-exclusive. No
/// ordering is guaranteed; the masker sorts.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Recognize entities in `text`
    ///
    /// # Errors
    ///
    /// Returns [`MedmaskError::RecognitionUnavailable`](crate::domain::MedmaskError::RecognitionUnavailable)
    /// when the model cannot be reached or its answer cannot be read.
    async fn recognize(&self, text: &str) -> Result<Vec<RecognizedSpan>>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Recognizer that never finds anything
///
/// Used when no model is configured; only auxiliary patterns mask text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecognizer;

#[async_trait]
impl EntityRecognizer for NoopRecognizer {
    async fn recognize(&self, _text: &str) -> Result<Vec<RecognizedSpan>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Build the recognizer selected by configuration
///
/// # Errors
///
/// Returns a configuration error if the selected recognizer cannot be created.
pub fn build_recognizer(config: &RecognizerConfig) -> Result<Arc<dyn EntityRecognizer>> {
    let recognizer: Arc<dyn EntityRecognizer> = match config.kind {
        RecognizerKind::None => Arc::new(NoopRecognizer),
        RecognizerKind::Http => Arc::new(HttpRecognizer::new(config)?),
    };

    tracing::info!(recognizer = recognizer.name(), "Entity recognizer ready");
    Ok(recognizer)
}
