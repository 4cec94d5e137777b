//! Recognized span and masking diagnostic models

use serde::{Deserialize, Serialize};
use std::fmt;

/// An entity recognized in a piece of text
///
/// Offsets are character (Unicode scalar value) indices into the text the
/// recognizer was given, end-exclusive. A well-formed span satisfies
/// `start < end <= text.chars().count()` and `matched_text` equals the
/// characters in `start..end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedSpan {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Category tag reported by the recognizer (e.g. `PATIENT`)
    pub label: String,
    /// Substring the recognizer matched
    pub matched_text: String,
}

impl RecognizedSpan {
    /// Create a new span
    pub fn new(
        start: usize,
        end: usize,
        label: impl Into<String>,
        matched_text: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            label: label.into(),
            matched_text: matched_text.into(),
        }
    }

    /// Create a span whose `matched_text` is sliced out of `text`
    ///
    /// When the offsets do not describe a valid range of `text` the matched
    /// text is left empty; the masker reports such spans instead of applying them.
    pub fn from_text(text: &str, start: usize, end: usize, label: impl Into<String>) -> Self {
        let matched_text = if start < end {
            let slice: String = text.chars().skip(start).take(end - start).collect();
            if slice.chars().count() == end - start {
                slice
            } else {
                String::new()
            }
        } else {
            String::new()
        };
        Self::new(start, end, label, matched_text)
    }

    /// Number of characters covered by the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this span shares at least one character with `other`
    pub fn overlaps(&self, other: &RecognizedSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Why a span was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// `start >= end`
    InvalidRange,
    /// `end` lies past the end of the text
    OutOfBounds,
    /// The span reaches into text already replaced by another span
    Overlap,
    /// The text at the span's offsets is not what the recognizer reported
    TextMismatch,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidRange => "invalid range",
            Self::OutOfBounds => "out of bounds",
            Self::Overlap => "overlaps a masked span",
            Self::TextMismatch => "text mismatch",
        };
        f.write_str(s)
    }
}

/// A span that was discarded, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSpan {
    pub span: RecognizedSpan,
    pub reason: SkipReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_slices_by_chars() {
        let span = RecognizedSpan::from_text("Zoë saw Dr. Ngata", 0, 3, "PATIENT");
        assert_eq!(span.matched_text, "Zoë");
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn test_from_text_out_of_range_leaves_text_empty() {
        let span = RecognizedSpan::from_text("short", 2, 40, "PATIENT");
        assert_eq!(span.matched_text, "");
        assert_eq!(span.end, 40);
    }

    #[test]
    fn test_overlaps() {
        let a = RecognizedSpan::new(0, 5, "A", "");
        let b = RecognizedSpan::new(4, 8, "B", "");
        let c = RecognizedSpan::new(5, 8, "C", "");
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_skip_reason_serde() {
        let json = serde_json::to_string(&SkipReason::OutOfBounds).unwrap();
        assert_eq!(json, "\"out_of_bounds\"");
    }
}
