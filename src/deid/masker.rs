//! Offset-based span masker
//!
//! [`SpanMasker`] replaces recognized spans with mask tokens using the span
//! offsets, not the span text. Spans are applied right to left: every edit
//! changes only text to the right of the spans still pending, so their
//! offsets remain valid coordinates into the partially edited string. A
//! repeated name is therefore masked only where it was recognized.
//!
//! After entity masking, the policy's auxiliary patterns run over the current
//! string content.
//!
//! # Examples
//!
//! ```
//! use medmask::deid::{MaskPolicy, MaskPreset, RecognizedSpan, SpanMasker};
//!
//! let masker = SpanMasker::new(MaskPolicy::from_preset(MaskPreset::Labeled)?);
//! let text = "Carl called Carl";
//! let spans = vec![RecognizedSpan::new(0, 4, "NAME", "Carl")];
//!
//! let outcome = masker.mask(text, &spans);
//! assert_eq!(outcome.text, "[MASK_NAME] called Carl");
//! # Ok::<(), medmask::domain::MedmaskError>(())
//! ```

use super::policy::MaskPolicy;
use super::span::{RecognizedSpan, SkipReason, SkippedSpan};
use regex::Captures;
use serde::Serialize;

/// Result of masking one text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskOutcome {
    /// Masked text
    pub text: String,
    /// Recognized spans replaced by a token
    pub entities_masked: usize,
    /// Auxiliary pattern matches replaced by a token
    pub patterns_masked: usize,
    /// Spans left alone because their label is not in the allow-list
    pub filtered: usize,
    /// Spans discarded as invalid or overlapping
    pub skipped: Vec<SkippedSpan>,
}

impl MaskOutcome {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            entities_masked: 0,
            patterns_masked: 0,
            filtered: 0,
            skipped: Vec::new(),
        }
    }

    /// Number of spans that were discarded
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Number of replacements made by either pass
    pub fn total_masked(&self) -> usize {
        self.entities_masked + self.patterns_masked
    }
}

/// Applies a [`MaskPolicy`] to text and recognized spans
#[derive(Debug, Clone)]
pub struct SpanMasker {
    policy: MaskPolicy,
}

impl SpanMasker {
    pub fn new(policy: MaskPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MaskPolicy {
        &self.policy
    }

    /// Mask `text` using recognized `spans` and the auxiliary patterns
    ///
    /// Spans may arrive in any order. They are processed by descending start
    /// offset, then descending end offset, so the longest of several spans
    /// starting at the same place wins. Spans that are malformed, out of
    /// bounds, or reach into already replaced text are skipped and reported
    /// in [`MaskOutcome::skipped`]; the rest are still applied.
    pub fn mask(&self, text: &str, spans: &[RecognizedSpan]) -> MaskOutcome {
        if text.is_empty() {
            return MaskOutcome::unchanged(text);
        }

        // Byte offset of every char index, plus one past the end
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = boundaries.len() - 1;

        let mut skipped = Vec::new();
        let mut filtered = 0;
        let mut pending: Vec<&RecognizedSpan> = Vec::with_capacity(spans.len());

        for span in spans {
            if span.start >= span.end {
                skipped.push(skip(span, SkipReason::InvalidRange));
            } else if span.end > char_len {
                skipped.push(skip(span, SkipReason::OutOfBounds));
            } else if !self.policy.allows(&span.label) {
                filtered += 1;
            } else {
                pending.push(span);
            }
        }

        pending.sort_by(|a, b| {
            b.start
                .cmp(&a.start)
                .then(b.end.cmp(&a.end))
                .then_with(|| a.label.cmp(&b.label))
        });
        pending.dedup_by(|a, b| a.start == b.start && a.end == b.end && a.label == b.label);

        let mut masked = text.to_string();
        let mut entities_masked = 0;
        // Chars at or past this index may already have been replaced
        let mut frontier = char_len;

        for span in pending {
            if span.end > frontier {
                skipped.push(skip(span, SkipReason::Overlap));
                continue;
            }

            let (byte_start, byte_end) = (boundaries[span.start], boundaries[span.end]);
            if byte_end > masked.len()
                || !masked.is_char_boundary(byte_start)
                || !masked.is_char_boundary(byte_end)
            {
                skipped.push(skip(span, SkipReason::OutOfBounds));
                continue;
            }
            if !span.matched_text.is_empty() && masked[byte_start..byte_end] != span.matched_text {
                skipped.push(skip(span, SkipReason::TextMismatch));
                continue;
            }

            masked.replace_range(byte_start..byte_end, &self.policy.token_for(&span.label));
            frontier = span.start;
            entities_masked += 1;
        }

        let (masked, patterns_masked) = self.apply_patterns(masked);

        for skipped_span in &skipped {
            crate::log_skipped_span!(skipped_span);
        }
        tracing::debug!(
            entities_masked,
            patterns_masked,
            filtered,
            skipped = skipped.len(),
            "Masked text"
        );

        MaskOutcome {
            text: masked,
            entities_masked,
            patterns_masked,
            filtered,
            skipped,
        }
    }

    /// Run only the auxiliary patterns over `text`
    pub fn mask_patterns_only(&self, text: &str) -> MaskOutcome {
        self.mask(text, &[])
    }

    fn apply_patterns(&self, mut text: String) -> (String, usize) {
        let mut total = 0;

        for pattern in self.policy.patterns() {
            let token = self.policy.token_for(&pattern.category);
            let mut count = 0;
            let replaced = pattern
                .regex
                .replace_all(&text, |_: &Captures<'_>| {
                    count += 1;
                    token.clone()
                })
                .into_owned();

            if count > 0 {
                tracing::debug!(pattern = %pattern.name, count, "Auxiliary pattern matched");
                text = replaced;
                total += count;
            }
        }

        (text, total)
    }
}

fn skip(span: &RecognizedSpan, reason: SkipReason) -> SkippedSpan {
    SkippedSpan {
        span: span.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deid::policy::{AuxiliaryPattern, MaskPreset, TokenTemplate};

    fn labeled() -> SpanMasker {
        SpanMasker::new(MaskPolicy::from_preset(MaskPreset::Labeled).unwrap())
    }

    fn masked() -> SpanMasker {
        SpanMasker::new(MaskPolicy::from_preset(MaskPreset::Masked).unwrap())
    }

    #[test]
    fn test_right_to_left_keeps_offsets() {
        let text = "Anna met Carl today";
        let spans = vec![
            RecognizedSpan::new(0, 4, "NAME", "Anna"),
            RecognizedSpan::new(9, 13, "NAME", "Carl"),
        ];

        let outcome = labeled().mask(text, &spans);
        assert_eq!(outcome.text, "[MASK_NAME] met [MASK_NAME] today");
        assert_eq!(outcome.entities_masked, 2);
        assert_eq!(outcome.skipped_count(), 0);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let text = "Anna met Carl today";
        let spans = vec![
            RecognizedSpan::new(9, 13, "NAME", "Carl"),
            RecognizedSpan::new(0, 4, "NAME", "Anna"),
        ];

        let outcome = labeled().mask(text, &spans);
        assert_eq!(outcome.text, "[MASK_NAME] met [MASK_NAME] today");
    }

    #[test]
    fn test_only_recognized_occurrence_masked() {
        let outcome = labeled().mask(
            "Carl called Carl",
            &[RecognizedSpan::new(0, 4, "NAME", "Carl")],
        );
        assert_eq!(outcome.text, "[MASK_NAME] called Carl");
    }

    #[test]
    fn test_label_outside_allow_list_passes_through() {
        let text = "Given ibuprofen by Dr Lee";
        let spans = vec![
            RecognizedSpan::new(6, 15, "MEDICATION", "ibuprofen"),
            RecognizedSpan::new(19, 25, "DOCTOR", "Dr Lee"),
        ];

        let outcome = masked().mask(text, &spans);
        assert_eq!(outcome.text, "Given ibuprofen by [MASKED]");
        assert_eq!(outcome.filtered, 1);
        assert_eq!(outcome.skipped_count(), 0);
    }

    #[test]
    fn test_label_match_is_case_insensitive() {
        let outcome = masked().mask("Seen at Mercy", &[RecognizedSpan::new(8, 13, "hospital", "Mercy")]);
        assert_eq!(outcome.text, "Seen at [MASKED]");
    }

    #[test]
    fn test_out_of_bounds_span_skipped() {
        let text = "Anna met Carl";
        let spans = vec![
            RecognizedSpan::new(0, 4, "NAME", "Anna"),
            RecognizedSpan::new(9, 30, "NAME", "Carl"),
        ];

        let outcome = labeled().mask(text, &spans);
        assert_eq!(outcome.text, "[MASK_NAME] met Carl");
        assert_eq!(outcome.skipped_count(), 1);
        assert_eq!(outcome.skipped[0].reason, SkipReason::OutOfBounds);
    }

    #[test]
    fn test_inverted_span_skipped() {
        let outcome = labeled().mask("Anna", &[RecognizedSpan::new(3, 1, "NAME", "")]);
        assert_eq!(outcome.text, "Anna");
        assert_eq!(outcome.skipped[0].reason, SkipReason::InvalidRange);
    }

    #[test]
    fn test_partial_overlap_skipped_and_reported() {
        let text = "Dr Anna Berg called";
        let spans = vec![
            RecognizedSpan::new(0, 7, "DOCTOR", "Dr Anna"),
            RecognizedSpan::new(3, 12, "PATIENT", "Anna Berg"),
        ];

        let outcome = labeled().mask(text, &spans);
        // The rightmost span wins; the one reaching into it is reported.
        assert_eq!(outcome.text, "Dr [MASK_PATIENT] called");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason, SkipReason::Overlap);
        assert_eq!(outcome.skipped[0].span.label, "DOCTOR");
    }

    #[test]
    fn test_same_start_longest_wins() {
        let text = "Anna Berg left";
        let spans = vec![
            RecognizedSpan::new(0, 4, "NAME", "Anna"),
            RecognizedSpan::new(0, 9, "NAME", "Anna Berg"),
        ];

        let outcome = labeled().mask(text, &spans);
        assert_eq!(outcome.text, "[MASK_NAME] left");
        assert_eq!(outcome.skipped[0].reason, SkipReason::Overlap);
    }

    #[test]
    fn test_adjacent_spans_both_applied() {
        let text = "AnnaBerg";
        let spans = vec![
            RecognizedSpan::new(0, 4, "NAME", "Anna"),
            RecognizedSpan::new(4, 8, "NAME", "Berg"),
        ];

        let outcome = labeled().mask(text, &spans);
        assert_eq!(outcome.text, "[MASK_NAME][MASK_NAME]");
    }

    #[test]
    fn test_duplicate_spans_applied_once() {
        let span = RecognizedSpan::new(0, 4, "NAME", "Anna");
        let outcome = labeled().mask("Anna", &[span.clone(), span]);
        assert_eq!(outcome.text, "[MASK_NAME]");
        assert_eq!(outcome.skipped_count(), 0);
    }

    #[test]
    fn test_text_mismatch_skipped() {
        let outcome = labeled().mask("Anna met Carl", &[RecognizedSpan::new(0, 4, "NAME", "Carl")]);
        assert_eq!(outcome.text, "Anna met Carl");
        assert_eq!(outcome.skipped[0].reason, SkipReason::TextMismatch);
    }

    #[test]
    fn test_empty_matched_text_not_checked() {
        let outcome = labeled().mask("Anna met Carl", &[RecognizedSpan::new(9, 13, "NAME", "")]);
        assert_eq!(outcome.text, "Anna met [MASK_NAME]");
    }

    #[test]
    fn test_char_offsets_with_multibyte_text() {
        let text = "Zoë rang Jörg";
        let spans = vec![
            RecognizedSpan::new(0, 3, "NAME", "Zoë"),
            RecognizedSpan::new(9, 13, "NAME", "Jörg"),
        ];

        let outcome = labeled().mask(text, &spans);
        assert_eq!(outcome.text, "[MASK_NAME] rang [MASK_NAME]");
    }

    #[test]
    fn test_auxiliary_pass_masks_ten_digits() {
        let outcome = labeled().mask("Call 5551234567 after 6pm", &[]);
        assert_eq!(outcome.text, "Call [MASK_PHONE] after 6pm");
        assert_eq!(outcome.patterns_masked, 1);
    }

    #[test]
    fn test_auxiliary_pass_ignores_other_lengths() {
        let text = "ids 555123456 and 55512345678";
        let outcome = labeled().mask(text, &[]);
        assert_eq!(outcome.text, text);
        assert_eq!(outcome.total_masked(), 0);
    }

    #[test]
    fn test_auxiliary_pass_runs_after_entities() {
        let text = "Anna: 5551234567";
        let outcome = masked().mask(text, &[RecognizedSpan::new(0, 4, "PATIENT", "Anna")]);
        assert_eq!(outcome.text, "[MASKED]: [MASKED]");
        assert_eq!(outcome.entities_masked, 1);
        assert_eq!(outcome.patterns_masked, 1);
    }

    #[test]
    fn test_token_with_dollar_inserted_literally() {
        let policy = MaskPolicy::new(
            TokenTemplate::new("$1-{label}").unwrap(),
            ["PHONE"],
            vec![AuxiliaryPattern::ten_digit_phone()],
        )
        .unwrap();
        let outcome = SpanMasker::new(policy).mask("tel 5551234567", &[]);
        assert_eq!(outcome.text, "tel $1-PHONE");
    }

    #[test]
    fn test_empty_text() {
        let outcome = labeled().mask("", &[RecognizedSpan::new(0, 4, "NAME", "Anna")]);
        assert_eq!(outcome.text, "");
        assert_eq!(outcome.skipped_count(), 0);
        assert_eq!(outcome.total_masked(), 0);
    }

    #[test]
    fn test_patterns_only() {
        let outcome = masked().mask_patterns_only("Anna 5551234567");
        assert_eq!(outcome.text, "Anna [MASKED]");
    }
}
