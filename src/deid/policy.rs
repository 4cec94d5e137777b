//! Mask policy: which categories are masked, and with what token
//!
//! A [`MaskPolicy`] bundles three things the masker needs:
//! - the category allow-list applied to recognized spans
//! - the [`TokenTemplate`] used to render a replacement for a category
//! - the [`AuxiliaryPattern`]s run over the text after entity masking
//!
//! Two presets mirror the token formats seen in practice. They are listed by
//! [`MaskPreset::all`] so callers can offer them as choices.

use crate::domain::{MedmaskError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Placeholder substituted with the upper-cased category in a token template
pub const LABEL_PLACEHOLDER: &str = "{label}";

/// Normalize a category tag for comparison and rendering
pub fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase()
}

/// Replacement token template, e.g. `[MASKED]` or `[MASK_{label}]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenTemplate(String);

impl TokenTemplate {
    /// Create a template, rejecting blank input
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if template.trim().is_empty() {
            return Err(MedmaskError::Configuration(
                "Mask token template cannot be empty".to_string(),
            ));
        }
        Ok(Self(template))
    }

    /// Render the token for a category
    pub fn render(&self, label: &str) -> String {
        self.0.replace(LABEL_PLACEHOLDER, &normalize_label(label))
    }

    /// Whether rendered tokens differ per category
    pub fn is_per_label(&self) -> bool {
        self.0.contains(LABEL_PLACEHOLDER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TokenTemplate {
    type Error = MedmaskError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TokenTemplate> for String {
    fn from(template: TokenTemplate) -> Self {
        template.0
    }
}

impl fmt::Display for TokenTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built-in policy presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskPreset {
    /// Every masked span becomes `[MASKED]`; patients, doctors, hospitals, phones
    #[default]
    Masked,
    /// Spans become `[MASK_<LABEL>]`; names and persons are masked too
    Labeled,
}

impl MaskPreset {
    /// All presets, in display order
    pub fn all() -> &'static [MaskPreset] {
        &[MaskPreset::Masked, MaskPreset::Labeled]
    }

    /// Configuration name of the preset
    pub fn name(&self) -> &'static str {
        match self {
            Self::Masked => "masked",
            Self::Labeled => "labeled",
        }
    }

    /// Token template used by the preset
    pub fn template(&self) -> &'static str {
        match self {
            Self::Masked => "[MASKED]",
            Self::Labeled => "[MASK_{label}]",
        }
    }

    /// Category allow-list used by the preset
    pub fn allowed_labels(&self) -> &'static [&'static str] {
        match self {
            Self::Masked => &["PATIENT", "DOCTOR", "HOSPITAL", "PHONE"],
            Self::Labeled => &["NAME", "PERSON", "PATIENT", "DOCTOR", "HOSPITAL", "PHONE"],
        }
    }
}

impl fmt::Display for MaskPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MaskPreset {
    type Err = MedmaskError;

    fn from_str(s: &str) -> Result<Self> {
        MaskPreset::all()
            .iter()
            .copied()
            .find(|preset| preset.name() == s.trim().to_lowercase())
            .ok_or_else(|| {
                let names: Vec<&str> = MaskPreset::all().iter().map(|p| p.name()).collect();
                MedmaskError::Configuration(format!(
                    "Unknown mask preset '{s}'. Must be one of: {}",
                    names.join(", ")
                ))
            })
    }
}

/// A textual detector applied after entity masking
#[derive(Debug, Clone)]
pub struct AuxiliaryPattern {
    /// Pattern name, used in logs
    pub name: String,
    /// Category whose token replaces matches
    pub category: String,
    /// Compiled regex
    pub regex: Regex,
}

impl AuxiliaryPattern {
    /// Compile a pattern
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        pattern: &str,
    ) -> Result<Self> {
        let name = name.into();
        let category = normalize_label(&category.into());
        if category.is_empty() {
            return Err(MedmaskError::Configuration(format!(
                "Pattern '{name}' has an empty category"
            )));
        }
        let regex = Regex::new(pattern).map_err(|e| {
            MedmaskError::Configuration(format!("Invalid regex in pattern '{name}': {e}"))
        })?;
        Ok(Self {
            name,
            category,
            regex,
        })
    }

    /// Exactly ten consecutive digits between word boundaries, masked as `PHONE`
    pub fn ten_digit_phone() -> Self {
        Self {
            name: "ten_digit_phone".to_string(),
            category: "PHONE".to_string(),
            regex: ten_digit_regex(),
        }
    }
}

fn ten_digit_regex() -> Regex {
    Regex::new(r"\b\d{10}\b").expect("ten digit pattern is a valid regex")
}

/// Complete masking policy
#[derive(Debug, Clone)]
pub struct MaskPolicy {
    template: TokenTemplate,
    allowed: BTreeSet<String>,
    patterns: Vec<AuxiliaryPattern>,
}

impl MaskPolicy {
    /// Create a policy
    ///
    /// # Errors
    ///
    /// Returns [`MedmaskError::Configuration`] if a token rendered for any
    /// allowed label or pattern category would itself match an auxiliary
    /// pattern. Such a policy would re-mask its own output.
    pub fn new<I, S>(
        template: TokenTemplate,
        allowed_labels: I,
        patterns: Vec<AuxiliaryPattern>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed: BTreeSet<String> = allowed_labels
            .into_iter()
            .map(|label| normalize_label(label.as_ref()))
            .filter(|label| !label.is_empty())
            .collect();

        let policy = Self {
            template,
            allowed,
            patterns,
        };
        policy.check_tokens_do_not_match_patterns()?;
        Ok(policy)
    }

    /// Build the policy for a preset, with the ten-digit phone pattern
    pub fn from_preset(preset: MaskPreset) -> Result<Self> {
        Self::new(
            TokenTemplate::new(preset.template())?,
            preset.allowed_labels().iter().copied(),
            vec![AuxiliaryPattern::ten_digit_phone()],
        )
    }

    fn check_tokens_do_not_match_patterns(&self) -> Result<()> {
        let categories = self
            .allowed
            .iter()
            .map(String::as_str)
            .chain(self.patterns.iter().map(|p| p.category.as_str()));

        for category in categories {
            let token = self.template.render(category);
            if let Some(pattern) = self.patterns.iter().find(|p| p.regex.is_match(&token)) {
                return Err(MedmaskError::Configuration(format!(
                    "Mask token '{token}' matches auxiliary pattern '{}'",
                    pattern.name
                )));
            }
        }
        Ok(())
    }

    /// Whether spans with this label are masked
    pub fn allows(&self, label: &str) -> bool {
        self.allowed.contains(&normalize_label(label))
    }

    /// Replacement token for a category
    pub fn token_for(&self, label: &str) -> String {
        self.template.render(label)
    }

    pub fn template(&self) -> &TokenTemplate {
        &self.template
    }

    pub fn allowed_labels(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }

    pub fn patterns(&self) -> &[AuxiliaryPattern] {
        &self.patterns
    }
}
