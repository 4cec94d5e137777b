//! Configuration schema types
//!
//! Every section has defaults, so an empty file is a valid configuration:
//! patients are stored in `patients.db`, no recognizer is called, and the
//! `masked` preset is used.

use crate::config::SecretString;
use crate::deid::policy::{AuxiliaryPattern, MaskPolicy, MaskPreset, TokenTemplate};
use serde::{Deserialize, Serialize};

/// Main medmask configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedmaskConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Record store settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Entity recognizer settings
    #[serde(default)]
    pub recognizer: RecognizerConfig,

    /// Masking policy settings
    #[serde(default)]
    pub masking: MaskingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MedmaskConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.database.validate()?;
        self.recognizer.validate()?;
        self.masking.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file, or `:memory:` for a throwaway store
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("database.path cannot be empty".to_string());
        }
        Ok(())
    }

    /// Whether the store lives only in memory
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Which entity recognizer to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognizerKind {
    /// No recognizer; only auxiliary patterns mask text
    #[default]
    None,
    /// Remote token-classification endpoint
    Http,
}

/// What record intake does when the recognizer fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Store the record masked with auxiliary patterns only
    #[default]
    PatternsOnly,
    /// Reject the record
    Fail,
}

/// Entity recognizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Recognizer kind (none or http)
    #[serde(default)]
    pub kind: RecognizerKind,

    /// Inference endpoint URL (required for http)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token for the endpoint
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Entities scored below this are ignored
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Behavior when recognition is unavailable
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl RecognizerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.kind == RecognizerKind::Http {
            let endpoint = self.endpoint.as_deref().unwrap_or("");
            if endpoint.is_empty() {
                return Err(
                    "recognizer.endpoint cannot be empty when kind is 'http'".to_string(),
                );
            }
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(
                    "recognizer.endpoint must start with http:// or https://".to_string(),
                );
            }
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(format!(
                "recognizer.timeout_seconds must be between 1 and 300, got {}",
                self.timeout_seconds
            ));
        }

        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(format!(
                "recognizer.min_score must be between 0.0 and 1.0, got {}",
                self.min_score
            ));
        }

        Ok(())
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            kind: RecognizerKind::None,
            endpoint: None,
            api_token: None,
            timeout_seconds: default_timeout_seconds(),
            min_score: default_min_score(),
            on_failure: FailurePolicy::PatternsOnly,
        }
    }
}

/// Auxiliary pattern definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Pattern name, used in logs
    pub name: String,
    /// Category whose mask token replaces matches
    pub category: String,
    /// Regular expression
    pub pattern: String,
}

/// Masking policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskingConfig {
    /// Base preset (masked or labeled)
    #[serde(default)]
    pub preset: MaskPreset,

    /// Overrides the preset's token template; `{label}` is replaced by the category
    #[serde(default)]
    pub token_template: Option<String>,

    /// Overrides the preset's category allow-list
    #[serde(default)]
    pub allowed_labels: Option<Vec<String>>,

    /// Include the ten-digit phone pattern
    #[serde(default = "default_true")]
    pub include_default_patterns: bool,

    /// Additional auxiliary patterns
    #[serde(default)]
    pub patterns: Vec<PatternConfig>,
}

impl MaskingConfig {
    fn validate(&self) -> Result<(), String> {
        self.build_policy().map(|_| ()).map_err(|e| e.to_string())
    }

    /// Build the mask policy described by this section
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a blank template, an invalid regex,
    /// or a token that would match one of the patterns.
    pub fn build_policy(&self) -> crate::domain::Result<MaskPolicy> {
        let template = TokenTemplate::new(
            self.token_template
                .clone()
                .unwrap_or_else(|| self.preset.template().to_string()),
        )?;

        let allowed: Vec<String> = match self.allowed_labels {
            Some(ref labels) => labels.clone(),
            None => self
                .preset
                .allowed_labels()
                .iter()
                .map(|l| l.to_string())
                .collect(),
        };

        let mut patterns = Vec::with_capacity(self.patterns.len() + 1);
        if self.include_default_patterns {
            patterns.push(AuxiliaryPattern::ten_digit_phone());
        }
        for def in &self.patterns {
            patterns.push(AuxiliaryPattern::new(&def.name, &def.category, &def.pattern)?);
        }

        MaskPolicy::new(template, allowed, patterns)
    }
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            preset: MaskPreset::default(),
            token_template: None,
            allowed_labels: None,
            include_default_patterns: true,
            patterns: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_path() -> String {
    "patients.db".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_min_score() -> f32 {
    0.5
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
