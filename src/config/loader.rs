//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{FailurePolicy, MedmaskConfig, RecognizerKind};
use super::secret::secret_string;
use crate::deid::policy::MaskPreset;
use crate::domain::errors::MedmaskError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MedmaskConfig
/// 4. Applies environment variable overrides (MEDMASK_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if the file is missing or unreadable, a
/// referenced variable is unset, parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use medmask::config::loader::load_config;
///
/// let config = load_config("medmask.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MedmaskConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MedmaskError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MedmaskError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: MedmaskConfig = toml::from_str(&contents)
        .map_err(|e| MedmaskError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

/// Loads configuration from `path`, falling back to defaults when the file
/// does not exist
///
/// Environment overrides and validation apply in both cases.
///
/// # Errors
///
/// Same as [`load_config`], except a missing file is not an error.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<MedmaskConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    finish(MedmaskConfig::default())
}

fn finish(mut config: MedmaskConfig) -> Result<MedmaskConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        MedmaskError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MedmaskError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(MedmaskError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    let mut result = lines.join("\n");
    if input.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}

fn invalid_override(var: &str, value: &str) -> MedmaskError {
    MedmaskError::Configuration(format!("Invalid value '{value}' for {var}"))
}

/// Applies environment variable overrides using MEDMASK_* prefix
///
/// Environment variables follow the pattern: MEDMASK_<SECTION>_<KEY>
/// For example: MEDMASK_DATABASE_PATH, MEDMASK_RECOGNIZER_ENDPOINT
fn apply_env_overrides(config: &mut MedmaskConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("MEDMASK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Database overrides
    if let Ok(val) = std::env::var("MEDMASK_DATABASE_PATH") {
        config.database.path = val;
    }

    // Recognizer overrides
    if let Ok(val) = std::env::var("MEDMASK_RECOGNIZER_KIND") {
        config.recognizer.kind = match val.to_lowercase().as_str() {
            "none" => RecognizerKind::None,
            "http" => RecognizerKind::Http,
            _ => return Err(invalid_override("MEDMASK_RECOGNIZER_KIND", &val)),
        };
    }
    if let Ok(val) = std::env::var("MEDMASK_RECOGNIZER_ENDPOINT") {
        config.recognizer.endpoint = Some(val);
    }
    if let Ok(val) = std::env::var("MEDMASK_RECOGNIZER_API_TOKEN") {
        config.recognizer.api_token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("MEDMASK_RECOGNIZER_TIMEOUT_SECONDS") {
        config.recognizer.timeout_seconds = val
            .parse()
            .map_err(|_| invalid_override("MEDMASK_RECOGNIZER_TIMEOUT_SECONDS", &val))?;
    }
    if let Ok(val) = std::env::var("MEDMASK_RECOGNIZER_MIN_SCORE") {
        config.recognizer.min_score = val
            .parse()
            .map_err(|_| invalid_override("MEDMASK_RECOGNIZER_MIN_SCORE", &val))?;
    }
    if let Ok(val) = std::env::var("MEDMASK_RECOGNIZER_ON_FAILURE") {
        config.recognizer.on_failure = match val.to_lowercase().as_str() {
            "patterns_only" => FailurePolicy::PatternsOnly,
            "fail" => FailurePolicy::Fail,
            _ => return Err(invalid_override("MEDMASK_RECOGNIZER_ON_FAILURE", &val)),
        };
    }

    // Masking overrides
    if let Ok(val) = std::env::var("MEDMASK_MASKING_PRESET") {
        config.masking.preset = val.parse::<MaskPreset>()?;
    }
    if let Ok(val) = std::env::var("MEDMASK_MASKING_TOKEN_TEMPLATE") {
        config.masking.token_template = Some(val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("MEDMASK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("MEDMASK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("MEDMASK_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("MEDMASK_TEST_SUBST_VAR", "test_value");
        let input = "api_token = \"${MEDMASK_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "api_token = \"test_value\"");
        std::env::remove_var("MEDMASK_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("MEDMASK_TEST_MISSING_VAR");
        let input = "api_token = \"${MEDMASK_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("MEDMASK_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("MEDMASK_TEST_COMMENTED_VAR");
        let input = "# api_token = \"${MEDMASK_TEST_COMMENTED_VAR}\"\npath = \"x.db\"\n";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-medmask.toml");
        assert!(matches!(result, Err(MedmaskError::Configuration(_))));
    }

    #[test]
    fn test_load_config_or_default_missing_file() {
        let config = load_config_or_default("nonexistent-medmask.toml").unwrap();
        assert_eq!(config.masking.preset, MaskPreset::Masked);
    }

    #[test]
    fn test_load_config_valid() {
        std::env::set_var("MEDMASK_TEST_LOADER_TOKEN", "hf_secret");
        let toml_content = r#"
[application]
log_level = "debug"

[database]
path = "clinic.db"

[recognizer]
kind = "http"
endpoint = "https://ner.example.com/models/biomedical"
api_token = "${MEDMASK_TEST_LOADER_TOKEN}"
on_failure = "fail"

[masking]
preset = "labeled"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.database.path, "clinic.db");
        assert_eq!(config.recognizer.kind, RecognizerKind::Http);
        assert_eq!(config.recognizer.on_failure, FailurePolicy::Fail);
        assert_eq!(
            config.recognizer.api_token.as_ref().unwrap().expose_secret(),
            "hf_secret"
        );
        assert_eq!(config.masking.preset, MaskPreset::Labeled);
        std::env::remove_var("MEDMASK_TEST_LOADER_TOKEN");
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[recognizer]\nkind = \"http\"\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }
}
