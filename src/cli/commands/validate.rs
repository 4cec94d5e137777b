//! Validate config command implementation

use crate::cli::{exit_code_for, EXIT_OK};
use crate::config::{load_config, RecognizerKind};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Unlike the other commands, a missing file is an error here.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let policy = match config.masking.build_policy() {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Mask policy is invalid");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Database: {}", config.database.path);
        match config.recognizer.kind {
            RecognizerKind::None => println!("  Recognizer: none (pattern masking only)"),
            RecognizerKind::Http => {
                println!(
                    "  Recognizer: http ({})",
                    config.recognizer.endpoint.as_deref().unwrap_or("")
                );
                println!(
                    "  API Token: {}",
                    if config.recognizer.api_token.is_some() {
                        "set"
                    } else {
                        "not set"
                    }
                );
                println!("  On Failure: {:?}", config.recognizer.on_failure);
            }
        }
        println!("  Mask Preset: {}", config.masking.preset);
        println!("  Mask Token: {}", policy.template());
        println!(
            "  Masked Labels: {}",
            policy.allowed_labels().collect::<Vec<_>>().join(", ")
        );
        let pattern_names: Vec<&str> = policy.patterns().iter().map(|p| p.name.as_str()).collect();
        println!("  Patterns: {}", pattern_names.join(", "));
        println!();

        Ok(EXIT_OK)
    }
}
