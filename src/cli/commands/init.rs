//! Init command implementation
//!
//! Writes a commented sample configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "medmask.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. To use a recognizer, set [recognizer] kind = \"http\" and endpoint");
                println!("  3. Put MEDMASK_HF_TOKEN in a .env file if the endpoint needs a token");
                println!("  4. Validate configuration: medmask validate-config");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    fn generate_config() -> String {
        r#"# medmask configuration

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[database]
# SQLite file, or ":memory:" for a throwaway store
path = "patients.db"

[recognizer]
# none: only the auxiliary patterns mask text
# http: token-classification endpoint (Hugging Face inference format)
kind = "none"
# endpoint = "https://api-inference.huggingface.co/models/d4data/biomedical-ner-all"
# api_token = "${MEDMASK_HF_TOKEN}"
timeout_seconds = 30
# Entities scored below this are ignored
min_score = 0.5
# patterns_only: store records masked by patterns when the recognizer fails
# fail: reject the record instead
on_failure = "patterns_only"

[masking]
# masked:  every span becomes [MASKED]; PATIENT, DOCTOR, HOSPITAL, PHONE
# labeled: spans become [MASK_<LABEL>]; NAME and PERSON are masked too
preset = "masked"
# token_template = "[MASK_{label}]"
# allowed_labels = ["PATIENT", "DOCTOR"]
# Mask standalone ten-digit numbers as PHONE
include_default_patterns = true

# [[masking.patterns]]
# name = "mrn"
# category = "MRN"
# pattern = "MRN-\\d{6}"

[logging]
local_enabled = false
local_path = "./logs"
# daily, hourly, never
local_rotation = "daily"
"#
        .to_string()
    }
}
