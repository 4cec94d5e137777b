//! Mask command implementation
//!
//! Runs the configured recognizer and mask policy over a single text without
//! touching the record store.

use crate::cli::{exit_code_for, EXIT_OK};
use crate::config::{load_config_or_default, FailurePolicy, MedmaskConfig};
use crate::deid::{build_recognizer, DeidEngine, Deidentified, MaskPreset};
use crate::domain::Result;
use clap::Args;
use tokio::io::AsyncReadExt;

/// Arguments for the mask command
#[derive(Args, Debug)]
pub struct MaskArgs {
    /// Text to de-identify; read from stdin when omitted
    pub text: Option<String>,

    /// Use a built-in preset, ignoring token and label overrides from the config
    #[arg(long)]
    pub preset: Option<MaskPreset>,

    /// Print the full outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl MaskArgs {
    /// Execute the mask command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let text = match self.text {
            Some(ref t) => t.clone(),
            None => read_stdin().await?,
        };

        let result = async {
            let mut config = load_config_or_default(config_path)?;
            self.apply_preset(&mut config);
            deidentify(&config, &text).await
        }
        .await;

        let deidentified = match result {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&deidentified)?);
            return Ok(EXIT_OK);
        }

        println!("{}", deidentified.text());
        let skipped = deidentified.outcome.skipped_count();
        if skipped > 0 {
            eprintln!("⚠️  {skipped} recognized span(s) skipped");
        }
        if deidentified.degraded {
            eprintln!("⚠️  Entity recognizer unavailable; only pattern masking was applied");
        }
        Ok(EXIT_OK)
    }

    fn apply_preset(&self, config: &mut MedmaskConfig) {
        if let Some(preset) = self.preset {
            config.masking.preset = preset;
            config.masking.token_template = None;
            config.masking.allowed_labels = None;
        }
    }
}

async fn deidentify(config: &MedmaskConfig, text: &str) -> Result<Deidentified> {
    let policy = config.masking.build_policy()?;
    let recognizer = build_recognizer(&config.recognizer)?;
    let engine = DeidEngine::new(recognizer, policy);

    match config.recognizer.on_failure {
        FailurePolicy::Fail => engine.deidentify(text).await,
        FailurePolicy::PatternsOnly => Ok(engine.deidentify_or_degrade(text).await),
    }
}

async fn read_stdin() -> anyhow::Result<String> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    Ok(strip_trailing_newline(input))
}

fn strip_trailing_newline(mut input: String) -> String {
    if input.ends_with('\n') {
        input.pop();
        if input.ends_with('\r') {
            input.pop();
        }
    }
    input
}
