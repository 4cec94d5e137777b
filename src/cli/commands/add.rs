//! Add command implementation

use crate::cli::{exit_code_for, EXIT_OK};
use crate::config::load_config_or_default;
use crate::core::RecordService;
use crate::domain::NewPatient;
use clap::Args;

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Patient name
    #[arg(long)]
    pub name: String,

    /// Symptoms (optional)
    #[arg(long, default_value = "")]
    pub symptoms: String,

    /// Discharge summary; de-identified before storage
    #[arg(long)]
    pub summary: String,
}

impl AddArgs {
    /// Execute the add command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let patient = match NewPatient::new(&self.name, &self.summary) {
            Ok(p) => p.with_symptoms(&self.symptoms),
            Err(e) => {
                println!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let service = match RecordService::from_config(&config).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        match service.add_patient(patient).await {
            Ok(added) => {
                println!("✅ Patient {} saved", added.id);
                println!("   De-identified summary: {}", added.masked_summary);
                if added.degraded {
                    println!("⚠️  Entity recognizer unavailable; only pattern masking was applied");
                }
                if added.skipped > 0 {
                    println!("⚠️  {} recognized span(s) could not be applied", added.skipped);
                }
                Ok(EXIT_OK)
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "add patient");
                println!("❌ Failed to save patient");
                println!("   Error: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}
