//! List command implementation

use crate::cli::{exit_code_for, EXIT_OK};
use crate::config::load_config_or_default;
use crate::core::RecordService;
use crate::domain::{PatientView, RecordView};
use clap::Args;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show discharge summaries as entered instead of de-identified
    #[arg(long)]
    pub raw: bool,

    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn view(&self) -> RecordView {
        if self.raw {
            RecordView::Raw
        } else {
            RecordView::Masked
        }
    }

    /// Execute the list command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let view = self.view();
        tracing::info!(view = ?view, "Listing patients");

        let result = async {
            let config = load_config_or_default(config_path)?;
            let service = RecordService::from_config(&config).await?;
            service.list(view).await
        }
        .await;

        let patients = match result {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Failed to list patients");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&patients)?);
        } else {
            print!("{}", render_table(&patients, view));
        }

        Ok(EXIT_OK)
    }
}

fn render_table(patients: &[PatientView], view: RecordView) -> String {
    if patients.is_empty() {
        return "No patients stored.\n".to_string();
    }

    let heading = match view {
        RecordView::Masked => "De-identified data",
        RecordView::Raw => "Raw data",
    };

    let mut out = format!("{heading} ({} patient(s))\n\n", patients.len());
    for p in patients {
        out.push_str(&format!("#{} {}\n", p.id, p.name));
        if !p.symptoms.is_empty() {
            out.push_str(&format!("  Symptoms: {}\n", p.symptoms));
        }
        out.push_str(&format!("  Discharge summary: {}\n\n", p.discharge_summary));
    }
    out
}
