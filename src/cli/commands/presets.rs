//! Presets command implementation

use crate::cli::EXIT_OK;
use crate::deid::MaskPreset;
use clap::Args;

/// Arguments for the presets command
#[derive(Args, Debug)]
pub struct PresetsArgs {}

impl PresetsArgs {
    /// Execute the presets command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        print!("{}", describe_presets());
        Ok(EXIT_OK)
    }
}

fn describe_presets() -> String {
    let mut out = String::new();
    for preset in MaskPreset::all() {
        let marker = if *preset == MaskPreset::default() {
            " (default)"
        } else {
            ""
        };
        out.push_str(&format!("{}{marker}\n", preset.name()));
        out.push_str(&format!("  Token:  {}\n", preset.template()));
        out.push_str(&format!("  Labels: {}\n", preset.allowed_labels().join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_presets() {
        let out = describe_presets();
        assert!(out.contains("masked (default)"));
        assert!(out.contains("[MASK_{label}]"));
        assert!(out.contains("PATIENT, DOCTOR, HOSPITAL, PHONE"));
    }
}
