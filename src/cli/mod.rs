//! CLI interface and argument parsing
//!
//! Exit codes: 0 success, 2 configuration error, 3 not found or invalid
//! input, 5 fatal error.

pub mod commands;

use crate::domain::MedmaskError;
use clap::{Parser, Subcommand};

/// Exit code for success
pub const EXIT_OK: i32 = 0;
/// Exit code for configuration errors
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for missing records and rejected input
pub const EXIT_INPUT: i32 = 3;
/// Exit code for everything else
pub const EXIT_FATAL: i32 = 5;

/// Map a domain error to a process exit code
pub fn exit_code_for(error: &MedmaskError) -> i32 {
    match error {
        MedmaskError::Configuration(_) => EXIT_CONFIG,
        MedmaskError::NotFound(_) | MedmaskError::Validation(_) => EXIT_INPUT,
        _ => EXIT_FATAL,
    }
}

/// medmask - patient records with de-identified discharge summaries
#[derive(Parser, Debug)]
#[command(name = "medmask")]
#[command(version, about, long_about = None)]
#[command(author = "Medmask Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "medmask.toml", env = "MEDMASK_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MEDMASK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a patient; the discharge summary is de-identified before storage
    Add(commands::add::AddArgs),

    /// List stored patients (de-identified by default)
    List(commands::list::ListArgs),

    /// Delete a patient by id
    Delete(commands::delete::DeleteArgs),

    /// De-identify text from an argument or stdin without storing it
    Mask(commands::mask::MaskArgs),

    /// Show the built-in mask presets
    Presets(commands::presets::PresetsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
