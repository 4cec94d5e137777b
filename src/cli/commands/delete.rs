//! Delete command implementation

use crate::cli::{exit_code_for, EXIT_OK};
use crate::config::load_config_or_default;
use crate::core::RecordService;
use crate::domain::PatientId;
use clap::Args;

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Patient id as shown by `list`
    pub id: PatientId,
}

impl DeleteArgs {
    /// Execute the delete command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let result = async {
            let config = load_config_or_default(config_path)?;
            let service = RecordService::from_config(&config).await?;
            service.delete(self.id).await
        }
        .await;

        match result {
            Ok(record) => {
                println!("✅ Deleted patient {} ({})", record.id, record.name);
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}
