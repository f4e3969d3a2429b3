//! ---
//! glx_section: "05-networking-external-interfaces"
//! glx_subsection: "binary"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Diagnostic CLI for the GeoLynx field core."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use geolynx_api::HttpRemoteApi;
use geolynx_common::AppConfig;
use geolynx_execution::{ActivityLifecycleController, ExecutionAssignmentStore};
use geolynx_model::OperationKey;

/// Start/stop field activity on one operation.
#[derive(Debug, Subcommand)]
pub enum ActivityCommand {
    /// Start activity on an operation.
    Start(OperationTarget),
    /// Stop activity on an operation.
    Stop(OperationTarget),
}

/// Fully-qualified operation address.
#[derive(Debug, Args)]
pub struct OperationTarget {
    /// Execution sheet identifier.
    #[arg(long)]
    pub sheet: String,
    /// Polygon identifier within the sheet.
    #[arg(long)]
    pub polygon: String,
    /// Operation identifier within the polygon.
    #[arg(long)]
    pub operation: String,
}

impl OperationTarget {
    fn key(&self) -> OperationKey {
        OperationKey::new(&self.sheet, &self.polygon, &self.operation)
    }
}

/// Execute the supplied activity command.
pub async fn run(command: ActivityCommand, config: &AppConfig) -> Result<()> {
    let api = Arc::new(HttpRemoteApi::from_config(&config.api)?);
    let store = Arc::new(ExecutionAssignmentStore::new(api.clone()));
    store.refresh().await?;
    let controller = ActivityLifecycleController::new(api, store);

    match command {
        ActivityCommand::Start(target) => {
            let record = controller.start(&target.key()).await?;
            println!(
                "started {}: status {}, operator {}",
                target.key(),
                record.status,
                record.operator_id.as_deref().unwrap_or("-")
            );
        }
        ActivityCommand::Stop(target) => {
            let record = controller.stop(&target.key()).await?;
            println!("stopped {}: status {}", target.key(), record.status);
        }
    }
    Ok(())
}
