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
use clap::Subcommand;
use geolynx_api::HttpRemoteApi;
use geolynx_common::AppConfig;
use geolynx_execution::ExecutionAssignmentStore;

/// Assignment queries.
#[derive(Debug, Subcommand)]
pub enum AssignmentsCommand {
    /// Fetch and print the sheets assigned to the current operator.
    List {
        /// Emit the raw JSON payload instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

/// Execute the supplied assignments command.
pub async fn run(command: AssignmentsCommand, config: &AppConfig) -> Result<()> {
    let api = Arc::new(HttpRemoteApi::from_config(&config.api)?);
    let store = ExecutionAssignmentStore::new(api);

    match command {
        AssignmentsCommand::List { json } => {
            let sheets = store.refresh().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sheets)?);
                return Ok(());
            }
            if sheets.is_empty() {
                println!("no execution sheets assigned");
                return Ok(());
            }
            for sheet in sheets {
                println!(
                    "{} ({} polygons)",
                    sheet.id,
                    sheet.polygons_operations.len()
                );
                for assignment in &sheet.polygons_operations {
                    for record in &assignment.operations {
                        println!(
                            "  {}/{} -> {}",
                            assignment.polygon_id, record.operation_id, record.status
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
