//! ---
//! glx_section: "05-networking-external-interfaces"
//! glx_subsection: "binary"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Diagnostic CLI for the GeoLynx field core."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geolynx_common::{init_tracing, AppConfig};

mod activity;
mod assignments;
mod spatial;

const CONFIG_CANDIDATES: &[&str] = &["geolynx.toml", "configs/geolynx.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "GeoLynx field-core diagnostic utility",
    long_about = None
)]
struct Cli {
    /// Path to the configuration file (overrides the default candidates).
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(subcommand, about = "Execution sheet assignment queries")]
    Assignments(assignments::AssignmentsCommand),
    #[command(subcommand, about = "Start/stop field activity")]
    Activity(activity::ActivityCommand),
    #[command(subcommand, about = "Spatial queries and geohash tooling")]
    Spatial(spatial::SpatialCommand),
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    match &cli.config {
        Some(path) => AppConfig::load(&[path.as_path()])
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => {
            // Fall back to defaults when no config file is present; the CLI
            // must stay usable for pure geohash tooling without a backend.
            let candidates: Vec<PathBuf> = CONFIG_CANDIDATES.iter().map(PathBuf::from).collect();
            Ok(AppConfig::load(&candidates).unwrap_or_default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing("geolynxctl", &config.logging)?;

    match cli.command {
        Commands::Assignments(cmd) => assignments::run(cmd, &config).await?,
        Commands::Activity(cmd) => activity::run(cmd, &config).await?,
        Commands::Spatial(cmd) => spatial::run(cmd, &config).await?,
    }
    Ok(())
}
