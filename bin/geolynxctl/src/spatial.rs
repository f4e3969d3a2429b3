//! ---
//! glx_section: "05-networking-external-interfaces"
//! glx_subsection: "binary"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Diagnostic CLI for the GeoLynx field core."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use anyhow::Result;
use clap::{Args, Subcommand};
use geolynx_api::{HttpRemoteApi, RemoteApi};
use geolynx_common::AppConfig;
use geolynx_geo::{geohash, Coordinate};

/// Spatial queries and geohash tooling.
#[derive(Debug, Subcommand)]
pub enum SpatialCommand {
    /// Fetch the entities near a coordinate.
    Nearby(NearbyOptions),
    /// Encode a coordinate to its geohash bucket.
    Encode(EncodeOptions),
    /// Decode a geohash key to its cell centre and error bounds.
    Decode {
        /// Geohash key to decode.
        key: String,
    },
}

/// Options for the nearby query.
#[derive(Debug, Args)]
pub struct NearbyOptions {
    /// Latitude in degrees.
    #[arg(long)]
    pub lat: f64,
    /// Longitude in degrees.
    #[arg(long)]
    pub lon: f64,
    /// Geohash precision override.
    #[arg(long)]
    pub precision: Option<usize>,
}

/// Options for geohash encoding.
#[derive(Debug, Args)]
pub struct EncodeOptions {
    /// Latitude in degrees.
    #[arg(long)]
    pub lat: f64,
    /// Longitude in degrees.
    #[arg(long)]
    pub lon: f64,
    /// Geohash precision override.
    #[arg(long)]
    pub precision: Option<usize>,
}

/// Execute the supplied spatial command.
pub async fn run(command: SpatialCommand, config: &AppConfig) -> Result<()> {
    match command {
        SpatialCommand::Nearby(options) => {
            let center = Coordinate::new(options.lat, options.lon)?;
            let precision = options.precision.unwrap_or(config.map.geohash_precision);
            let key = geohash::encode(center, precision)?;
            let api = HttpRemoteApi::from_config(&config.api)?;
            let entities = api.nearby_entities(&key).await?;
            println!(
                "bucket {}: {} animals, {} curiosities",
                key,
                entities.animals.len(),
                entities.curiosities.len()
            );
            for animal in &entities.animals {
                println!("  animal {} ({}, {})", animal.name, animal.latitude, animal.longitude);
            }
            for curiosity in &entities.curiosities {
                println!(
                    "  curiosity {} ({}, {})",
                    curiosity.title, curiosity.latitude, curiosity.longitude
                );
            }
        }
        SpatialCommand::Encode(options) => {
            let center = Coordinate::new(options.lat, options.lon)?;
            let precision = options.precision.unwrap_or(config.map.geohash_precision);
            println!("{}", geohash::encode(center, precision)?);
        }
        SpatialCommand::Decode { key } => {
            let cell = geohash::decode(&key)?;
            println!(
                "centre ({}, {}), error ±{}° lat, ±{}° lon",
                cell.center.latitude,
                cell.center.longitude,
                cell.latitude_error,
                cell.longitude_error
            );
        }
    }
    Ok(())
}
