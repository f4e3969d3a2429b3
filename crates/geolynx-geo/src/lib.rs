//! ---
//! glx_section: "03-geospatial"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Coordinate validation, geohash bucketing, and viewport arithmetic."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
//! Geospatial primitives for the GeoLynx field core.
//!
//! Everything here is pure computation: coordinate validation, geohash-style
//! spatial bucketing, and the transient viewport value the map layer debounces.

#![warn(missing_docs)]

pub mod geohash;
pub mod viewport;

use serde::{Deserialize, Serialize};

pub use geohash::{decode, encode, DecodedCell, GeoIndexKey, MAX_PRECISION};
pub use viewport::Viewport;

/// Shared result type for geospatial operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors produced by geospatial primitives.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    /// Latitude/longitude pair outside the valid domain (or not finite).
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate {
        /// Offending latitude.
        latitude: f64,
        /// Offending longitude.
        longitude: f64,
    },
    /// Requested precision outside `1..=MAX_PRECISION`.
    #[error("invalid geohash precision {0} (expected 1..={MAX_PRECISION})")]
    InvalidPrecision(usize),
    /// Key contains characters outside the geohash base-32 alphabet.
    #[error("invalid geohash key {0:?}")]
    InvalidKey(String),
}

/// Validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, within `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in degrees, within `[-180, 180]`.
    pub longitude: f64,
}

impl Coordinate {
    /// Construct a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return Err(GeoError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Chebyshev distance in degrees, used by the map jitter gate.
    pub fn degree_distance(&self, other: &Coordinate) -> f64 {
        let dlat = (self.latitude - other.latitude).abs();
        let dlon = (self.longitude - other.longitude).abs();
        dlat.max(dlon)
    }
}
