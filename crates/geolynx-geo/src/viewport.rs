//! ---
//! glx_section: "03-geospatial"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Coordinate validation, geohash bucketing, and viewport arithmetic."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::{Coordinate, Result};

/// Transient map viewport: centre plus deltas (effective zoom).
///
/// Owned by the map surface; only the latest value matters. Loading decisions
/// key off the centre, the deltas are carried for display symmetry with the
/// mobile map region model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport centre.
    pub center: Coordinate,
    /// Visible latitude span in degrees.
    pub latitude_delta: f64,
    /// Visible longitude span in degrees.
    pub longitude_delta: f64,
}

impl Viewport {
    /// Construct a viewport around a validated centre.
    pub fn new(latitude: f64, longitude: f64, latitude_delta: f64, longitude_delta: f64) -> Result<Self> {
        Ok(Self {
            center: Coordinate::new(latitude, longitude)?,
            latitude_delta,
            longitude_delta,
        })
    }

    /// Whether this viewport's centre is within `epsilon_deg` of `anchor`.
    ///
    /// Used to suppress refetching on sub-pixel map jitter.
    pub fn within_jitter(&self, anchor: &Coordinate, epsilon_deg: f64) -> bool {
        self.center.degree_distance(anchor) <= epsilon_deg
    }
}
