//! ---
//! glx_section: "03-geospatial"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Coordinate validation, geohash bucketing, and viewport arithmetic."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Coordinate, GeoError, Result};

/// Maximum supported geohash precision.
pub const MAX_PRECISION: usize = 12;

/// Standard geohash base-32 alphabet (omits a, i, l, o).
const ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Coarse spatial bucket key used to request nearby entities.
///
/// Two coordinates sharing a key at a given precision are within the cell's
/// bounding error of each other; shorter keys are strict prefixes describing
/// coarser cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoIndexKey(String);

impl GeoIndexKey {
    /// The key's base-32 text form, as sent to the backend.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Precision (character count) of the key.
    pub fn precision(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for GeoIndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cell recovered from a [`GeoIndexKey`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedCell {
    /// Cell centre.
    pub center: Coordinate,
    /// Half-height of the cell in degrees latitude.
    pub latitude_error: f64,
    /// Half-width of the cell in degrees longitude.
    pub longitude_error: f64,
}

/// Encode a coordinate into its geohash bucket at the requested precision.
pub fn encode(coordinate: Coordinate, precision: usize) -> Result<GeoIndexKey> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(GeoError::InvalidPrecision(precision));
    }

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut key = String::with_capacity(precision);
    let mut bits = 0u8;
    let mut bit_count = 0u8;
    let mut even_bit = true;

    while key.len() < precision {
        if even_bit {
            let mid = (lon_range.0 + lon_range.1) / 2.0;
            if coordinate.longitude >= mid {
                bits = (bits << 1) | 1;
                lon_range.0 = mid;
            } else {
                bits <<= 1;
                lon_range.1 = mid;
            }
        } else {
            let mid = (lat_range.0 + lat_range.1) / 2.0;
            if coordinate.latitude >= mid {
                bits = (bits << 1) | 1;
                lat_range.0 = mid;
            } else {
                bits <<= 1;
                lat_range.1 = mid;
            }
        }
        even_bit = !even_bit;
        bit_count += 1;
        if bit_count == 5 {
            key.push(ALPHABET[bits as usize] as char);
            bits = 0;
            bit_count = 0;
        }
    }

    Ok(GeoIndexKey(key))
}

/// Decode a key back to its cell centre and error bounds.
pub fn decode(key: &str) -> Result<DecodedCell> {
    if key.is_empty() || key.len() > MAX_PRECISION {
        return Err(GeoError::InvalidKey(key.to_owned()));
    }

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut even_bit = true;

    for ch in key.bytes() {
        let value = ALPHABET
            .iter()
            .position(|candidate| *candidate == ch.to_ascii_lowercase())
            .ok_or_else(|| GeoError::InvalidKey(key.to_owned()))?;
        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1;
            if even_bit {
                let mid = (lon_range.0 + lon_range.1) / 2.0;
                if bit == 1 {
                    lon_range.0 = mid;
                } else {
                    lon_range.1 = mid;
                }
            } else {
                let mid = (lat_range.0 + lat_range.1) / 2.0;
                if bit == 1 {
                    lat_range.0 = mid;
                } else {
                    lat_range.1 = mid;
                }
            }
            even_bit = !even_bit;
        }
    }

    let latitude_error = (lat_range.1 - lat_range.0) / 2.0;
    let longitude_error = (lon_range.1 - lon_range.0) / 2.0;
    let center = Coordinate::new(
        lat_range.0 + latitude_error,
        lon_range.0 + longitude_error,
    )?;

    Ok(DecodedCell {
        center,
        latitude_error,
        longitude_error,
    })
}
