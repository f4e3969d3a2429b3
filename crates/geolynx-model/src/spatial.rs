//! ---
//! glx_section: "02-data-model"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Wire and domain data model shared across the field core."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

/// Animal sighting shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sighting latitude in degrees.
    pub latitude: f64,
    /// Sighting longitude in degrees.
    pub longitude: f64,
    /// Optional image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Historical point of interest shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalCuriosity {
    /// Backend identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Optional image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Combined nearby-entity response for one geohash bucket.
///
/// Animals and curiosities are carried independently because the visible set
/// replaces each collection wholesale on a successful viewport reconciliation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NearbyEntities {
    /// Animals inside the requested bucket.
    #[serde(default)]
    pub animals: Vec<Animal>,
    /// Historical curiosities inside the requested bucket.
    #[serde(default)]
    pub curiosities: Vec<HistoricalCuriosity>,
}

impl NearbyEntities {
    /// Whether the bucket contained no entities of either kind.
    pub fn is_empty(&self) -> bool {
        self.animals.is_empty() && self.curiosities.is_empty()
    }
}

/// Payload for submitting a new animal sighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalUpload {
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sighting latitude in degrees.
    pub latitude: f64,
    /// Sighting longitude in degrees.
    pub longitude: f64,
}

/// Payload for submitting a new historical curiosity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuriosityUpload {
    /// Display title.
    pub title: String,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_entities_tolerates_missing_collections() {
        let parsed: NearbyEntities = serde_json::from_str(r#"{"animals": []}"#).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn animal_parses_backend_payload() {
        let animal: Animal = serde_json::from_str(
            r#"{"id": "AN-4", "name": "Iberian lynx", "latitude": 38.7, "longitude": -9.15}"#,
        )
        .unwrap();
        assert_eq!(animal.name, "Iberian lynx");
        assert!(animal.image_url.is_none());
    }
}
