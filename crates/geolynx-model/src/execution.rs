//! ---
//! glx_section: "02-data-model"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Wire and domain data model shared across the field core."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of one operation on one polygon.
///
/// The backend is authoritative for this value; the client only validates
/// transitions before issuing commands and reflects whatever the refreshed
/// record carries afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// No operator has ever been associated with the operation.
    #[default]
    Unassigned,
    /// An operator is associated but no activity is running.
    Assigned,
    /// Activity is currently running.
    Ongoing,
    /// The operation is finished. Terminal.
    Completed,
}

impl OperationStatus {
    /// Whether the status permits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationStatus::Completed)
    }

    /// Whether activity is currently running.
    pub fn is_ongoing(self) -> bool {
        matches!(self, OperationStatus::Ongoing)
    }

    /// Wire representation, also used in user-facing messages.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationStatus::Unassigned => "unassigned",
            OperationStatus::Assigned => "assigned",
            OperationStatus::Ongoing => "ongoing",
            OperationStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One closed ring of worked area, as reported by the backend.
///
/// Coordinates are `[longitude, latitude]` pairs (GeoJSON order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryTrack {
    /// Optional track classification supplied by the backend.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Ring vertices in `[longitude, latitude]` order.
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

/// Lifecycle record for one type of work on one polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    /// Operation identifier, unique within its polygon assignment.
    pub operation_id: String,
    /// Authoritative lifecycle status.
    #[serde(default)]
    pub status: OperationStatus,
    /// Operator associated with the operation, set once activity first starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,
    /// Timestamp of the first successful start, backend-assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_date: Option<DateTime<Utc>>,
    /// Timestamp of completion, backend-assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing_date: Option<DateTime<Utc>>,
    /// Free-text field notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Worked-area rings recorded so far.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<GeometryTrack>,
}

/// Work scoped to one geographic polygon within an execution sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonAssignment {
    /// Polygon identifier, unique within its sheet.
    pub polygon_id: String,
    /// Operations carried by this polygon, each with independent state.
    #[serde(default)]
    pub operations: Vec<OperationRecord>,
}

impl PolygonAssignment {
    /// Look up an operation record by identifier.
    pub fn operation(&self, operation_id: &str) -> Option<&OperationRecord> {
        self.operations
            .iter()
            .find(|record| record.operation_id == operation_id)
    }
}

/// Server-issued record of field work assigned to an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSheet {
    /// Sheet identifier.
    pub id: String,
    /// Dispatch date of the sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_date: Option<DateTime<Utc>>,
    /// Closure date of the sheet, if finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing_date: Option<DateTime<Utc>>,
    /// Timestamp of the most recent activity on any contained operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<DateTime<Utc>>,
    /// Free-text sheet notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Per-polygon work, in dispatch order.
    #[serde(default)]
    pub polygons_operations: Vec<PolygonAssignment>,
}

impl ExecutionSheet {
    /// Look up a polygon assignment by identifier.
    pub fn polygon(&self, polygon_id: &str) -> Option<&PolygonAssignment> {
        self.polygons_operations
            .iter()
            .find(|assignment| assignment.polygon_id == polygon_id)
    }

    /// Look up an operation record by polygon and operation identifiers.
    pub fn operation(&self, polygon_id: &str, operation_id: &str) -> Option<&OperationRecord> {
        self.polygon(polygon_id)
            .and_then(|assignment| assignment.operation(operation_id))
    }
}

/// Fully-qualified address of one operation record.
///
/// This is the tuple the activity controller keys its in-flight guard by and
/// the payload shape of the start/stop commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationKey {
    /// Sheet identifier.
    pub execution_sheet_id: String,
    /// Polygon identifier within the sheet.
    pub polygon_id: String,
    /// Operation identifier within the polygon.
    pub operation_id: String,
}

impl OperationKey {
    /// Construct a key from its three parts.
    pub fn new(
        execution_sheet_id: impl Into<String>,
        polygon_id: impl Into<String>,
        operation_id: impl Into<String>,
    ) -> Self {
        Self {
            execution_sheet_id: execution_sheet_id.into(),
            polygon_id: polygon_id.into(),
            operation_id: operation_id.into(),
        }
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.execution_sheet_id, self.polygon_id, self.operation_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_lowercase() {
        let encoded = serde_json::to_string(&OperationStatus::Ongoing).unwrap();
        assert_eq!(encoded, "\"ongoing\"");
        let decoded: OperationStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(decoded, OperationStatus::Completed);
    }

    #[test]
    fn sheet_parses_backend_payload() {
        let sheet: ExecutionSheet = serde_json::from_str(
            r#"{
                "id": "ES-7",
                "startingDate": "2026-03-02T08:00:00Z",
                "observations": "south ridge",
                "polygonsOperations": [
                    {
                        "polygonId": "PG-3",
                        "operations": [
                            {
                                "operationId": "OP-12",
                                "status": "assigned",
                                "tracks": [
                                    {"type": "worked", "coordinates": [[-9.15, 38.70], [-9.14, 38.71]]}
                                ]
                            }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let record = sheet.operation("PG-3", "OP-12").unwrap();
        assert_eq!(record.status, OperationStatus::Assigned);
        assert_eq!(record.tracks[0].coordinates[0], [-9.15, 38.70]);
        assert!(sheet.operation("PG-3", "OP-99").is_none());
        assert!(sheet.polygon("PG-9").is_none());
    }

    #[test]
    fn missing_status_defaults_to_unassigned() {
        let record: OperationRecord =
            serde_json::from_str(r#"{"operationId": "OP-1"}"#).unwrap();
        assert_eq!(record.status, OperationStatus::Unassigned);
        assert!(!record.status.is_terminal());
    }

    #[test]
    fn operation_key_serialises_command_payload() {
        let key = OperationKey::new("ES-7", "PG-3", "OP-12");
        let encoded = serde_json::to_value(&key).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({
                "executionSheetId": "ES-7",
                "polygonId": "PG-3",
                "operationId": "OP-12"
            })
        );
        assert_eq!(key.to_string(), "ES-7/PG-3/OP-12");
    }
}
