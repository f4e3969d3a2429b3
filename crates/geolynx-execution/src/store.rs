//! ---
//! glx_section: "06-execution-tracking"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Execution tracking: assignment cache, state machine, activity control."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::sync::Arc;

use geolynx_api::RemoteApi;
use geolynx_model::{ExecutionSheet, OperationKey, OperationRecord, PolygonAssignment};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{ExecutionError, Result};

/// Read-through cache of the execution sheets assigned to the operator.
///
/// The only writer is [`refresh`](ExecutionAssignmentStore::refresh) (and
/// [`clear`](ExecutionAssignmentStore::clear) on logout); every other method
/// hands out snapshots. Record mutation happens exclusively on the backend
/// and arrives here through refresh.
pub struct ExecutionAssignmentStore {
    api: Arc<dyn RemoteApi>,
    cache: RwLock<Vec<ExecutionSheet>>,
}

impl ExecutionAssignmentStore {
    /// Create an empty store backed by the given remote.
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self {
            api,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Re-fetch the assignment set from the backend.
    ///
    /// On failure the previously cached sheets are retained and
    /// [`ExecutionError::FetchFailed`] is returned.
    pub async fn refresh(&self) -> Result<Vec<ExecutionSheet>> {
        match self.api.my_assignments().await {
            Ok(sheets) => {
                info!(sheets = sheets.len(), "assignment cache refreshed");
                *self.cache.write() = sheets.clone();
                Ok(sheets)
            }
            Err(err) => {
                warn!(error = %err, "assignment refresh failed, cache retained");
                Err(ExecutionError::FetchFailed(err.to_string()))
            }
        }
    }

    /// Snapshot of all cached sheets.
    pub fn sheets(&self) -> Vec<ExecutionSheet> {
        self.cache.read().clone()
    }

    /// Snapshot of one sheet by identifier.
    pub fn sheet(&self, sheet_id: &str) -> Option<ExecutionSheet> {
        self.cache
            .read()
            .iter()
            .find(|sheet| sheet.id == sheet_id)
            .cloned()
    }

    /// Snapshot of one polygon assignment.
    pub fn get_by_polygon(&self, sheet_id: &str, polygon_id: &str) -> Result<PolygonAssignment> {
        self.cache
            .read()
            .iter()
            .find(|sheet| sheet.id == sheet_id)
            .and_then(|sheet| sheet.polygon(polygon_id))
            .cloned()
            .ok_or_else(|| ExecutionError::NotFound(format!("{}/{}", sheet_id, polygon_id)))
    }

    /// Snapshot of one operation record.
    pub fn operation_record(&self, key: &OperationKey) -> Result<OperationRecord> {
        self.cache
            .read()
            .iter()
            .find(|sheet| sheet.id == key.execution_sheet_id)
            .and_then(|sheet| sheet.operation(&key.polygon_id, &key.operation_id))
            .cloned()
            .ok_or_else(|| ExecutionError::NotFound(key.to_string()))
    }

    /// Drop all cached sheets (logout).
    pub fn clear(&self) {
        debug!("assignment cache cleared");
        self.cache.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolynx_api::MockRemoteApi;
    use geolynx_model::OperationStatus;

    fn sheet() -> ExecutionSheet {
        ExecutionSheet {
            id: "ES-7".into(),
            starting_date: None,
            finishing_date: None,
            last_activity_date: None,
            observations: None,
            polygons_operations: vec![PolygonAssignment {
                polygon_id: "PG-3".into(),
                operations: vec![OperationRecord {
                    operation_id: "OP-12".into(),
                    status: OperationStatus::Assigned,
                    operator_id: None,
                    starting_date: None,
                    finishing_date: None,
                    observations: None,
                    tracks: Vec::new(),
                }],
            }],
        }
    }

    #[tokio::test]
    async fn refresh_populates_lookups() {
        let mock = Arc::new(MockRemoteApi::new());
        mock.set_assignments(vec![sheet()]);
        let store = ExecutionAssignmentStore::new(mock);

        store.refresh().await.unwrap();
        let assignment = store.get_by_polygon("ES-7", "PG-3").unwrap();
        assert_eq!(assignment.operations.len(), 1);
        let record = store
            .operation_record(&OperationKey::new("ES-7", "PG-3", "OP-12"))
            .unwrap();
        assert_eq!(record.status, OperationStatus::Assigned);
    }

    #[tokio::test]
    async fn missing_entries_surface_not_found() {
        let mock = Arc::new(MockRemoteApi::new());
        mock.set_assignments(vec![sheet()]);
        let store = ExecutionAssignmentStore::new(mock);
        store.refresh().await.unwrap();

        assert!(matches!(
            store.get_by_polygon("ES-7", "PG-9"),
            Err(ExecutionError::NotFound(_))
        ));
        assert!(matches!(
            store.operation_record(&OperationKey::new("ES-9", "PG-3", "OP-12")),
            Err(ExecutionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_refresh_retains_cache() {
        let mock = Arc::new(MockRemoteApi::new());
        mock.set_assignments(vec![sheet()]);
        let store = ExecutionAssignmentStore::new(mock.clone());
        store.refresh().await.unwrap();

        mock.fail_next_assignments("gateway timeout");
        let err = store.refresh().await.unwrap_err();
        assert!(matches!(err, ExecutionError::FetchFailed(_)));
        assert_eq!(store.sheets().len(), 1);
    }

    #[tokio::test]
    async fn clear_empties_the_cache() {
        let mock = Arc::new(MockRemoteApi::new());
        mock.set_assignments(vec![sheet()]);
        let store = ExecutionAssignmentStore::new(mock);
        store.refresh().await.unwrap();
        store.clear();
        assert!(store.sheets().is_empty());
    }
}
