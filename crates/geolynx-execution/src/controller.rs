//! ---
//! glx_section: "06-execution-tracking"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Execution tracking: assignment cache, state machine, activity control."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::sync::Arc;

use geolynx_api::{ApiError, RemoteApi};
use geolynx_model::{OperationKey, OperationRecord};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::lifecycle;
use crate::store::ExecutionAssignmentStore;
use crate::{ExecutionError, Result};

/// Orchestrates start/stop commands for operation records.
///
/// Commands are validated against the cached record before any network call,
/// guarded against concurrent submission per operation tuple, and followed by
/// a full assignment refresh: the backend owns status and timestamps, so the
/// local projection is re-read rather than patched.
pub struct ActivityLifecycleController {
    api: Arc<dyn RemoteApi>,
    store: Arc<ExecutionAssignmentStore>,
    in_flight: Mutex<HashSet<OperationKey>>,
}

/// Removes the key from the in-flight set when the command finishes.
struct InFlightGuard<'a> {
    controller: &'a ActivityLifecycleController,
    key: OperationKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.controller.in_flight.lock().remove(&self.key);
    }
}

impl ActivityLifecycleController {
    /// Create a controller over the given store and backend.
    pub fn new(api: Arc<dyn RemoteApi>, store: Arc<ExecutionAssignmentStore>) -> Self {
        Self {
            api,
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn acquire(&self, key: &OperationKey) -> Result<InFlightGuard<'_>> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(key.clone()) {
            return Err(ExecutionError::OperationBusy(key.clone()));
        }
        Ok(InFlightGuard {
            controller: self,
            key: key.clone(),
        })
    }

    /// Start activity on one operation.
    ///
    /// Fails fast locally when the cached status is ongoing or completed;
    /// otherwise issues the remote command and refreshes the assignment
    /// cache. Returns the refreshed authoritative record.
    pub async fn start(&self, key: &OperationKey) -> Result<OperationRecord> {
        let _guard = self.acquire(key)?;
        let cached = self.store.operation_record(key)?;
        lifecycle::validate_start(cached.status)?;

        self.api
            .start_activity(key)
            .await
            .map_err(|err| command_error(key, err))?;
        info!(operation = %key, "activity started");

        self.store.refresh().await?;
        self.store.operation_record(key)
    }

    /// Stop activity on one operation.
    ///
    /// Fails fast locally unless the cached status is ongoing; otherwise
    /// issues the remote command and refreshes. Whether the operation lands
    /// on assigned or completed is the backend's decision, visible in the
    /// returned record.
    pub async fn stop(&self, key: &OperationKey) -> Result<OperationRecord> {
        let _guard = self.acquire(key)?;
        let cached = self.store.operation_record(key)?;
        lifecycle::validate_stop(cached.status)?;

        self.api
            .stop_activity(key)
            .await
            .map_err(|err| command_error(key, err))?;
        info!(operation = %key, "activity stopped");

        self.store.refresh().await?;
        self.store.operation_record(key)
    }
}

fn command_error(key: &OperationKey, err: ApiError) -> ExecutionError {
    warn!(operation = %key, error = %err, "activity command failed");
    match err {
        ApiError::Backend(message) => ExecutionError::CommandRejected {
            key: key.clone(),
            message,
        },
        other => ExecutionError::FetchFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolynx_api::MockRemoteApi;
    use geolynx_model::{ExecutionSheet, OperationStatus, PolygonAssignment};

    fn sheet_with(status: OperationStatus) -> ExecutionSheet {
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
                    status,
                    operator_id: None,
                    starting_date: None,
                    finishing_date: None,
                    observations: None,
                    tracks: Vec::new(),
                }],
            }],
        }
    }

    fn key() -> OperationKey {
        OperationKey::new("ES-7", "PG-3", "OP-12")
    }

    async fn controller_with(
        status: OperationStatus,
    ) -> (Arc<MockRemoteApi>, ActivityLifecycleController) {
        let mock = Arc::new(MockRemoteApi::new());
        mock.set_assignments(vec![sheet_with(status)]);
        let store = Arc::new(ExecutionAssignmentStore::new(mock.clone()));
        store.refresh().await.unwrap();
        let api: Arc<dyn RemoteApi> = mock.clone();
        (mock, ActivityLifecycleController::new(api, store))
    }

    #[tokio::test]
    async fn start_on_completed_issues_no_network_call() {
        let (mock, controller) = controller_with(OperationStatus::Completed).await;
        let err = controller.start(&key()).await.unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Transition(lifecycle::TransitionError::TerminalState)
        ));
        assert_eq!(mock.start_calls(), 0);
    }

    #[tokio::test]
    async fn start_on_ongoing_issues_no_network_call() {
        let (mock, controller) = controller_with(OperationStatus::Ongoing).await;
        let err = controller.start(&key()).await.unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Transition(lifecycle::TransitionError::AlreadyOngoing)
        ));
        assert_eq!(mock.start_calls(), 0);
    }

    #[tokio::test]
    async fn stop_when_not_ongoing_issues_no_network_call() {
        let (mock, controller) = controller_with(OperationStatus::Assigned).await;
        let err = controller.stop(&key()).await.unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Transition(lifecycle::TransitionError::NotOngoing(
                OperationStatus::Assigned
            ))
        ));
        assert_eq!(mock.stop_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_operation_is_not_found() {
        let (mock, controller) = controller_with(OperationStatus::Assigned).await;
        let missing = OperationKey::new("ES-7", "PG-3", "OP-99");
        assert!(matches!(
            controller.start(&missing).await.unwrap_err(),
            ExecutionError::NotFound(_)
        ));
        assert_eq!(mock.start_calls(), 0);
    }

    #[tokio::test]
    async fn backend_rejection_leaves_cache_untouched() {
        let (mock, controller) = controller_with(OperationStatus::Assigned).await;
        mock.fail_next_start("operator not authorised");
        let err = controller.start(&key()).await.unwrap_err();
        assert!(matches!(err, ExecutionError::CommandRejected { .. }));
        assert_eq!(
            controller.store.operation_record(&key()).unwrap().status,
            OperationStatus::Assigned
        );
    }
}
