//! ---
//! glx_section: "07-testing-qa"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Integration suite for the activity lifecycle."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use geolynx_api::{MockRemoteApi, RemoteApi};
use geolynx_execution::{
    ActivityLifecycleController, ExecutionAssignmentStore, ExecutionError, TransitionError,
};
use geolynx_model::{
    ExecutionSheet, OperationKey, OperationRecord, OperationStatus, PolygonAssignment,
};

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

async fn setup(
    status: OperationStatus,
) -> (
    Arc<MockRemoteApi>,
    Arc<ExecutionAssignmentStore>,
    Arc<ActivityLifecycleController>,
) {
    let mock = Arc::new(MockRemoteApi::new());
    mock.set_assignments(vec![sheet_with(status)]);
    let store = Arc::new(ExecutionAssignmentStore::new(mock.clone()));
    store.refresh().await.unwrap();
    let api: Arc<dyn RemoteApi> = mock.clone();
    let controller = Arc::new(ActivityLifecycleController::new(api, store.clone()));
    (mock, store, controller)
}

#[tokio::test]
async fn start_on_assigned_reflects_authoritative_ongoing() {
    let (mock, store, controller) = setup(OperationStatus::Assigned).await;

    let record = controller.start(&key()).await.unwrap();

    assert_eq!(record.status, OperationStatus::Ongoing);
    assert_eq!(record.operator_id.as_deref(), Some("op-field-1"));
    assert!(record.starting_date.is_some());
    assert_eq!(mock.start_calls(), 1);
    // The cache now carries the refreshed authoritative projection.
    assert_eq!(
        store.operation_record(&key()).unwrap().status,
        OperationStatus::Ongoing
    );
}

#[tokio::test]
async fn double_start_yields_one_remote_call_and_one_busy() {
    let (mock, _store, controller) = setup(OperationStatus::Assigned).await;
    let gate = mock.gate_next_start();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.start(&key()).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let err = controller.start(&key()).await.unwrap_err();
    assert!(matches!(err, ExecutionError::OperationBusy(_)));

    gate.release();
    let record = first.await.unwrap().unwrap();
    assert_eq!(record.status, OperationStatus::Ongoing);
    assert_eq!(mock.start_calls(), 1);
}

#[tokio::test]
async fn start_on_completed_is_terminal_without_network() {
    let (mock, _store, controller) = setup(OperationStatus::Completed).await;

    let err = controller.start(&key()).await.unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::Transition(TransitionError::TerminalState)
    ));
    assert_eq!(mock.start_calls(), 0);
}

#[tokio::test]
async fn stop_when_not_ongoing_is_local_error_without_network() {
    for status in [OperationStatus::Unassigned, OperationStatus::Assigned] {
        let (mock, _store, controller) = setup(status).await;
        let err = controller.stop(&key()).await.unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Transition(TransitionError::NotOngoing(_))
        ));
        assert_eq!(mock.stop_calls(), 0);
    }
}

#[tokio::test]
async fn stop_reflects_backend_completion_decision() {
    let (mock, _store, controller) = setup(OperationStatus::Ongoing).await;

    // Backend decides the operation still has work left.
    let record = controller.stop(&key()).await.unwrap();
    assert_eq!(record.status, OperationStatus::Assigned);

    // Restart, and this time the backend declares it finished.
    controller.start(&key()).await.unwrap();
    mock.complete_on_stop(&key());
    let record = controller.stop(&key()).await.unwrap();
    assert_eq!(record.status, OperationStatus::Completed);
    assert!(record.finishing_date.is_some());

    // Completed is terminal from here on, with no further remote calls.
    let starts_before = mock.start_calls();
    let err = controller.start(&key()).await.unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::Transition(TransitionError::TerminalState)
    ));
    assert_eq!(mock.start_calls(), starts_before);
}

#[tokio::test]
async fn sequential_commands_on_same_tuple_are_permitted() {
    let (mock, _store, controller) = setup(OperationStatus::Assigned).await;

    controller.start(&key()).await.unwrap();
    controller.stop(&key()).await.unwrap();
    controller.start(&key()).await.unwrap();

    assert_eq!(mock.start_calls(), 2);
    assert_eq!(mock.stop_calls(), 1);
}

#[tokio::test]
async fn commands_on_distinct_tuples_do_not_block_each_other() {
    let mock = Arc::new(MockRemoteApi::new());
    let mut sheet = sheet_with(OperationStatus::Assigned);
    sheet.polygons_operations[0]
        .operations
        .push(OperationRecord {
            operation_id: "OP-13".into(),
            status: OperationStatus::Assigned,
            operator_id: None,
            starting_date: None,
            finishing_date: None,
            observations: None,
            tracks: Vec::new(),
        });
    mock.set_assignments(vec![sheet]);
    let store = Arc::new(ExecutionAssignmentStore::new(mock.clone()));
    store.refresh().await.unwrap();
    let api: Arc<dyn RemoteApi> = mock.clone();
    let controller = Arc::new(ActivityLifecycleController::new(api, store));

    let gate = mock.gate_next_start();
    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.start(&key()).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    // A different operation on the same polygon is not considered busy.
    let sibling = OperationKey::new("ES-7", "PG-3", "OP-13");
    controller.start(&sibling).await.unwrap();

    gate.release();
    first.await.unwrap().unwrap();
    assert_eq!(mock.start_calls(), 2);
}
