//! ---
//! glx_section: "05-networking-external-interfaces"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Remote backend interface and transports."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use geolynx_geo::GeoIndexKey;
use geolynx_model::{
    Animal, AnimalUpload, CuriosityUpload, ExecutionSheet, HistoricalCuriosity, NearbyEntities,
    OperationKey, OperationStatus,
};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::remote::RemoteApi;
use crate::{ApiError, Result};

/// Handle releasing one deferred mock response.
///
/// While unreleased, the corresponding call stays in flight, which is how
/// ordering and re-entrancy tests exercise overlapping requests.
#[derive(Clone)]
pub struct GateHandle {
    semaphore: Arc<Semaphore>,
}

impl GateHandle {
    fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(0)),
        }
    }

    /// Allow the gated call to proceed.
    pub fn release(&self) {
        self.semaphore.add_permits(1);
    }
}

#[derive(Default)]
struct MockState {
    nearby_by_key: HashMap<String, NearbyEntities>,
    nearby_failures: VecDeque<String>,
    nearby_gates: VecDeque<Arc<Semaphore>>,
    nearby_keys: Vec<String>,
    assignments: Vec<ExecutionSheet>,
    assignment_failures: VecDeque<String>,
    start_failures: VecDeque<String>,
    stop_failures: VecDeque<String>,
    start_gates: VecDeque<Arc<Semaphore>>,
    stop_gates: VecDeque<Arc<Semaphore>>,
    completes_on_stop: HashSet<OperationKey>,
    operator_id: String,
}

/// In-memory backend, primarily for tests and single-process integration.
///
/// Behaves as a miniature authoritative server: start/stop commands mutate
/// the held assignment set the way the real backend does, so a refresh after
/// a command observes the new authoritative state.
#[derive(Default)]
pub struct MockRemoteApi {
    state: Mutex<MockState>,
    nearby_calls: AtomicUsize,
    assignment_calls: AtomicUsize,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl MockRemoteApi {
    /// Create an empty mock backend with operator `op-field-1`.
    pub fn new() -> Self {
        let mock = Self::default();
        mock.state.lock().operator_id = "op-field-1".to_owned();
        mock
    }

    /// Script the entity set returned for one geohash bucket.
    pub fn set_nearby(&self, key: &str, entities: NearbyEntities) {
        self.state
            .lock()
            .nearby_by_key
            .insert(key.to_owned(), entities);
    }

    /// Fail the next nearby-entity fetch with a transport error.
    pub fn fail_next_nearby(&self, message: &str) {
        self.state
            .lock()
            .nearby_failures
            .push_back(message.to_owned());
    }

    /// Defer the next nearby-entity fetch until the returned gate is released.
    pub fn gate_next_nearby(&self) -> GateHandle {
        let gate = GateHandle::new();
        self.state
            .lock()
            .nearby_gates
            .push_back(gate.semaphore.clone());
        gate
    }

    /// Geohash keys requested so far, in issue order.
    pub fn nearby_keys(&self) -> Vec<String> {
        self.state.lock().nearby_keys.clone()
    }

    /// Replace the authoritative assignment set.
    pub fn set_assignments(&self, sheets: Vec<ExecutionSheet>) {
        self.state.lock().assignments = sheets;
    }

    /// Fail the next assignment fetch with a transport error.
    pub fn fail_next_assignments(&self, message: &str) {
        self.state
            .lock()
            .assignment_failures
            .push_back(message.to_owned());
    }

    /// Identity stamped onto records when activity starts.
    pub fn set_operator(&self, operator_id: &str) {
        self.state.lock().operator_id = operator_id.to_owned();
    }

    /// Mark an operation as fully finished by its next successful stop.
    pub fn complete_on_stop(&self, key: &OperationKey) {
        self.state.lock().completes_on_stop.insert(key.clone());
    }

    /// Reject the next start command with a backend error.
    pub fn fail_next_start(&self, message: &str) {
        self.state
            .lock()
            .start_failures
            .push_back(message.to_owned());
    }

    /// Reject the next stop command with a backend error.
    pub fn fail_next_stop(&self, message: &str) {
        self.state
            .lock()
            .stop_failures
            .push_back(message.to_owned());
    }

    /// Defer the next start command until the returned gate is released.
    pub fn gate_next_start(&self) -> GateHandle {
        let gate = GateHandle::new();
        self.state
            .lock()
            .start_gates
            .push_back(gate.semaphore.clone());
        gate
    }

    /// Defer the next stop command until the returned gate is released.
    pub fn gate_next_stop(&self) -> GateHandle {
        let gate = GateHandle::new();
        self.state
            .lock()
            .stop_gates
            .push_back(gate.semaphore.clone());
        gate
    }

    /// Number of nearby-entity fetches issued.
    pub fn nearby_calls(&self) -> usize {
        self.nearby_calls.load(Ordering::SeqCst)
    }

    /// Number of assignment fetches issued.
    pub fn assignment_calls(&self) -> usize {
        self.assignment_calls.load(Ordering::SeqCst)
    }

    /// Number of start commands issued.
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// Number of stop commands issued.
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    async fn wait_gate(&self, gate: Option<Arc<Semaphore>>) {
        if let Some(gate) = gate {
            let permit = gate.acquire().await.expect("gate semaphore closed");
            permit.forget();
        }
    }
}

#[async_trait]
impl RemoteApi for MockRemoteApi {
    async fn nearby_entities(&self, key: &GeoIndexKey) -> Result<NearbyEntities> {
        self.nearby_calls.fetch_add(1, Ordering::SeqCst);
        let (gate, failure) = {
            let mut state = self.state.lock();
            state.nearby_keys.push(key.as_str().to_owned());
            (state.nearby_gates.pop_front(), state.nearby_failures.pop_front())
        };
        self.wait_gate(gate).await;
        if let Some(message) = failure {
            return Err(ApiError::Transport(message));
        }
        Ok(self
            .state
            .lock()
            .nearby_by_key
            .get(key.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn my_assignments(&self) -> Result<Vec<ExecutionSheet>> {
        self.assignment_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.state.lock().assignment_failures.pop_front();
        if let Some(message) = failure {
            return Err(ApiError::Transport(message));
        }
        Ok(self.state.lock().assignments.clone())
    }

    async fn start_activity(&self, key: &OperationKey) -> Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let (gate, failure) = {
            let mut state = self.state.lock();
            (state.start_gates.pop_front(), state.start_failures.pop_front())
        };
        self.wait_gate(gate).await;
        if let Some(message) = failure {
            return Err(ApiError::Backend(message));
        }
        let mut state = self.state.lock();
        let operator_id = state.operator_id.clone();
        let record = find_record(&mut state.assignments, key)
            .ok_or_else(|| ApiError::Backend(format!("unknown operation {}", key)))?;
        match record.status {
            OperationStatus::Ongoing => {
                return Err(ApiError::Backend("activity already ongoing".to_owned()))
            }
            OperationStatus::Completed => {
                return Err(ApiError::Backend("operation already completed".to_owned()))
            }
            _ => {}
        }
        record.status = OperationStatus::Ongoing;
        record.operator_id = Some(operator_id);
        record.starting_date.get_or_insert_with(Utc::now);
        Ok(())
    }

    async fn stop_activity(&self, key: &OperationKey) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        let (gate, failure) = {
            let mut state = self.state.lock();
            (state.stop_gates.pop_front(), state.stop_failures.pop_front())
        };
        self.wait_gate(gate).await;
        if let Some(message) = failure {
            return Err(ApiError::Backend(message));
        }
        let mut state = self.state.lock();
        let completes = state.completes_on_stop.remove(key);
        let record = find_record(&mut state.assignments, key)
            .ok_or_else(|| ApiError::Backend(format!("unknown operation {}", key)))?;
        if record.status != OperationStatus::Ongoing {
            return Err(ApiError::Backend("no ongoing activity to stop".to_owned()));
        }
        if completes {
            record.status = OperationStatus::Completed;
            record.finishing_date = Some(Utc::now());
        } else {
            record.status = OperationStatus::Assigned;
        }
        Ok(())
    }

    async fn upload_animal(&self, upload: &AnimalUpload) -> Result<Animal> {
        Ok(Animal {
            id: format!("animal-{}", upload.name),
            name: upload.name.clone(),
            description: upload.description.clone(),
            latitude: upload.latitude,
            longitude: upload.longitude,
            image_url: None,
        })
    }

    async fn upload_curiosity(&self, upload: &CuriosityUpload) -> Result<HistoricalCuriosity> {
        Ok(HistoricalCuriosity {
            id: format!("curiosity-{}", upload.title),
            title: upload.title.clone(),
            description: upload.description.clone(),
            latitude: upload.latitude,
            longitude: upload.longitude,
            image_url: None,
        })
    }
}

fn find_record<'a>(
    sheets: &'a mut [ExecutionSheet],
    key: &OperationKey,
) -> Option<&'a mut geolynx_model::OperationRecord> {
    sheets
        .iter_mut()
        .find(|sheet| sheet.id == key.execution_sheet_id)?
        .polygons_operations
        .iter_mut()
        .find(|assignment| assignment.polygon_id == key.polygon_id)?
        .operations
        .iter_mut()
        .find(|record| record.operation_id == key.operation_id)
}
