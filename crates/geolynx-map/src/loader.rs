//! ---
//! glx_section: "04-map-viewport"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Viewport-driven spatial entity loading."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use geolynx_api::RemoteApi;
use geolynx_geo::{geohash, Coordinate, Viewport};
use geolynx_model::{Animal, AnimalUpload, CuriosityUpload, HistoricalCuriosity, NearbyEntities};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::debounce::FetchAnchor;
use crate::{MapError, Result};

/// Snapshot of the entities currently visible on the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleEntities {
    /// Visible animal sightings.
    pub animals: Vec<Animal>,
    /// Visible historical curiosities.
    pub curiosities: Vec<HistoricalCuriosity>,
}

/// What happened to one settled-viewport fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was the newest seen and replaced the visible set.
    Applied,
    /// A newer fetch was applied first; this response was discarded.
    /// Internal bookkeeping only, never surfaced to the user.
    StaleDiscarded,
}

struct LoaderState {
    highest_applied: u64,
    visible: VisibleEntities,
}

/// Turns settled viewports into geohash-keyed fetches and reconciles the
/// visible entity set.
///
/// Every issued fetch carries a sequence number taken at issue time; a
/// response is applied only when its sequence is above the highest applied so
/// far, which enforces last-settled-wins under arbitrary network reordering.
/// In-flight fetches are never cancelled, only their results discarded.
pub struct SpatialViewportLoader {
    api: Arc<dyn RemoteApi>,
    precision: usize,
    anchor: FetchAnchor,
    issue_seq: AtomicU64,
    state: Mutex<LoaderState>,
}

impl SpatialViewportLoader {
    /// Create a loader fetching at the given geohash precision.
    pub fn new(api: Arc<dyn RemoteApi>, precision: usize, anchor: FetchAnchor) -> Self {
        Self {
            api,
            precision,
            anchor,
            issue_seq: AtomicU64::new(0),
            state: Mutex::new(LoaderState {
                highest_applied: 0,
                visible: VisibleEntities::default(),
            }),
        }
    }

    /// Handle one settled viewport: fetch its bucket and reconcile.
    ///
    /// On failure the previous visible set is retained and the error is a
    /// non-fatal [`MapError::FetchFailed`].
    pub async fn on_settled_viewport(&self, viewport: Viewport) -> Result<FetchOutcome> {
        let key = geohash::encode(viewport.center, self.precision)?;
        let seq = self.issue_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(geohash = %key, seq, "issuing nearby-entity fetch");

        let entities = match self.api.nearby_entities(&key).await {
            Ok(entities) => entities,
            Err(err) => {
                warn!(geohash = %key, seq, error = %err, "nearby-entity fetch failed, keeping previous set");
                return Err(MapError::FetchFailed(err.to_string()));
            }
        };

        self.apply(seq, viewport.center, entities)
    }

    fn apply(
        &self,
        seq: u64,
        center: Coordinate,
        entities: NearbyEntities,
    ) -> Result<FetchOutcome> {
        let mut state = self.state.lock();
        if seq <= state.highest_applied {
            debug!(
                seq,
                highest_applied = state.highest_applied,
                "stale nearby-entity response discarded"
            );
            return Ok(FetchOutcome::StaleDiscarded);
        }
        state.highest_applied = seq;
        state.visible = VisibleEntities {
            animals: entities.animals,
            curiosities: entities.curiosities,
        };
        self.anchor.set(center);
        info!(
            seq,
            animals = state.visible.animals.len(),
            curiosities = state.visible.curiosities.len(),
            "visible entity set replaced"
        );
        Ok(FetchOutcome::Applied)
    }

    /// Snapshot of the currently visible entities.
    pub fn snapshot(&self) -> VisibleEntities {
        self.state.lock().visible.clone()
    }

    /// Submit a new animal sighting after local coordinate validation.
    pub async fn upload_animal(&self, upload: AnimalUpload) -> Result<Animal> {
        Coordinate::new(upload.latitude, upload.longitude)?;
        self.api
            .upload_animal(&upload)
            .await
            .map_err(|err| MapError::UploadRejected(err.to_string()))
    }

    /// Submit a new historical curiosity after local coordinate validation.
    pub async fn upload_curiosity(&self, upload: CuriosityUpload) -> Result<HistoricalCuriosity> {
        Coordinate::new(upload.latitude, upload.longitude)?;
        self.api
            .upload_curiosity(&upload)
            .await
            .map_err(|err| MapError::UploadRejected(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolynx_api::MockRemoteApi;
    use geolynx_geo::GeoError;

    fn viewport(latitude: f64, longitude: f64) -> Viewport {
        Viewport::new(latitude, longitude, 0.01, 0.01).unwrap()
    }

    fn animal(id: &str) -> Animal {
        Animal {
            id: id.into(),
            name: id.into(),
            description: None,
            latitude: 38.7,
            longitude: -9.15,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn applies_fetch_and_records_anchor() {
        let mock = Arc::new(MockRemoteApi::new());
        let key = geohash::encode(Coordinate::new(38.75, -9.20).unwrap(), 5).unwrap();
        mock.set_nearby(
            key.as_str(),
            NearbyEntities {
                animals: vec![animal("AN-1")],
                curiosities: Vec::new(),
            },
        );
        let anchor = FetchAnchor::new();
        let loader = SpatialViewportLoader::new(mock.clone(), 5, anchor.clone());

        let outcome = loader
            .on_settled_viewport(viewport(38.75, -9.20))
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Applied);
        assert_eq!(loader.snapshot().animals.len(), 1);
        assert_eq!(anchor.get().unwrap().latitude, 38.75);
        assert_eq!(mock.nearby_keys(), vec![key.as_str().to_owned()]);
    }

    #[tokio::test]
    async fn failure_keeps_previous_set() {
        let mock = Arc::new(MockRemoteApi::new());
        let key = geohash::encode(Coordinate::new(38.75, -9.20).unwrap(), 5).unwrap();
        mock.set_nearby(
            key.as_str(),
            NearbyEntities {
                animals: vec![animal("AN-1")],
                curiosities: Vec::new(),
            },
        );
        let loader = SpatialViewportLoader::new(mock.clone(), 5, FetchAnchor::new());

        loader
            .on_settled_viewport(viewport(38.75, -9.20))
            .await
            .unwrap();
        mock.fail_next_nearby("socket reset");
        let err = loader
            .on_settled_viewport(viewport(40.0, -8.0))
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::FetchFailed(_)));
        assert_eq!(loader.snapshot().animals.len(), 1);
    }

    #[tokio::test]
    async fn upload_validates_coordinates_locally() {
        let mock = Arc::new(MockRemoteApi::new());
        let loader = SpatialViewportLoader::new(mock, 5, FetchAnchor::new());

        let err = loader
            .upload_animal(AnimalUpload {
                name: "lynx".into(),
                description: None,
                latitude: 120.0,
                longitude: 0.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::Geo(GeoError::InvalidCoordinate { .. })));
    }
}
