//! ---
//! glx_section: "04-map-viewport"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Viewport-driven spatial entity loading."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use std::sync::Arc;

use geolynx_api::RemoteApi;
use geolynx_common::MapConfig;
use geolynx_geo::Viewport;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::debounce::{FetchAnchor, ViewportDebouncer};
use crate::loader::{SpatialViewportLoader, VisibleEntities};

/// Wiring for one map instance: debouncer feeding loader.
///
/// Owns the driver task that consumes settled viewports. Fetch failures are
/// logged by the loader and otherwise non-fatal; the map retries on the next
/// settled viewport.
pub struct MapSession {
    debouncer: ViewportDebouncer,
    loader: Arc<SpatialViewportLoader>,
    driver: JoinHandle<()>,
}

impl MapSession {
    /// Create a session against the given backend.
    pub fn new(config: &MapConfig, api: Arc<dyn RemoteApi>) -> Self {
        let anchor = FetchAnchor::new();
        let loader = Arc::new(SpatialViewportLoader::new(
            api,
            config.geohash_precision,
            anchor.clone(),
        ));
        let (debouncer, mut settled_rx) =
            ViewportDebouncer::new(config.quiet_window, config.jitter_epsilon_deg, anchor);

        let driver_loader = loader.clone();
        let driver = tokio::spawn(async move {
            while let Some(viewport) = settled_rx.recv().await {
                // Errors are already logged; the previous set stays visible.
                let _ = driver_loader.on_settled_viewport(viewport).await;
            }
            debug!("map session driver finished");
        });

        Self {
            debouncer,
            loader,
            driver,
        }
    }

    /// Feed a raw viewport change from the map surface.
    pub fn observe(&self, viewport: Viewport) {
        self.debouncer.observe(viewport);
    }

    /// Snapshot of the currently visible entities.
    pub fn visible(&self) -> VisibleEntities {
        self.loader.snapshot()
    }

    /// Direct access to the loader, for uploads.
    pub fn loader(&self) -> &Arc<SpatialViewportLoader> {
        &self.loader
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.debouncer.cancel();
        self.driver.abort();
    }
}
