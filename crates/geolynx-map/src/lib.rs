//! ---
//! glx_section: "04-map-viewport"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Viewport-driven spatial entity loading."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
//! Viewport-driven spatial entity loading.
//!
//! A [`ViewportDebouncer`] coalesces raw viewport movement into settled
//! events; the [`SpatialViewportLoader`] turns each settled viewport into a
//! geohash-keyed fetch and reconciles the visible entity set under
//! last-settled-wins semantics. [`MapSession`] wires both together for one
//! map instance.

#![warn(missing_docs)]

pub mod debounce;
pub mod loader;
pub mod session;

use geolynx_geo::GeoError;

/// Shared result type for map loading operations.
pub type Result<T> = std::result::Result<T, MapError>;

/// Errors surfaced by the map loading layer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MapError {
    /// Invalid coordinate or geohash input.
    #[error(transparent)]
    Geo(#[from] GeoError),
    /// Nearby-entity fetch failed; the previous visible set is retained.
    /// Transient: re-panning or settling again retries.
    #[error("nearby-entity fetch failed: {0}")]
    FetchFailed(String),
    /// The backend rejected an entity upload.
    #[error("entity upload rejected: {0}")]
    UploadRejected(String),
}

pub use debounce::{FetchAnchor, ViewportDebouncer};
pub use loader::{FetchOutcome, SpatialViewportLoader, VisibleEntities};
pub use session::MapSession;
