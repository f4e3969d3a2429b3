//! ---
//! glx_section: "05-networking-external-interfaces"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Remote backend interface and transports."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
use async_trait::async_trait;
use geolynx_geo::GeoIndexKey;
use geolynx_model::{
    Animal, AnimalUpload, CuriosityUpload, ExecutionSheet, HistoricalCuriosity, NearbyEntities,
    OperationKey,
};

use crate::Result;

/// Remote operations consumed by the field core.
///
/// All calls suspend the issuing task; none of them block. Fetches are
/// idempotent reads, commands are retried only by explicit user action.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Fetch the entities inside one geohash bucket.
    async fn nearby_entities(&self, key: &GeoIndexKey) -> Result<NearbyEntities>;

    /// Fetch the execution sheets assigned to the current operator.
    async fn my_assignments(&self) -> Result<Vec<ExecutionSheet>>;

    /// Start activity on one operation. Assignment is implicit on first start.
    async fn start_activity(&self, key: &OperationKey) -> Result<()>;

    /// Stop activity on one operation. The backend decides whether the
    /// operation returns to assigned or becomes completed.
    async fn stop_activity(&self, key: &OperationKey) -> Result<()>;

    /// Submit a new animal sighting.
    async fn upload_animal(&self, upload: &AnimalUpload) -> Result<Animal>;

    /// Submit a new historical curiosity.
    async fn upload_curiosity(&self, upload: &CuriosityUpload) -> Result<HistoricalCuriosity>;
}
