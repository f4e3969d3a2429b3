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
use geolynx_common::ApiConfig;
use geolynx_geo::GeoIndexKey;
use geolynx_model::{
    Animal, AnimalUpload, CuriosityUpload, ExecutionSheet, HistoricalCuriosity, NearbyEntities,
    OperationKey,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::remote::RemoteApi;
use crate::{ApiError, Result};

/// Envelope around the my-assignments response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentsEnvelope {
    #[serde(default)]
    execution_sheets: Vec<ExecutionSheet>,
}

/// Backend error body shape.
#[derive(Debug, Deserialize)]
struct BackendMessage {
    message: Option<String>,
}

/// Production [`RemoteApi`] implementation over HTTP.
///
/// Session cookies are handled by the underlying client store, mirroring the
/// mobile transport; this crate never touches credentials itself.
#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteApi {
    /// Build a client from endpoint configuration.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let parsed = Url::parse(&config.base_url)
            .map_err(|err| ApiError::InvalidBaseUrl(format!("{}: {}", config.base_url, err)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!(path, "issuing GET");
        let response = self
            .client
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        decode_json(response).await
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!(path, "issuing POST");
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        decode_json(response).await
    }

    async fn post_command<B: serde::Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        debug!(path, "issuing POST");
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        expect_success(response).await.map(|_| ())
    }
}

/// Reject non-2xx responses, surfacing the backend `message` field when present.
async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<BackendMessage>(&body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| format!("http status {}", status));
    Err(ApiError::Backend(message))
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = expect_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn nearby_entities(&self, key: &GeoIndexKey) -> Result<NearbyEntities> {
        let geohash = key.as_str();
        let query = [("geohash", geohash)];
        let animals = self.get_json::<Vec<Animal>>("/animal/nearby", &query);
        let curiosities = self
            .get_json::<Vec<HistoricalCuriosity>>("/historical-curiosities/nearby", &query);
        let (animals, curiosities) = futures::try_join!(animals, curiosities)?;
        Ok(NearbyEntities {
            animals,
            curiosities,
        })
    }

    async fn my_assignments(&self) -> Result<Vec<ExecutionSheet>> {
        let envelope: AssignmentsEnvelope = self
            .get_json("/execution-sheet/my-assignments", &[])
            .await?;
        Ok(envelope.execution_sheets)
    }

    async fn start_activity(&self, key: &OperationKey) -> Result<()> {
        self.post_command("/execution-sheet/start-activity", key)
            .await
    }

    async fn stop_activity(&self, key: &OperationKey) -> Result<()> {
        self.post_command("/execution-sheet/stop-activity", key)
            .await
    }

    async fn upload_animal(&self, upload: &AnimalUpload) -> Result<Animal> {
        self.post_json("/animal/", upload).await
    }

    async fn upload_curiosity(&self, upload: &CuriosityUpload) -> Result<HistoricalCuriosity> {
        self.post_json("/historical-curiosities/", upload).await
    }
}
