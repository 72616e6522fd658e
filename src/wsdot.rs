//! Minimal client for the WSDOT Highway Cameras REST API.
//!
//! Only the single-camera lookup is implemented: the scraper resolves a
//! numeric camera ID to the URL of its current still image. The client exists
//! only when an API key was configured; strategies that need it take it as an
//! explicit dependency instead of null-checking on every call.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ScrapeError};

const DEFAULT_BASE_URL: &str =
    "https://wsdot.wa.gov/Traffic/api/HighwayCameras/HighwayCamerasREST.svc";

/// Request timeout for camera metadata lookups.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// A camera record as returned by `GetCameraAsJson`.
///
/// The API exposes many more fields; only the ones the scraper reads are
/// deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct Camera {
    #[serde(rename = "CameraID")]
    pub camera_id: u32,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "ImageURL")]
    pub image_url: String,
}

/// Client for WSDOT highway camera metadata.
#[derive(Debug, Clone)]
pub struct WsdotCameras {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WsdotCameras {
    /// Create a client against the production WSDOT endpoint.
    pub fn new(api_key: impl Into<String>, user_agent: &str) -> Self {
        Self::with_base_url(api_key, user_agent, DEFAULT_BASE_URL)
    }

    /// Create a client against a different endpoint (used by tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        user_agent: &str,
        base_url: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Resolve a camera ID to its metadata, including the current image URL.
    pub async fn get_camera(&self, id: u32) -> Result<Camera> {
        // The access code stays out of error messages.
        let endpoint = format!("{}/GetCameraAsJson", self.base_url);
        let url = format!("{endpoint}?AccessCode={}&CameraID={id}", self.api_key);

        let resp = self.client.get(&url).send().await.map_err(|e| ScrapeError::Fetch {
            url: endpoint.clone(),
            source: e,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: endpoint,
                status,
            });
        }

        // The API answers `null` for IDs it does not know.
        let camera: Option<Camera> = resp.json().await.map_err(|e| ScrapeError::Fetch {
            url: endpoint.clone(),
            source: e,
        })?;

        let camera = camera.ok_or_else(|| ScrapeError::Parse {
            input: id.to_string(),
            reason: "no camera with this ID".to_string(),
        })?;

        debug!(camera = camera.camera_id, url = %camera.image_url, "resolved camera");
        Ok(camera)
    }
}
