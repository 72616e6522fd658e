//! API-lookup strategy: resolve a numeric camera ID to an image URL through
//! the WSDOT highway-camera capability.

use tracing::info;
use url::Url;

use super::{Scraper, SourcePoint};
use crate::error::{Result, ScrapeError};
use crate::wsdot::WsdotCameras;

impl Scraper {
    /// Resolve an api-mode source. The capability is a required argument;
    /// the dispatcher decides once per pass whether it is available.
    pub(crate) async fn api_lookup(
        &self,
        cameras: &WsdotCameras,
        point: &SourcePoint,
    ) -> Result<()> {
        let id: u32 = point
            .address
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| ScrapeError::Parse {
                input: point.address.clone(),
                reason: e.to_string(),
            })?;

        let camera = cameras.get_camera(id).await?;

        let url = Url::parse(&camera.image_url).map_err(|e| ScrapeError::Parse {
            input: camera.image_url.clone(),
            reason: e.to_string(),
        })?;

        info!(camera = id, url = %url, "resolved camera image");

        self.acquire(&url, &self.destination(point)).await
    }
}
