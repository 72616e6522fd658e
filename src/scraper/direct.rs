//! Direct strategy: the configured address is the image URL itself.

use tracing::info;
use url::Url;

use super::{Scraper, SourcePoint};
use crate::error::{Result, ScrapeError};

impl Scraper {
    /// Resolve a direct-mode source: validate the address as a URL and hand
    /// it unchanged to the shared pipeline.
    pub(crate) async fn direct(&self, point: &SourcePoint) -> Result<()> {
        let url = Url::parse(&point.address).map_err(|e| ScrapeError::Parse {
            input: point.address.clone(),
            reason: e.to_string(),
        })?;

        info!(address = %point.address, url = %url, "using address as webcam image");

        self.acquire(&url, &self.destination(point)).await
    }
}
