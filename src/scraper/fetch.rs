//! HTTP fetch helper shared by the strategies and the persistence pipeline.
//!
//! Plain GETs with the engine's identity header and timeout, enforcing a
//! success status. No retries and no backoff: a failed source simply waits
//! for the next scheduled pass.

use tracing::debug;
use url::Url;

use super::Scraper;
use crate::error::{Result, ScrapeError};

impl Scraper {
    /// GET `url` and return the body as text, requiring a success status.
    pub(crate) async fn fetch_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::Fetch {
                url: url.to_string(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        debug!(%url, "fetched page");

        resp.text().await.map_err(|e| ScrapeError::Fetch {
            url: url.to_string(),
            source: e,
        })
    }

    /// GET `url` and return the full body as bytes, requiring a success
    /// status.
    pub(crate) async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ScrapeError::Fetch {
                url: url.to_string(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = resp.bytes().await.map_err(|e| ScrapeError::Fetch {
            url: url.to_string(),
            source: e,
        })?;

        debug!(%url, bytes = body.len(), "fetched image body");
        Ok(body.to_vec())
    }
}
