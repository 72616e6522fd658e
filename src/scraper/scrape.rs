//! Page-scrape strategy: fetch an HTML document and find the embedded webcam
//! image by a page-kind-specific substring rule.
//!
//! The rules are substring predicates rather than CSS paths into the markup.
//! Each source's page is stable and known in advance, and a hostname or
//! filename fragment survives markup churn that would break a positional
//! selector.

use scraper::{Html, Selector};
use tracing::info;
use url::Url;

use super::{PageKind, Scraper, SourcePoint};
use crate::error::{Result, ScrapeError};

/// Substring an `img` src must contain for WeatherBug camera pages.
const WEATHERBUG_NEEDLE: &str = "cameras-cam.cdn.weatherbug.net";
/// Substring an `img` src must contain for the Sun Mountain Lodge page.
const SUN_MOUNTAIN_LODGE_NEEDLE: &str = "smlcam.jpg";

impl Scraper {
    /// Resolve a scrape-mode source: pull the page at `address`, extract the
    /// matching image URL, and hand it to the shared pipeline.
    pub(crate) async fn scrape(&self, point: &SourcePoint) -> Result<()> {
        let needle = match point.page {
            PageKind::WeatherBug => WEATHERBUG_NEEDLE,
            PageKind::SunMountainLodge => SUN_MOUNTAIN_LODGE_NEEDLE,
            // Construction rejects these pairings.
            PageKind::Wsdot | PageKind::Direct => {
                return Err(ScrapeError::Config(format!(
                    "page type {} has no scrape rule",
                    point.page
                )));
            }
        };

        let body = self.fetch_text(&point.address).await?;

        let src = extract_image_src(&body, needle).ok_or_else(|| ScrapeError::Extraction {
            address: point.address.clone(),
        })?;

        let url = Url::parse(&src).map_err(|e| ScrapeError::Parse {
            input: src.clone(),
            reason: e.to_string(),
        })?;

        info!(address = %point.address, url = %url, "found webcam image");

        self.acquire(&url, &self.destination(point)).await
    }
}

/// Scan all `img` elements and return the src of the first one containing
/// `needle`.
fn extract_image_src(html: &str, needle: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let images = Selector::parse("img").ok()?;

    document
        .select(&images)
        .filter_map(|el| el.value().attr("src"))
        .find(|src| src.contains(needle))
        .map(str::to_owned)
}
