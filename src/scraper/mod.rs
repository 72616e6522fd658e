//! The acquisition engine: per-source data model, the three collection
//! strategies, and the sequential dispatch loop.
//!
//! Each configured source resolves to exactly one image URL per pass and is
//! then handed to the shared pipeline tail (fetch, normalize, persist).
//! Failures are isolated per source; one bad webcam never stops the rest of
//! the pass.

mod api;
mod direct;
mod fetch;
mod persist;
mod scrape;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::error::{Result, ScrapeError};
use crate::wsdot::WsdotCameras;

/// Timeout for every HTTP fetch, page and image alike.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Markup or API dialect of a monitored source. Determines the extraction
/// rule within a collection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    WeatherBug,
    Wsdot,
    Direct,
    SunMountainLodge,
}

impl PageKind {
    /// Lower-case token, as used in source keys and output paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::WeatherBug => "weatherbug",
            PageKind::Wsdot => "wsdot",
            PageKind::Direct => "direct",
            PageKind::SunMountainLodge => "sunmountainlodge",
        }
    }

    /// Parse a source-key token, case-insensitively.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "weatherbug" => Some(PageKind::WeatherBug),
            "wsdot" => Some(PageKind::Wsdot),
            "direct" => Some(PageKind::Direct),
            "sunmountainlodge" => Some(PageKind::SunMountainLodge),
            _ => None,
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy family used to resolve a source to an image URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionMode {
    Scrape,
    Api,
    Direct,
}

impl CollectionMode {
    /// Lower-case token, as used in source keys and output paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionMode::Scrape => "scrape",
            CollectionMode::Api => "api",
            CollectionMode::Direct => "direct",
        }
    }

    /// Parse a source-key token, case-insensitively.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "scrape" => Some(CollectionMode::Scrape),
            "api" => Some(CollectionMode::Api),
            "direct" => Some(CollectionMode::Direct),
            _ => None,
        }
    }
}

impl fmt::Display for CollectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One monitored camera or image feed.
///
/// Constructed once at startup and immutable afterwards. Construction rejects
/// page/mode pairings no strategy can serve, so the dispatcher never has to
/// re-check the combination on every pass.
#[derive(Debug, Clone)]
pub struct SourcePoint {
    pub address: String,
    pub page: PageKind,
    pub mode: CollectionMode,
    relative_path: PathBuf,
}

impl SourcePoint {
    /// Build a source point, validating the page/mode pairing up front.
    ///
    /// The destination is derived as `pagetype/mode/filename.png`, all
    /// lower-cased, which keeps paths collision-free across distinct sources.
    pub fn new(
        address: impl Into<String>,
        page: PageKind,
        mode: CollectionMode,
        filename: &str,
    ) -> Result<Self> {
        let legal = matches!(
            (page, mode),
            (PageKind::WeatherBug, CollectionMode::Scrape)
                | (PageKind::SunMountainLodge, CollectionMode::Scrape)
                | (PageKind::Wsdot, CollectionMode::Api)
                | (PageKind::Direct, CollectionMode::Direct)
        );
        if !legal {
            return Err(ScrapeError::Config(format!(
                "page type {page} cannot be collected in {mode} mode"
            )));
        }

        let relative_path = PathBuf::from(page.as_str())
            .join(mode.as_str())
            .join(format!("{}.png", filename.to_lowercase()));

        Ok(Self {
            address: address.into(),
            page,
            mode,
            relative_path,
        })
    }

    /// Destination file under the configured output base directory.
    pub fn destination(&self, base: &Path) -> PathBuf {
        base.join(&self.relative_path)
    }
}

/// Immutable run configuration, owned by the engine.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Identity header sent on every request.
    pub user_agent: String,
    /// Ordered list of sources; processed in this order every pass.
    pub sources: Vec<SourcePoint>,
    /// Base directory the destination paths are rooted at.
    pub output_dir: PathBuf,
}

/// The acquisition engine.
///
/// Holds the run configuration, a shared HTTP client with a fixed timeout,
/// and the optional WSDOT capability. The connection pool is reused across
/// all fetches and passes.
pub struct Scraper {
    config: ScraperConfig,
    client: reqwest::Client,
    cameras: Option<WsdotCameras>,
    pass_guard: Mutex<()>,
}

impl Scraper {
    /// Create the engine. `cameras` is `None` when no WSDOT API key was
    /// configured; API-mode sources are then skipped every pass.
    pub fn new(config: ScraperConfig, cameras: Option<WsdotCameras>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap_or_default();

        Self {
            config,
            client,
            cameras,
            pass_guard: Mutex::new(()),
        }
    }

    /// One complete pass over the configured sources, strictly sequential.
    ///
    /// Per-source failures are logged and the loop continues; nothing is
    /// aggregated and no cursor is kept between passes. If a previous pass is
    /// still executing when the scheduler fires again, this pass is skipped
    /// instead of racing the in-flight one on identical destination paths.
    pub async fn run_pass(&self) {
        let _guard = match self.pass_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("previous pass still running, skipping this one");
                return;
            }
        };

        let mut missing_capability_reported = false;

        for point in &self.config.sources {
            let outcome = match point.mode {
                CollectionMode::Scrape => self.scrape(point).await,
                CollectionMode::Direct => self.direct(point).await,
                CollectionMode::Api => match &self.cameras {
                    Some(cameras) => self.api_lookup(cameras, point).await,
                    None => {
                        if !missing_capability_reported {
                            error!(
                                "no WSDOT API key configured, skipping api-mode sources this pass"
                            );
                            missing_capability_reported = true;
                        }
                        continue;
                    }
                },
            };

            if let Err(e) = outcome {
                error!(address = %point.address, error = %e, "source failed");
            }
        }
    }

    fn destination(&self, point: &SourcePoint) -> PathBuf {
        point.destination(&self.config.output_dir)
    }
}
