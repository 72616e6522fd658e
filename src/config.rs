//! Environment configuration.
//!
//! All settings come from the environment, matching the container-first
//! deployment of the service. Source entries that cannot be understood are
//! logged and dropped; only a missing or unparseable `SOURCES` value is fatal
//! at startup.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{Result, ScrapeError};
use crate::scraper::{CollectionMode, PageKind, SourcePoint};

/// Default output directory for normalized images.
const DEFAULT_OUTPUT_DIR: &str = "/data";
/// Default schedule: on the hour and the half hour.
const DEFAULT_CRON_SCHEDULE: &str = "0 0,30 * * * *";
/// Default identity header.
const DEFAULT_USER_AGENT: &str = concat!("webcam-scraper/", env!("CARGO_PKG_VERSION"));

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Six-field cron expression driving the pass schedule.
    pub cron_schedule: String,
    /// Base directory the per-source destination paths are rooted at.
    pub output_dir: PathBuf,
    /// Identity header sent on every request.
    pub user_agent: String,
    /// Optional WSDOT access code; absence disables the API-lookup strategy.
    pub wsdot_api_key: Option<String>,
    /// Validated source list, in key order.
    pub sources: Vec<SourcePoint>,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `SOURCES` must be a JSON object mapping `filename-pagetype-mode` keys
    /// (hyphen-delimited, case-insensitive) to source addresses.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var("SOURCES")
            .map_err(|_| ScrapeError::Config("SOURCES is not set".to_string()))?;
        let sources = parse_sources(&raw)?;

        Ok(Self {
            cron_schedule: env_or("CRON_SCHEDULE", DEFAULT_CRON_SCHEDULE),
            output_dir: PathBuf::from(env_or("OUTPUT_IMAGE_DIR", DEFAULT_OUTPUT_DIR)),
            user_agent: env_or("USER_AGENT", DEFAULT_USER_AGENT),
            wsdot_api_key: std::env::var("WSDOT_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            sources,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse the `SOURCES` JSON map into validated source points.
///
/// Entries with malformed keys, unrecognized tokens, or illegal page/mode
/// pairings are logged and dropped. A `SOURCES` value that is not a JSON
/// object of strings is an error.
pub fn parse_sources(raw: &str) -> Result<Vec<SourcePoint>> {
    let entries: BTreeMap<String, String> = serde_json::from_str(raw)
        .map_err(|e| ScrapeError::Config(format!("SOURCES is not a JSON object of strings: {e}")))?;

    let mut sources = Vec::with_capacity(entries.len());
    for (key, address) in entries {
        match parse_source(&key, address) {
            Ok(point) => sources.push(point),
            Err(e) => warn!(key = %key, error = %e, "dropping source entry"),
        }
    }

    Ok(sources)
}

fn parse_source(key: &str, address: String) -> Result<SourcePoint> {
    let parts: Vec<&str> = key.split('-').collect();
    let [filename, page, mode] = parts.as_slice() else {
        return Err(ScrapeError::Config(format!(
            "source key {key:?} is not filename-pagetype-mode"
        )));
    };

    let page = PageKind::parse(page)
        .ok_or_else(|| ScrapeError::Config(format!("unknown page type {page:?}")))?;
    let mode = CollectionMode::parse(mode)
        .ok_or_else(|| ScrapeError::Config(format!("unknown collection mode {mode:?}")))?;

    SourcePoint::new(address, page, mode, filename)
}
