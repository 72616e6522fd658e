//! Periodic acquisition of webcam stills into canonical PNG files.
//!
//! Each configured source is resolved to an image URL by one of three
//! strategies (page-scrape, WSDOT API lookup, direct fetch), downloaded,
//! normalized to PNG, and written to a deterministic path under the output
//! directory. The modules are public so integration tests can reach them.

pub mod config;
pub mod error;
pub mod normalize;
pub mod runner;
pub mod scraper;
pub mod wsdot;

pub use config::Config;
pub use error::{Result, ScrapeError};
pub use scraper::{CollectionMode, PageKind, Scraper, ScraperConfig, SourcePoint};
