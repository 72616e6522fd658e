//! Shared pipeline tail of all three strategies: fetch the image bytes,
//! normalize to PNG, and write them to the destination path.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use url::Url;

use super::Scraper;
use crate::error::{Result, ScrapeError};
use crate::normalize;

impl Scraper {
    /// Download the image at `url`, normalize it, and materialize it at
    /// `destination`. Any step's failure abandons this source; nothing is
    /// written unless normalization succeeded.
    pub(crate) async fn acquire(&self, url: &Url, destination: &Path) -> Result<()> {
        let raw = self.fetch_bytes(url).await?;
        let png = normalize::to_png(raw)?;

        write_image(destination, &png)?;

        info!(url = %url, path = %destination.display(), "downloaded and saved image");
        Ok(())
    }
}

/// Write `data` to `path`, creating parent directories as needed.
///
/// The bytes go to a temp file in the destination directory first and are
/// renamed into place, so a crash mid-write never leaves a truncated image at
/// the published path.
fn write_image(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| persistence(path, e))?;
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, data).map_err(|e| persistence(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| persistence(path, e))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn persistence(path: &Path, source: std::io::Error) -> ScrapeError {
    ScrapeError::Persistence {
        path: path.to_path_buf(),
        source,
    }
}
