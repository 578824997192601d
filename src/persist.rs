//! Saving raw responses to disk.
//!
//! Files land at `{base}/{identity}/{endpoint}/{expiry}.xml`, where `expiry`
//! is the response's `cachedUntil` (or the current time) in epoch seconds.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build the save path for one response. An empty `identity` is skipped.
pub fn save_filename(
    base: &Path,
    identity: &str,
    endpoint: &str,
    cached_until: Option<DateTime<Utc>>,
) -> PathBuf {
    let mut path = base.to_path_buf();
    if !identity.is_empty() {
        path.push(identity);
    }
    path.push(endpoint);
    let stamp = cached_until.unwrap_or_else(Utc::now).timestamp();
    path.push(format!("{}.xml", stamp));
    path
}

/// Write `raw` to `path`, creating parent directories first
pub async fn save_xml(path: &Path, raw: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, raw).await?;
    debug!("Saved raw XML to {}", path.display());
    Ok(())
}
