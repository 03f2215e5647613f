//! Environment/runtime helpers
//!
//! Sanity checks to ensure the directory holding the product document exists at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the parent directory of `file` exists; warn when the file itself is absent.
///
/// A missing file is not an error: the store starts empty and the first
/// mutation creates it.
pub async fn ensure_parent_dir(file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
        debug!(dir = %parent.display(), "data directory ready");
    }
    if tokio::fs::metadata(file).await.is_err() {
        warn!(file = %file.display(), "product document not found; collection starts empty");
    }
    Ok(())
}
