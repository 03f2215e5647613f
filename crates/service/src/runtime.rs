//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server crate can prepare the
//! store location through `service::runtime`.

use std::path::Path;

/// Ensure the directory holding the product document exists.
pub async fn ensure_store_dir(store_path: &Path) -> anyhow::Result<()> {
    common::env::ensure_parent_dir(store_path).await
}
