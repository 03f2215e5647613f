use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};
use tokio::fs;

use crate::errors::ServiceError;

/// Generic JSON file-backed document.
///
/// The whole document is read on every `load` and rewritten in full on every
/// `save`; nothing is cached between calls, so the file stays the only
/// source of truth.
pub struct JsonDocumentStore<D> {
    file_path: PathBuf,
    _doc: PhantomData<fn() -> D>,
}

impl<D> JsonDocumentStore<D>
where
    D: serde::Serialize + serde::de::DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), _doc: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read and parse the document. `Ok(None)` when the file does not exist.
    pub async fn load(&self) -> Result<Option<D>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ServiceError::Store(format!("read {}: {e}", self.file_path.display())))
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ServiceError::Serialization(format!("parse {}: {e}", self.file_path.display())))
    }

    /// Pretty-print (two-space indent) and overwrite the file.
    pub async fn save(&self, doc: &D) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Store(format!("create {}: {e}", parent.display())))?;
        }
        let data = serde_json::to_vec_pretty(doc).map_err(|e| ServiceError::Serialization(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Store(format!("write {}: {e}", self.file_path.display())))?;
        Ok(())
    }
}
