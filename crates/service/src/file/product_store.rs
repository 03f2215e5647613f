use std::{path::Path, sync::Arc};

use configs::{StoreConfig, StoreFailurePolicy};
use tracing::{error, warn};

use crate::errors::ServiceError;
use crate::product::model::{Product, ProductDocument};
use crate::product::repository::ProductRepository;
use crate::storage::json_document_store::JsonDocumentStore;

/// File-backed product collection persisted as `{ "products": [...] }`.
///
/// Failures are handled according to [`StoreFailurePolicy`]: `Swallow` logs
/// them and degrades (empty reads, dropped writes), `Surface` returns them.
/// A missing document is an empty collection under either policy.
pub struct FileProductStore {
    document: JsonDocumentStore<ProductDocument>,
    policy: StoreFailurePolicy,
}

impl FileProductStore {
    pub fn new<P: Into<std::path::PathBuf>>(path: P, policy: StoreFailurePolicy) -> Arc<Self> {
        Arc::new(Self { document: JsonDocumentStore::new(path), policy })
    }

    pub fn from_config(cfg: &StoreConfig) -> Arc<Self> {
        Self::new(cfg.path.clone(), cfg.failure_policy)
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    pub async fn read_products(&self) -> Result<Vec<Product>, ServiceError> {
        match self.document.load().await {
            Ok(Some(doc)) => Ok(doc.products),
            Ok(None) => {
                warn!(path = %self.path().display(), "product document missing; reading empty collection");
                Ok(Vec::new())
            }
            Err(err) => match self.policy {
                StoreFailurePolicy::Swallow => {
                    error!(path = %self.path().display(), error = %err, "error reading product document");
                    Ok(Vec::new())
                }
                StoreFailurePolicy::Surface => Err(err),
            },
        }
    }

    pub async fn write_products(&self, products: Vec<Product>) -> Result<(), ServiceError> {
        let count = products.len();
        match self.document.save(&ProductDocument { products }).await {
            Ok(()) => Ok(()),
            Err(err) => match self.policy {
                StoreFailurePolicy::Swallow => {
                    error!(path = %self.path().display(), count, error = %err, "error writing product document");
                    Ok(())
                }
                StoreFailurePolicy::Surface => Err(err),
            },
        }
    }
}

#[async_trait::async_trait]
impl ProductRepository for FileProductStore {
    async fn load(&self) -> Result<Vec<Product>, ServiceError> { self.read_products().await }
    async fn save(&self, products: Vec<Product>) -> Result<(), ServiceError> { self.write_products(products).await }
}
