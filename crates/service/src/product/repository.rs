use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::product::model::Product;

/// Whole-collection persistence for products.
/// Implementations can be file-backed or in-memory; there is no partial write.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn load(&self) -> Result<Vec<Product>, ServiceError>;
    async fn save(&self, products: Vec<Product>) -> Result<(), ServiceError>;
}
