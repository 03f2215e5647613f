use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::errors::ServiceError;
use crate::product::model::{Product, RequestedId, ID_FIELD};
use crate::product::repository::ProductRepository;

/// List/create/update/delete over the persisted product collection.
///
/// Every operation reloads the full collection and every mutation writes the
/// full collection back. The read-modify-write cycle runs under `cycle` so
/// requests in this process queue instead of overwriting each other.
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    cycle: Mutex<()>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo, cycle: Mutex::new(()) }
    }

    /// The stored collection, verbatim.
    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        let _guard = self.cycle.lock().await;
        self.repo.load().await
    }

    /// Append a new product with `id = collection length + 1`.
    ///
    /// Ids are not `max + 1`: after a delete the assigned id can repeat an
    /// existing one. That is kept as is and logged.
    pub async fn create(&self, fields: Map<String, Value>) -> Result<Product, ServiceError> {
        let _guard = self.cycle.lock().await;
        let mut products = self.repo.load().await?;

        let id = products.len() as i64 + 1;
        if products.iter().any(|p| p.has_id(id)) {
            warn!(id, "assigned product id duplicates an existing record");
        }

        let mut product = Product::new(fields);
        product.set_id(id);
        products.push(product.clone());
        self.repo.save(products).await?;

        info!(id, "product created");
        Ok(product)
    }

    /// Shallow-merge `patch` onto the first product matching `id`.
    ///
    /// Nothing is written when no product matches. A `patch` carrying `id`
    /// replaces the stored id.
    pub async fn update(&self, id: &RequestedId, patch: Map<String, Value>) -> Result<(), ServiceError> {
        let _guard = self.cycle.lock().await;
        let mut products = self.repo.load().await?;

        let Some(existing) = products.iter_mut().find(|p| id.matches(p)) else {
            debug!(%id, "update target not found");
            return Err(ServiceError::not_found(&format!("Product with ID {id}")));
        };
        if let Some(new_id) = patch.get(ID_FIELD) {
            warn!(%id, %new_id, "update body overwrites product id");
        }
        existing.merge(patch);
        self.repo.save(products).await?;

        info!(%id, "product updated");
        Ok(())
    }

    /// Drop every product matching `id` and write the rest back, even when
    /// nothing matched. Returns how many were removed.
    pub async fn delete(&self, id: &RequestedId) -> Result<usize, ServiceError> {
        let _guard = self.cycle.lock().await;
        let mut products = self.repo.load().await?;

        let before = products.len();
        products.retain(|p| !id.matches(p));
        let removed = before - products.len();
        self.repo.save(products).await?;

        info!(%id, removed, "product delete processed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;

    /// In-memory collection that counts writes.
    #[derive(Default)]
    struct MemoryRepo {
        products: StdMutex<Vec<Product>>,
        saves: StdMutex<usize>,
    }

    impl MemoryRepo {
        fn with(v: Value) -> Arc<Self> {
            Arc::new(Self { products: StdMutex::new(serde_json::from_value(v).unwrap()), saves: StdMutex::new(0) })
        }
        fn snapshot(&self) -> Value {
            serde_json::to_value(&*self.products.lock().unwrap()).unwrap()
        }
        fn saves(&self) -> usize {
            *self.saves.lock().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl ProductRepository for MemoryRepo {
        async fn load(&self) -> Result<Vec<Product>, ServiceError> {
            let products = self.products.lock().unwrap().clone();
            // give other tasks a chance to interleave between load and save
            tokio::task::yield_now().await;
            Ok(products)
        }
        async fn save(&self, products: Vec<Product>) -> Result<(), ServiceError> {
            *self.products.lock().unwrap() = products;
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn create_assigns_length_plus_one_and_overrides_body_id() -> Result<(), anyhow::Error> {
        let repo = MemoryRepo::with(json!([{"id": 1, "name": "A"}]));
        let svc = ProductService::new(repo.clone());

        let created = svc.create(obj(json!({"id": 77, "name": "B"}))).await?;
        assert_eq!(serde_json::to_value(&created)?, json!({"id": 2, "name": "B"}));
        assert_eq!(repo.snapshot(), json!([{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]));

        let listed = svc.list().await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1], created);
        Ok(())
    }

    #[tokio::test]
    async fn create_after_delete_can_repeat_an_id() -> Result<(), anyhow::Error> {
        let repo = MemoryRepo::with(json!([{"id": 1}, {"id": 2}]));
        let svc = ProductService::new(repo.clone());

        svc.delete(&RequestedId::from(1)).await?;
        let created = svc.create(obj(json!({"name": "C"}))).await?;
        assert!(created.has_id(2));
        assert_eq!(repo.snapshot(), json!([{"id": 2}, {"name": "C", "id": 2}]));
        Ok(())
    }

    #[tokio::test]
    async fn update_merges_shallowly() -> Result<(), anyhow::Error> {
        let repo = MemoryRepo::with(json!([{"id": 1, "name": "A", "price": 10}]));
        let svc = ProductService::new(repo.clone());

        svc.update(&RequestedId::from(1), obj(json!({"price": 20}))).await?;
        assert_eq!(repo.snapshot(), json!([{"id": 1, "name": "A", "price": 20}]));
        Ok(())
    }

    #[tokio::test]
    async fn update_touches_only_the_first_match() -> Result<(), anyhow::Error> {
        let repo = MemoryRepo::with(json!([{"id": 2, "n": "first"}, {"id": 2, "n": "second"}]));
        let svc = ProductService::new(repo.clone());

        svc.update(&RequestedId::from(2), obj(json!({"n": "changed"}))).await?;
        assert_eq!(repo.snapshot(), json!([{"id": 2, "n": "changed"}, {"id": 2, "n": "second"}]));
        Ok(())
    }

    #[tokio::test]
    async fn update_body_may_replace_id() -> Result<(), anyhow::Error> {
        let repo = MemoryRepo::with(json!([{"id": 1, "name": "A"}]));
        let svc = ProductService::new(repo.clone());

        svc.update(&RequestedId::from(1), obj(json!({"id": 5}))).await?;
        assert_eq!(repo.snapshot(), json!([{"id": 5, "name": "A"}]));
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_is_not_found_and_skips_write() {
        let repo = MemoryRepo::with(json!([{"id": 1}]));
        let svc = ProductService::new(repo.clone());

        let err = svc.update(&RequestedId::from(999), obj(json!({"x": 1}))).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.to_string(), "Product with ID 999 not found");
        assert_eq!(repo.saves(), 0);

        let err = svc.update(&RequestedId::parse("abc"), obj(json!({}))).await.unwrap_err();
        assert_eq!(err.to_string(), "Product with ID NaN not found");
        assert_eq!(repo.snapshot(), json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn trailing_garbage_in_id_still_targets_the_leading_number() -> Result<(), anyhow::Error> {
        let repo = MemoryRepo::with(json!([{"id": 1, "name": "A"}, {"id": 12, "name": "B"}]));
        let svc = ProductService::new(repo.clone());

        svc.update(&RequestedId::parse("12abc"), obj(json!({"name": "B2"}))).await?;
        svc.update(&RequestedId::parse("1.5"), obj(json!({"name": "A2"}))).await?;
        assert_eq!(repo.snapshot(), json!([{"id": 1, "name": "A2"}, {"id": 12, "name": "B2"}]));

        assert_eq!(svc.delete(&RequestedId::parse("12abc")).await?, 1);
        assert_eq!(repo.snapshot(), json!([{"id": 1, "name": "A2"}]));
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_all_matches_and_always_writes() -> Result<(), anyhow::Error> {
        let repo = MemoryRepo::with(json!([{"id": 3}, {"id": 4}, {"id": 3}]));
        let svc = ProductService::new(repo.clone());

        assert_eq!(svc.delete(&RequestedId::from(3)).await?, 2);
        assert_eq!(repo.snapshot(), json!([{"id": 4}]));
        assert_eq!(repo.saves(), 1);

        assert_eq!(svc.delete(&RequestedId::from(42)).await?, 0);
        assert_eq!(repo.snapshot(), json!([{"id": 4}]));
        assert_eq!(repo.saves(), 2);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_do_not_lose_records() -> Result<(), anyhow::Error> {
        let repo = MemoryRepo::with(json!([]));
        let svc = Arc::new(ProductService::new(repo.clone()));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.create(obj(json!({"n": i}))).await })
            })
            .collect();
        for t in tasks {
            t.await??;
        }

        let mut ids: Vec<i64> = svc
            .list()
            .await?
            .iter()
            .filter_map(|p| p.id().and_then(Value::as_i64))
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<_>>());
        Ok(())
    }
}
