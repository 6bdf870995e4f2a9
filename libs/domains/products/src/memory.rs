//! In-process product stores.
//!
//! [`InMemoryProductRepository`] is natively async. [`InMemoryProductStore`]
//! is the blocking counterpart, meant to sit behind
//! [`BlockingProductRepository`](crate::blocking::BlockingProductRepository).
//! Both keep insertion order and assign UUIDv7 ids.

use async_trait::async_trait;
use std::sync::{Arc, RwLock as StdRwLock};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product};
use crate::repository::{ProductRepository, ProductStore};

/// Async in-memory repository. Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `products`, ids kept as given.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: Arc::new(RwLock::new(products.into_iter().collect())),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn save(&self, product: NewProduct) -> ProductResult<Product> {
        let product = product.into_product(Uuid::now_v7());
        self.products.write().await.push(product.clone());
        info!(product_id = %product.id, "Saved product");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        let removed = products.len() != before;
        debug!(product_id = %id, removed, "Delete by id");
        Ok(removed)
    }

    async fn count(&self) -> ProductResult<u64> {
        Ok(self.products.read().await.len() as u64)
    }
}

/// Blocking in-memory store guarded by a `std::sync::RwLock`.
///
/// A poisoned lock surfaces as [`ProductError::Repository`].
#[derive(Default)]
pub struct InMemoryProductStore {
    products: StdRwLock<Vec<Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: StdRwLock::new(products.into_iter().collect()),
        }
    }

    fn read(&self) -> ProductResult<std::sync::RwLockReadGuard<'_, Vec<Product>>> {
        self.products.read().map_err(|_| poisoned())
    }

    fn write(&self) -> ProductResult<std::sync::RwLockWriteGuard<'_, Vec<Product>>> {
        self.products.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> ProductError {
    ProductError::Repository("product store lock poisoned".to_string())
}

impl ProductStore for InMemoryProductStore {
    fn find_all(&self) -> ProductResult<Vec<Product>> {
        Ok(self.read()?.clone())
    }

    fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.read()?.iter().find(|p| p.id == id).cloned())
    }

    fn save(&self, product: NewProduct) -> ProductResult<Product> {
        let product = product.into_product(Uuid::now_v7());
        self.write()?.push(product.clone());
        info!(product_id = %product.id, "Saved product");
        Ok(product)
    }

    fn delete_by_id(&self, id: Uuid) -> ProductResult<bool> {
        let mut products = self.write()?;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }

    fn count(&self) -> ProductResult<u64> {
        Ok(self.read()?.len() as u64)
    }
}
