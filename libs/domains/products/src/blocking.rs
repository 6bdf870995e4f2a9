//! Async adapter over a blocking [`ProductStore`].

use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product};
use crate::repository::{ProductRepository, ProductStore};

/// Runs every store call on tokio's blocking pool so a synchronous store
/// never stalls the async workers.
pub struct BlockingProductRepository<S: ProductStore> {
    store: Arc<S>,
}

impl<S: ProductStore> BlockingProductRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> ProductResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> ProductResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| {
                error!(op, "Blocking store task failed: {}", e);
                ProductError::Internal(format!("{op} did not complete: {e}"))
            })?
    }
}

impl<S: ProductStore> Clone for BlockingProductRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

#[async_trait]
impl<S: ProductStore> ProductRepository for BlockingProductRepository<S> {
    async fn find_all(&self) -> ProductResult<Vec<Product>> {
        self.run("find_all", |store| store.find_all()).await
    }

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        self.run("find_by_id", move |store| store.find_by_id(id)).await
    }

    async fn save(&self, product: NewProduct) -> ProductResult<Product> {
        self.run("save", move |store| store.save(product)).await
    }

    async fn delete_by_id(&self, id: Uuid) -> ProductResult<bool> {
        self.run("delete_by_id", move |store| store.delete_by_id(id)).await
    }

    async fn count(&self) -> ProductResult<u64> {
        self.run("count", |store| store.count()).await
    }
}
