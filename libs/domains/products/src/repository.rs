use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{NewProduct, Product};

/// Async persistence contract the view service is written against.
///
/// `find_all` returns products in the store's natural iteration order, which
/// for the bundled stores is insertion order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all(&self) -> ProductResult<Vec<Product>>;

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Persist a new product and return it with its assigned id.
    async fn save(&self, product: NewProduct) -> ProductResult<Product>;

    /// Returns whether a product was removed.
    async fn delete_by_id(&self, id: Uuid) -> ProductResult<bool>;

    async fn count(&self) -> ProductResult<u64>;
}

/// Blocking flavour of [`ProductRepository`].
///
/// Implementations may block the calling thread. Wrap one in
/// [`BlockingProductRepository`](crate::blocking::BlockingProductRepository)
/// to use it from async code.
pub trait ProductStore: Send + Sync + 'static {
    fn find_all(&self) -> ProductResult<Vec<Product>>;

    fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    fn save(&self, product: NewProduct) -> ProductResult<Product>;

    fn delete_by_id(&self, id: Uuid) -> ProductResult<bool>;

    fn count(&self) -> ProductResult<u64>;
}
