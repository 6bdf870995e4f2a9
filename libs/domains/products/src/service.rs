//! Product view service.
//!
//! Reads go to the repository and are reshaped on the way out (defaults,
//! sorting, grouping, filtering, limits). Adds also feed three process-local
//! views: a bounded recency queue, a price-sorted index and a modification
//! history. Those views are advisory: they are never reconciled with the
//! repository, deletes do not touch them and they vanish with the process.
//!
//! Each view sits behind its own mutex and no code path holds two of them at
//! once.

use futures::Stream;
use std::cmp::Ordering;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    default_products, MinMax, PriceGroups, Product, ProductDto, CHEAP_PRICE_THRESHOLD,
    LAST_PRODUCTS_COUNT,
};
use crate::repository::ProductRepository;

/// Tunables for [`ProductService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// How many recently added products the recency queue keeps.
    pub recent_capacity: usize,
    /// Pause between default products on the streamed listing.
    pub default_emit_delay: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            recent_capacity: 5,
            default_emit_delay: Duration::from_secs(1),
        }
    }
}

/// Sorted-index entry: ascending price, ties by id (creation order for v7 ids).
#[derive(Debug, Clone)]
struct ByPrice(Product);

impl Ord for ByPrice {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .price
            .total_cmp(&other.0.price)
            .then_with(|| self.0.id.cmp(&other.0.id))
    }
}

impl PartialOrd for ByPrice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ByPrice {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByPrice {}

#[derive(Default)]
struct Views {
    recent: Mutex<VecDeque<Product>>,
    sorted: Mutex<BTreeSet<ByPrice>>,
    history: Mutex<Vec<Product>>,
}

/// Product service providing the catalog views.
///
/// Clones share the repository and the in-memory views.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    settings: ServiceSettings,
    views: Arc<Views>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a service with default settings.
    pub fn new(repository: R) -> Self {
        Self::with_settings(repository, ServiceSettings::default())
    }

    pub fn with_settings(repository: R, settings: ServiceSettings) -> Self {
        Self {
            repository: Arc::new(repository),
            settings,
            views: Arc::new(Views::default()),
        }
    }

    /// All products, or the default sample set when the catalog is empty.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<ProductDto>> {
        let products = self.repository.find_all().await?;
        Ok(with_defaults(products)
            .into_iter()
            .map(ProductDto::from)
            .collect())
    }

    /// Streaming form of [`list_products`](Self::list_products).
    ///
    /// Default products are paced by `default_emit_delay`, with no pause
    /// before the first one. A repository error is logged and ends the stream
    /// with no items. Dropping the stream abandons whatever is left.
    pub fn stream_products(&self) -> impl Stream<Item = ProductDto> + Send + 'static
    where
        R: 'static,
    {
        let repository = Arc::clone(&self.repository);
        let delay = self.settings.default_emit_delay;

        async_stream::stream! {
            match repository.find_all().await {
                Ok(products) if products.is_empty() => {
                    debug!("Catalog empty, streaming default products");
                    for (index, product) in default_products().into_iter().enumerate() {
                        if index > 0 {
                            tokio::time::sleep(delay).await;
                        }
                        yield ProductDto::from(product);
                    }
                }
                Ok(products) => {
                    for product in products {
                        yield ProductDto::from(product);
                    }
                }
                Err(e) => warn!(error = %e, "Failed to load products for stream"),
            }
        }
    }

    /// Persist a product and record it in the in-memory views.
    ///
    /// Any id on `dto` is ignored.
    #[instrument(skip(self, dto), fields(product_name = %dto.name))]
    pub async fn add_product(&self, dto: ProductDto) -> ProductResult<ProductDto> {
        dto.validate()?;

        let product = self.repository.save(dto.to_new_product()).await?;
        info!(
            product_id = %product.id,
            name = %product.name,
            price = product.price,
            "Product added"
        );

        {
            let mut recent = self.views.recent.lock().await;
            recent.push_back(product.clone());
            while recent.len() > self.settings.recent_capacity {
                recent.pop_front();
            }
        }
        self.views.history.lock().await.push(product.clone());
        self.views
            .sorted
            .lock()
            .await
            .insert(ByPrice(product.clone()));

        Ok(product.into())
    }

    /// Product by id, or the "not found" placeholder carrying the requested id.
    ///
    /// Never fails: an unparsable id, a missing product and a repository error
    /// all yield the placeholder.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> ProductDto {
        let Ok(uuid) = Uuid::parse_str(id) else {
            debug!(product_id = id, "Unparsable product id");
            return ProductDto::not_found(id);
        };

        match self.repository.find_by_id(uuid).await {
            Ok(Some(product)) => product.into(),
            Ok(None) => ProductDto::not_found(id),
            Err(e) => {
                warn!(product_id = %uuid, error = %e, "Failed to load product");
                ProductDto::not_found(id)
            }
        }
    }

    /// Delete by id if present.
    ///
    /// Missing products and unparsable ids are a no-op; repository errors
    /// are logged and otherwise ignored. The in-memory views keep their copy.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) {
        let Ok(uuid) = Uuid::parse_str(id) else {
            debug!(product_id = id, "Unparsable product id, nothing to delete");
            return;
        };

        match self.repository.find_by_id(uuid).await {
            Ok(Some(_)) => match self.repository.delete_by_id(uuid).await {
                Ok(_) => info!(product_id = %uuid, "Product deleted"),
                Err(e) => warn!(product_id = %uuid, error = %e, "Failed to delete product"),
            },
            Ok(None) => debug!(product_id = %uuid, "Product not found, nothing to delete"),
            Err(e) => warn!(product_id = %uuid, error = %e, "Failed to look up product"),
        }
    }

    /// Contents of the sorted index, ascending by price.
    ///
    /// An empty index is filled from the repository first. Equal prices are
    /// ordered by id.
    #[instrument(skip(self))]
    pub async fn sorted_products(&self) -> ProductResult<Vec<ProductDto>> {
        let mut sorted = self.views.sorted.lock().await;
        if sorted.is_empty() {
            let products = self.repository.find_all().await?;
            debug!(count = products.len(), "Back-filling sorted index");
            sorted.extend(products.into_iter().map(ByPrice));
        }

        Ok(sorted.iter().map(|entry| ProductDto::from(&entry.0)).collect())
    }

    /// Up to `limit` entries of the recency queue, oldest retained first.
    ///
    /// With an empty queue, falls back to the `limit` repository products with
    /// the greatest ids, greatest first.
    #[instrument(skip(self))]
    pub async fn recent_products(&self, limit: usize) -> ProductResult<Vec<ProductDto>> {
        let queued: Vec<ProductDto> = {
            let recent = self.views.recent.lock().await;
            recent.iter().take(limit).map(ProductDto::from).collect()
        };
        if !queued.is_empty() {
            return Ok(queued);
        }

        let mut products = self.repository.find_all().await?;
        products.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(products
            .into_iter()
            .take(limit)
            .map(ProductDto::from)
            .collect())
    }

    /// Up to `limit` added products, most recent first.
    #[instrument(skip(self))]
    pub async fn modified_products(&self, limit: usize) -> Vec<ProductDto> {
        let history = self.views.history.lock().await;
        history
            .iter()
            .rev()
            .take(limit)
            .map(ProductDto::from)
            .collect()
    }

    /// Repository products grouped by exact price.
    #[instrument(skip(self))]
    pub async fn group_by_price(&self) -> ProductResult<PriceGroups> {
        let products = self.repository.find_all().await?;
        Ok(PriceGroups::from_products(&products))
    }

    /// Cheapest and most expensive products.
    ///
    /// Each extreme is read from its own repository fetch. Among equal prices
    /// the first in repository order wins.
    #[instrument(skip(self))]
    pub async fn min_max_products(&self) -> ProductResult<MinMax> {
        let min = first_by(self.repository.find_all().await?, |candidate, best| {
            candidate.price < best.price
        })
        .ok_or(ProductError::EmptyCatalog)?;

        let max = first_by(self.repository.find_all().await?, |candidate, best| {
            candidate.price > best.price
        })
        .ok_or(ProductError::EmptyCatalog)?;

        Ok(MinMax {
            min: min.into(),
            max: max.into(),
        })
    }

    /// Products priced strictly below 20.0. Repository errors yield an empty list.
    #[instrument(skip(self))]
    pub async fn cheap_products(&self) -> Vec<ProductDto> {
        match self.repository.find_all().await {
            Ok(products) => products
                .into_iter()
                .filter(|p| p.price < CHEAP_PRICE_THRESHOLD)
                .map(ProductDto::from)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to load cheap products");
                Vec::new()
            }
        }
    }

    /// The first three products in repository order.
    ///
    /// Despite the name this is the head of the store, not its tail.
    /// Repository errors yield an empty list.
    #[instrument(skip(self))]
    pub async fn last_products(&self) -> Vec<ProductDto> {
        match self.repository.find_all().await {
            Ok(products) => products
                .into_iter()
                .take(LAST_PRODUCTS_COUNT)
                .map(ProductDto::from)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to load last products");
                Vec::new()
            }
        }
    }

    /// Number of stored products. Repository errors count as zero.
    #[instrument(skip(self))]
    pub async fn count_products(&self) -> u64 {
        self.repository.count().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to count products");
            0
        })
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            settings: self.settings.clone(),
            views: Arc::clone(&self.views),
        }
    }
}

fn with_defaults(products: Vec<Product>) -> Vec<Product> {
    if products.is_empty() {
        debug!("Catalog empty, serving default products");
        default_products()
    } else {
        products
    }
}

/// Keeps the current best unless `beats(candidate, best)`, so ties go to the
/// earliest product.
fn first_by(products: Vec<Product>, beats: impl Fn(&Product, &Product) -> bool) -> Option<Product> {
    products
        .into_iter()
        .reduce(|best, candidate| if beats(&candidate, &best) { candidate } else { best })
}
