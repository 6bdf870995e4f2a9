//! Products Domain
//!
//! A product catalog with derived, read-only views: sorted, recent,
//! modification history, grouped by price, min/max, cheap, first three.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, SSE stream
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Views, validation, in-memory recency/sorted/history
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Async trait; in-memory and blocking-adapter stores
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{handlers, InMemoryProductRepository, ProductService};
//!
//! let service = ProductService::new(InMemoryProductRepository::new());
//! let router: axum::Router = handlers::router(service);
//! ```

pub mod blocking;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use blocking::BlockingProductRepository;
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use memory::{InMemoryProductRepository, InMemoryProductStore};
pub use models::{LimitQuery, MinMax, NewProduct, PriceGroups, Product, ProductDto};
pub use repository::{ProductRepository, ProductStore};
pub use service::{ProductService, ServiceSettings};
