//! Products API routes

use axum::Router;
use domain_products::{
    handlers, BlockingProductRepository, InMemoryProductRepository, InMemoryProductStore,
    ProductService,
};
use tracing::info;

use crate::config::{Config, StoreKind};

/// Create products router backed by the configured store
pub fn router(config: &Config) -> Router {
    info!(store = %config.store, "Creating product store");
    let settings = config.service.clone();

    match config.store {
        StoreKind::Memory => handlers::router(ProductService::with_settings(
            InMemoryProductRepository::new(),
            settings,
        )),
        StoreKind::Blocking => handlers::router(ProductService::with_settings(
            BlockingProductRepository::new(InMemoryProductStore::new()),
            settings,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use core_config::{app_info, server::ServerConfig};
    use domain_products::ServiceSettings;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn config(store: StoreKind) -> Config {
        Config {
            app: app_info!(),
            server: ServerConfig::default(),
            environment: Environment::Development,
            store,
            service: ServiceSettings::default(),
        }
    }

    #[tokio::test]
    async fn test_each_store_serves_the_catalog() {
        for store in [StoreKind::Memory, StoreKind::Blocking] {
            let app = crate::api::routes(&config(store));

            let response = app
                .oneshot(
                    Request::builder()
                        .uri("/products/count")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "store {store}");
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let count: u64 = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(count, 0);
        }
    }
}
