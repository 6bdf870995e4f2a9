//! Products API - REST server for the product catalog

use axum::Router;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;

use config::Config;

/// Catalog routes under `/products`, plus docs, health and the shared layers.
fn build_app(config: &Config) -> std::io::Result<Router> {
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(config))?;
    Ok(router.merge(health_router(config.app)))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        store = %config.store,
        recent_capacity = config.service.recent_capacity,
        default_emit_delay = ?config.service.default_emit_delay,
        "Loaded configuration"
    );

    let app = build_app(&config)?;

    info!(
        "Starting {} v{} on {}",
        config.app.name,
        config.app.version,
        config.server.address()
    );

    create_production_app(app, &config.server, async {
        info!("Shutting down: in-memory catalog discarded");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Products API shutdown complete");
    Ok(())
}
