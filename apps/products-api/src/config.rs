//! Configuration for Products API

use core_config::{app_info, env_parse_or, server::ServerConfig, AppInfo, FromEnv};
use domain_products::ServiceSettings;
use std::time::Duration;
use strum::{Display, EnumString};

pub use core_config::Environment;

/// Backing store for the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreKind {
    /// Async in-memory repository
    #[default]
    Memory,
    /// Blocking in-memory store driven through the blocking pool
    Blocking,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub store: StoreKind,
    pub service: ServiceSettings,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let store = env_parse_or("PRODUCTS_STORE", StoreKind::default())?;

        let defaults = ServiceSettings::default();
        let service = ServiceSettings {
            recent_capacity: env_parse_or("PRODUCTS_RECENT_CAPACITY", defaults.recent_capacity)?,
            default_emit_delay: Duration::from_millis(env_parse_or(
                "PRODUCTS_DEFAULT_EMIT_DELAY_MS",
                defaults.default_emit_delay.as_millis() as u64,
            )?),
        };

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            store,
            service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_VARS: [&str; 3] = [
        "PRODUCTS_STORE",
        "PRODUCTS_RECENT_CAPACITY",
        "PRODUCTS_DEFAULT_EMIT_DELAY_MS",
    ];

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(PRODUCT_VARS, || {
            let config = Config::from_env().unwrap();

            assert_eq!(config.store, StoreKind::Memory);
            assert_eq!(config.service, ServiceSettings::default());
            assert_eq!(config.app.name, "products_api");
        });
    }

    #[test]
    fn test_reads_product_settings() {
        temp_env::with_vars(
            [
                ("PRODUCTS_STORE", Some("Blocking")),
                ("PRODUCTS_RECENT_CAPACITY", Some("8")),
                ("PRODUCTS_DEFAULT_EMIT_DELAY_MS", Some("250")),
            ],
            || {
                let config = Config::from_env().unwrap();

                assert_eq!(config.store, StoreKind::Blocking);
                assert_eq!(config.service.recent_capacity, 8);
                assert_eq!(
                    config.service.default_emit_delay,
                    Duration::from_millis(250)
                );
            },
        );
    }

    #[test]
    fn test_rejects_unknown_store() {
        temp_env::with_var("PRODUCTS_STORE", Some("postgres"), || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_rejects_malformed_capacity() {
        temp_env::with_var("PRODUCTS_RECENT_CAPACITY", Some("five"), || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_store_kind_display_round_trips() {
        assert_eq!(StoreKind::Blocking.to_string(), "blocking");
        assert_eq!("memory".parse::<StoreKind>().unwrap(), StoreKind::Memory);
    }
}
