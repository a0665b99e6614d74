//! # Gateway Config
//!
//! Configuration for the Business Fabric gateway client.
//!
//! Configuration is read once at startup from a TOML, YAML or JSON file,
//! optionally overridden from `BFCLIENT_*` environment variables, validated,
//! and then treated as immutable for the life of the client.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod loader;

pub use config::{ApiGatewayConfig, ClientSettings, GatewayConfig};
pub use error::{ConfigError, Result};
pub use loader::{
    parse, validate, ConfigFormat, ConfigLoader, CONFIG_ENV, LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH,
};

/// Load configuration from the default search locations.
pub async fn load_config() -> Result<GatewayConfig> {
    ConfigLoader::new().load().await
}
