//! Gateway addressing derived from configuration.
//!
//! The contract lives at `http://{hostname}:{port}/v{version}{swagger_path}`;
//! request URLs are resolved against `http://{hostname}:{port}/{version}` using
//! the contract's base path joined with the operation path. Because that joined
//! path is absolute, it replaces the version segment of the base URL.

use gateway_config::ApiGatewayConfig;
use gateway_core::{GatewayError, GatewayResult};
use std::path::Path;
use url::Url;

/// Resolved gateway locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    contract_uri: Url,
    base_url: Url,
}

impl Endpoints {
    /// Use explicit locations.
    pub fn new(contract_uri: Url, base_url: Url) -> Self {
        Self {
            contract_uri,
            base_url,
        }
    }

    /// Derive both locations from the `[api_gateway]` section.
    pub fn from_config(config: &ApiGatewayConfig) -> GatewayResult<Self> {
        let origin = format!("http://{}:{}", config.hostname, config.port);

        let contract_uri = format!("{origin}/v{}{}", config.version, config.swagger_path);
        let contract_uri = Url::parse(&contract_uri).map_err(|e| {
            GatewayError::configuration(format!("Invalid contract URI {contract_uri:?}: {e}"))
        })?;

        let base_url = format!("{origin}/{}", config.version);
        let base_url = Url::parse(&base_url).map_err(|e| {
            GatewayError::configuration(format!("Invalid base URL {base_url:?}: {e}"))
        })?;

        Ok(Self {
            contract_uri,
            base_url,
        })
    }

    /// Where the contract is fetched from.
    pub fn contract_uri(&self) -> &Url {
        &self.contract_uri
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for an operation path under the contract's base path.
    pub fn request_url(&self, base_path: &str, path: &str) -> GatewayResult<Url> {
        let target = format!("{base_path}{path}");
        self.base_url
            .join(&target)
            .map_err(|e| GatewayError::configuration(format!("Invalid request path {target:?}: {e}")))
    }
}

/// Parse a contract location given either as a URL or as a filesystem path.
pub fn parse_location(location: &str) -> GatewayResult<Url> {
    if let Ok(url) = Url::parse(location) {
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }

    let path = Path::new(location);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| GatewayError::configuration(format!("Cannot resolve {location:?}: {e}")))?
            .join(path)
    };

    Url::from_file_path(&absolute)
        .map_err(|()| GatewayError::configuration(format!("Invalid contract location {location:?}")))
}
