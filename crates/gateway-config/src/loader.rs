//! Configuration discovery, parsing and environment overrides.

use crate::config::GatewayConfig;
use crate::error::{ConfigError, Result};
use secrecy::Secret;
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "BFCLIENT_CONFIG";

/// System-wide configuration file, checked before the local fallback.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/brand-integration-client.toml";

/// Configuration file relative to the working directory.
pub const LOCAL_CONFIG_PATH: &str = "conf/brand-integration-client.toml";

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (default).
    Toml,
    /// YAML.
    Yaml,
    /// JSON.
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension, defaulting to TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            Some("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        }
    }
}

/// Loads [`GatewayConfig`] from a file, applies environment overrides and
/// validates the result.
#[derive(Debug)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_overrides: bool,
}

impl ConfigLoader {
    /// Create a loader that searches the default locations.
    pub fn new() -> Self {
        Self {
            file: None,
            env_overrides: true,
        }
    }

    /// Load from this file instead of searching.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Ignore `BFCLIENT_*` environment overrides.
    #[must_use]
    pub fn without_env_overrides(mut self) -> Self {
        self.env_overrides = false;
        self
    }

    /// Load, override and validate the configuration.
    pub async fn load(self) -> Result<GatewayConfig> {
        let path = self.resolve_path()?;
        debug!(path = %path.display(), "Loading configuration");

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;

        let mut config = parse(&contents, ConfigFormat::from_path(&path))?;

        if self.env_overrides {
            apply_overrides(&mut config, |var| std::env::var(var).ok())?;
        }

        validate(&config)?;
        Ok(config)
    }

    fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.file {
            return Ok(path.clone());
        }

        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        candidates.push(PathBuf::from(SYSTEM_CONFIG_PATH));
        candidates.push(PathBuf::from(LOCAL_CONFIG_PATH));

        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Ok(path.clone()),
            None => Err(ConfigError::NotFound {
                searched: candidates,
            }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse configuration text in the given format without validating it.
pub fn parse(contents: &str, format: ConfigFormat) -> Result<GatewayConfig> {
    let parsed = match format {
        ConfigFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| ConfigError::Parse {
        format: format.name(),
        message,
    })
}

/// Run field validation over a configuration.
pub fn validate(config: &GatewayConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| ConfigError::Validation(e.to_string()))?;

    if !config.api_gateway.swagger_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "api_gateway.swagger_path must start with '/', got {:?}",
            config.api_gateway.swagger_path
        )));
    }

    Ok(())
}

/// Apply `BFCLIENT_*` overrides using `lookup` to read variables.
pub(crate) fn apply_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(hostname) = lookup("BFCLIENT_HOSTNAME") {
        config.api_gateway.hostname = hostname;
    }
    if let Some(port) = lookup("BFCLIENT_PORT") {
        config.api_gateway.port = port.parse().map_err(|e| ConfigError::InvalidOverride {
            var: "BFCLIENT_PORT".to_string(),
            message: format!("{e}"),
        })?;
    }
    if let Some(version) = lookup("BFCLIENT_VERSION") {
        config.api_gateway.version = version;
    }
    if let Some(key) = lookup("BFCLIENT_API_KEY") {
        config.api_gateway.apikey = Secret::new(key);
    }
    if let Some(token) = lookup("BFCLIENT_BEARER_TOKEN") {
        config.api_gateway.bearer_token = Some(Secret::new(token));
    }
    if let Some(debug) = lookup("BFCLIENT_DEBUG") {
        config.bfclient.debug = match debug.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" | "" => false,
            other => {
                return Err(ConfigError::InvalidOverride {
                    var: "BFCLIENT_DEBUG".to_string(),
                    message: format!("expected a boolean, got {other:?}"),
                })
            }
        };
    }

    Ok(())
}
