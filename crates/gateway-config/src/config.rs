//! Configuration model.
//!
//! The file has two sections: `[api_gateway]` describes where the gateway lives
//! and how to authenticate, `[bfclient]` tunes the client itself.
//!
//! ```toml
//! [api_gateway]
//! hostname = "gateway.internal"
//! port = 8080
//! version = "2"
//! apikey = "..."
//! swagger_path = "/swagger.json"
//!
//! [bfclient]
//! debug = false
//! max_retries = 3
//! delay_milliseconds = 500
//! ```

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;
use validator::Validate;

/// Complete client configuration.
#[derive(Debug, Deserialize, Validate)]
pub struct GatewayConfig {
    /// Gateway addressing and credentials.
    #[validate(nested)]
    pub api_gateway: ApiGatewayConfig,

    /// Client behavior.
    #[serde(default)]
    #[validate(nested)]
    pub bfclient: ClientSettings,
}

/// Where the gateway lives and how to authenticate against it.
#[derive(Debug, Deserialize, Validate)]
pub struct ApiGatewayConfig {
    /// Gateway hostname.
    #[validate(length(min = 1))]
    pub hostname: String,

    /// Gateway port.
    #[validate(range(min = 1))]
    pub port: u16,

    /// API version, without the leading `v`.
    #[validate(length(min = 1))]
    pub version: String,

    /// Key sent as `X-API-Key`.
    pub apikey: Secret<String>,

    /// Path of the contract document below `/v{version}`.
    #[serde(default = "default_swagger_path")]
    #[validate(length(min = 1))]
    pub swagger_path: String,

    /// Token sent as `Authorization: Bearer <token>`. The header is omitted
    /// when no token is configured.
    #[serde(default)]
    pub bearer_token: Option<Secret<String>>,
}

impl ApiGatewayConfig {
    /// Get the API key (exposed for use in requests).
    pub fn apikey_value(&self) -> &str {
        self.apikey.expose_secret().as_str()
    }
}

/// Client behavior settings.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClientSettings {
    /// Verbose logging and transport tracing. Never alters retry or timeouts.
    #[serde(default)]
    pub debug: bool,

    /// Additional attempts after a 503 response.
    #[serde(default = "default_max_retries")]
    #[validate(range(max = 100))]
    pub max_retries: u32,

    /// Fixed wait between attempts.
    #[serde(default = "default_delay_milliseconds")]
    pub delay_milliseconds: u64,

    /// Whole-request timeout applied by the transport.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,

    /// Connection timeout applied by the transport.
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
}

impl ClientSettings {
    /// Delay between retry attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.delay_milliseconds)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            debug: false,
            max_retries: default_max_retries(),
            delay_milliseconds: default_delay_milliseconds(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

fn default_swagger_path() -> String {
    "/swagger.json".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_delay_milliseconds() -> u64 {
    500
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}
