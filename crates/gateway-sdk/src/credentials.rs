//! Bearer credential supply.

use gateway_config::ApiGatewayConfig;
use secrecy::{ExposeSecret, Secret};
use std::fmt;

/// Supplies the token sent as `Authorization: Bearer <token>`.
///
/// Called once per dispatched request, so implementations may rotate tokens.
/// Returning `None` omits the header.
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Current bearer token, if any.
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, or none.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    token: Option<Secret<String>>,
}

impl StaticCredentials {
    /// Always send `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(Secret::new(token.into())),
        }
    }

    /// Never send an `Authorization` header.
    pub fn none() -> Self {
        Self { token: None }
    }

    /// Use `api_gateway.bearer_token` from the configuration.
    pub fn from_config(config: &ApiGatewayConfig) -> Self {
        Self {
            token: config
                .bearer_token
                .as_ref()
                .map(|t| Secret::new(t.expose_secret().clone())),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.as_ref().map(|t| t.expose_secret().clone())
    }
}
