//! # Business Fabric Gateway SDK
//!
//! Validating client for the Business Fabric API gateway.
//!
//! ## Features
//!
//! - Loads the gateway's Swagger/OpenAPI contract once at construction
//! - Rejects request bodies that do not match the operation schema before
//!   anything is sent
//! - Retries `503 Service Unavailable` with a fixed delay
//! - Tags every request with a unique `HEG-BG` correlation header
//! - Pluggable transport, contract fetcher, credentials and log sink
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gateway_sdk::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gateway_core::GatewayError> {
//!     let client = Client::from_default_config().await?;
//!
//!     let body = r#"{"name":"doggie","photoUrls":[]}"#;
//!     client.validate("/pet", "post", body)?;
//!
//!     let response = client.send_request("/pet", "post", body).await?;
//!     println!("Status: {}", response.status_code());
//!     Ok(())
//! }
//! ```
//!
//! ## Schemas
//!
//! ```rust,no_run
//! # async fn example(client: &gateway_sdk::Client) -> Result<(), gateway_core::GatewayError> {
//! let pretty = client.request_schema_json("/pet", "post", true)?;
//! println!("{pretty}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod client;
mod credentials;
mod dispatcher;
mod endpoint;
mod transport;

pub use client::{Client, ClientBuilder, RequestSchema, SchemaFormat};
pub use credentials::{CredentialProvider, StaticCredentials};
pub use dispatcher::{GatewayDispatcher, API_KEY_HEADER};
pub use endpoint::{parse_location, Endpoints};
pub use transport::{ReqwestTransport, Transport};

// Re-export core types for convenience
pub use gateway_contract::{Contract, OperationSchema, ValidationOutcome, Violation};
pub use gateway_core::{GatewayError, GatewayRequest, GatewayResponse, GatewayResult, HttpMethod};
pub use gateway_resilience::RetryPolicy;
