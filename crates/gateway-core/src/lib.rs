//! # Gateway Core
//!
//! Core types and error handling for the Business Fabric gateway client.
//!
//! This crate provides the foundational types used throughout the client:
//! - The error taxonomy shared by every layer
//! - HTTP method, request and response types exchanged with the transport
//! - Validated identifiers (correlation ids)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types
pub use error::{GatewayError, GatewayResult};
pub use request::{GatewayRequest, HttpMethod};
pub use response::GatewayResponse;
pub use types::{CorrelationId, CORRELATION_HEADER};
