//! # Gateway Telemetry
//!
//! Structured logging for the Business Fabric gateway client, built on
//! `tracing` and `tracing-subscriber`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;

pub use logging::{init_logging, log_dispatch, log_dispatch_with_writer, LoggingConfig, LoggingError};

/// Create a span for one gateway call
#[macro_export]
macro_rules! gateway_request_span {
    ($correlation_id:expr, $method:expr, $path:expr) => {
        tracing::info_span!(
            "gateway_request",
            correlation_id = %$correlation_id,
            method = %$method,
            path = %$path,
        )
    };
}
