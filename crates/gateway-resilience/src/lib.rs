//! # Gateway Resilience
//!
//! Retry handling for calls to the Business Fabric gateway: a bounded number of
//! fixed-delay retries on `503 Service Unavailable`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod retry;

pub use retry::{RetryConfig, RetryPolicy, RetryPolicyBuilder, RETRYABLE_STATUS};
