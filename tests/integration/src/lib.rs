//! Integration tests for the Business Fabric gateway client
//!
//! This crate exercises the client end to end against a mock gateway:
//! - Contract loading from HTTP and from disk
//! - Request-body validation and diagnostics
//! - Dispatch headers and correlation ids
//! - Retry behavior

pub mod fixtures;
pub mod helpers;
pub mod mock_gateway;

// Re-export commonly used items
pub use fixtures::*;
pub use helpers::*;
pub use mock_gateway::*;

#[cfg(test)]
mod contract_tests;
#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod retry_tests;
