//! Fixed-delay retry on transient gateway unavailability.
//!
//! Only `503 Service Unavailable` responses are retried. Every other status and
//! every transport error is returned immediately, and when retries run out the
//! last response is handed back unchanged.

use gateway_core::{GatewayResponse, GatewayResult};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// The one status treated as transient.
pub const RETRYABLE_STATUS: u16 = 503;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Additional attempts after the first
    pub max_retries: u32,
    /// Fixed wait between attempts
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Retry policy implementation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Retry 503 responses up to `max_retries` times, `delay` apart.
    #[must_use]
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self::new(RetryConfig { max_retries, delay })
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::fixed(0, Duration::ZERO)
    }

    /// Check if a response status should be retried
    #[must_use]
    pub fn is_retryable_status(&self, status: u16) -> bool {
        status == RETRYABLE_STATUS
    }

    /// Run `operation` until it returns a non-retryable response or the retry
    /// budget is spent. The closure receives the 0-based attempt number.
    ///
    /// # Errors
    /// Returns the first error the operation produces; errors are not retried.
    pub async fn execute<F, Fut>(&self, mut operation: F) -> GatewayResult<GatewayResponse>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = GatewayResult<GatewayResponse>>,
    {
        let mut attempt = 0;
        loop {
            let response = operation(attempt).await?;
            let status = response.status_code();

            if !self.is_retryable_status(status) {
                if attempt > 0 {
                    debug!(attempt = attempt, status = status, "Retry succeeded");
                }
                return Ok(response);
            }

            if attempt >= self.config.max_retries {
                warn!(
                    attempts = attempt + 1,
                    status = status,
                    "Retries exhausted, returning last response"
                );
                return Ok(response);
            }

            warn!(
                attempt = attempt + 1,
                max_retries = self.config.max_retries,
                delay_ms = self.config.delay.as_millis(),
                status = status,
                "Retrying after transient status"
            );

            tokio::time::sleep(self.config.delay).await;
            attempt += 1;
        }
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Builder for retry policy
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    config: RetryConfig,
}

impl RetryPolicyBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max retries
    #[must_use]
    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    /// Set the delay between attempts
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    /// Build the policy
    #[must_use]
    pub fn build(self) -> RetryPolicy {
        RetryPolicy::new(self.config)
    }
}
