//! Test helper utilities for integration tests

use gateway_config::{ConfigFormat, GatewayConfig};
use gateway_core::GatewayResponse;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for tests (only once)
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
});

/// Initialize tracing for tests
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Client configuration pointing at a mock gateway.
///
/// `extra` is spliced into the `[api_gateway]` table.
pub fn config_for(address: &SocketAddr, extra: &str) -> GatewayConfig {
    gateway_config::parse(
        &format!(
            r#"
            [api_gateway]
            hostname = "{}"
            port = {}
            version = "2"
            apikey = "integration-key"
            {extra}

            [bfclient]
            max_retries = 3
            delay_milliseconds = 5
            "#,
            address.ip(),
            address.port()
        ),
        ConfigFormat::Toml,
    )
    .expect("test configuration should parse")
}

/// Assert response status
pub fn assert_status(response: &GatewayResponse, expected: u16) {
    assert_eq!(
        response.status_code(),
        expected,
        "Expected status {}, got {}: {}",
        expected,
        response.status_code(),
        response.text()
    );
}
