//! Retry behavior against a live mock gateway.

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_gateway::MockGateway;
use gateway_core::CORRELATION_HEADER;
use gateway_resilience::{RetryPolicy, RetryPolicyBuilder};
use gateway_sdk::{parse_location, Client};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_status(gateway: &MockGateway, status: u16, times: Option<u64>, expected: u64) {
    let mock = Mock::given(method("POST"))
        .and(path("/v2/pet"))
        .respond_with(ResponseTemplate::new(status));
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.expect(expected).mount(&gateway.server).await;
}

#[tokio::test]
async fn test_recovers_after_transient_unavailability() {
    init_tracing();
    let gateway = MockGateway::start().await;
    mount_status(&gateway, 503, Some(2), 2).await;
    mount_status(&gateway, 200, None, 1).await;

    let client = gateway.client().await;
    let response = client
        .send_request("/pet", "post", &valid_pet().to_string())
        .await
        .unwrap();

    assert_status(&response, 200);

    let requests = gateway.api_requests().await;
    assert_eq!(requests.len(), 3);
    let first = &requests[0].headers[CORRELATION_HEADER];
    assert!(requests.iter().all(|r| &r.headers[CORRELATION_HEADER] == first));
}

#[tokio::test]
async fn test_exhausted_retries_return_last_response() {
    let gateway = MockGateway::start().await;
    // One attempt plus max_retries = 3.
    mount_status(&gateway, 503, None, 4).await;

    let client = gateway.client().await;
    let started = Instant::now();
    let response = client
        .send_request("/pet", "post", &valid_pet().to_string())
        .await
        .unwrap();

    assert_status(&response, 503);
    assert!(started.elapsed() >= Duration::from_millis(15));
}

#[tokio::test]
async fn test_other_server_errors_not_retried() {
    let gateway = MockGateway::start().await;
    mount_status(&gateway, 500, None, 1).await;

    let client = gateway.client().await;
    let response = client
        .send_request("/pet", "post", &valid_pet().to_string())
        .await
        .unwrap();

    assert_status(&response, 500);
}

#[tokio::test]
async fn test_only_service_unavailable_is_retried() {
    let gateway = MockGateway::start().await;
    mount_status(&gateway, 502, None, 1).await;

    let policy = RetryPolicyBuilder::new()
        .max_retries(5)
        .delay(Duration::from_millis(1))
        .build();
    let client = Client::builder(gateway.config(""))
        .retry_policy(policy)
        .build()
        .await
        .unwrap();

    let response = client
        .send_request("/pet", "post", &valid_pet().to_string())
        .await
        .unwrap();
    assert_status(&response, 502);
}

#[tokio::test]
async fn test_unreachable_gateway_is_not_retried() {
    let gateway = MockGateway::start().await;
    // Contract comes from the mock, requests go to a closed port.
    let client = Client::builder(config_for(&"127.0.0.1:9".parse().unwrap(), ""))
        .contract_uri(parse_location(&format!("{}/v2/swagger.json", gateway.server.uri())).unwrap())
        .retry_policy(RetryPolicy::fixed(3, Duration::from_secs(30)))
        .build()
        .await
        .unwrap();

    let started = Instant::now();
    let err = client
        .send_request("/pet", "post", &valid_pet().to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, gateway_core::GatewayError::TransportUnavailable { .. }));
    assert!(started.elapsed() < Duration::from_secs(30));
}
