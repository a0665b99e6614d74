//! End-to-end integration tests
//!
//! Each test loads the contract from a mock gateway, validates a body and,
//! where relevant, checks what actually reached the gateway.

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_gateway::MockGateway;
use gateway_core::{GatewayError, CORRELATION_HEADER};
use gateway_sdk::Violation;
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_e2e_send_valid_pet() {
    init_tracing();
    let gateway = MockGateway::start().await;
    gateway.respond("POST", "/v2/pet", 200, &valid_pet().to_string()).await;

    let client = gateway.client().await;
    let response = client
        .send_request("/pet", "POST", &valid_pet().to_string())
        .await
        .unwrap();

    assert_status(&response, 200);
    assert_eq!(response.json::<serde_json::Value>().unwrap(), valid_pet());

    let requests = gateway.api_requests().await;
    assert_eq!(requests.len(), 1);

    let sent = &requests[0];
    assert_eq!(sent.url.path(), "/v2/pet");
    assert_eq!(sent.headers["x-api-key"], "integration-key");
    assert_eq!(sent.headers["content-type"], "application/json");
    assert!(sent.headers.get("authorization").is_none());
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&sent.body).unwrap(),
        valid_pet()
    );

    let correlation = sent.headers[CORRELATION_HEADER].to_str().unwrap();
    assert!(Uuid::parse_str(correlation).is_ok());
}

#[tokio::test]
async fn test_e2e_correlation_id_distinct_per_call() {
    let gateway = MockGateway::start().await;
    gateway.respond("POST", "/v2/user", 200, "{}").await;

    let client = gateway.client().await;
    let body = json!({"username": "jdoe", "email": "jdoe@example.com"}).to_string();
    client.send_request("/user", "post", &body).await.unwrap();
    client.send_request("/user", "post", &body).await.unwrap();

    let ids: Vec<String> = gateway
        .api_requests()
        .await
        .iter()
        .map(|r| r.headers[CORRELATION_HEADER].to_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_e2e_string_id_is_rejected_with_diagnostic() {
    let gateway = MockGateway::start().await;
    let client = gateway.client().await;

    let valid = r#"{"id":12,"name":"doggie","photoUrls":[]}"#;
    assert!(client.validate("/pet", "post", valid).unwrap());

    let invalid = r#"{"id":"12","name":"doggie","photoUrls":[]}"#;
    let err = client.validate("/pet", "post", invalid).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed asserting that {\"id\":\"12\",\"name\":\"doggie\",\"photoUrls\":[]} is a valid request body.\n\
         [id] String value found, but an integer is required\n"
    );
}

#[tokio::test]
async fn test_e2e_invalid_body_never_reaches_gateway() {
    let gateway = MockGateway::start().await;
    gateway.respond("POST", "/v2/store/order", 200, "{}").await;
    let client = gateway.client().await;

    let mut order = valid_order();
    order["shipDate"] = json!("next tuesday");
    order["status"] = json!("lost");

    let err = client
        .send_request("/store/order", "post", &order.to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ValidationFailed { .. }));

    let outcome = client
        .check("/store/order", "post", &order.to_string())
        .unwrap();
    let fields: Vec<&str> = outcome.violations().iter().map(Violation::field).collect();
    assert_eq!(fields, vec!["shipDate", "status"]);

    assert!(gateway.api_requests().await.is_empty());
}

#[tokio::test]
async fn test_e2e_nested_violations_in_declaration_order() {
    let gateway = MockGateway::start().await;
    let client = gateway.client().await;

    let body = json!({
        "id": "x",
        "category": {"id": "y"},
        "photoUrls": [1],
        "tags": [{"id": 1, "name": false}]
    });
    let outcome = client.check("/pet", "post", &body.to_string()).unwrap();
    let fields: Vec<&str> = outcome.violations().iter().map(Violation::field).collect();

    assert_eq!(
        fields,
        vec!["id", "name", "category.id", "photoUrls[0]", "tags[0].name"]
    );
}

#[tokio::test]
async fn test_e2e_array_body() {
    let gateway = MockGateway::start().await;
    gateway
        .respond("POST", "/v2/user/createWithArray", 200, "{}")
        .await;
    let client = gateway.client().await;

    let users = json!([{"username": "a"}, {"username": "b", "userStatus": "active"}]);
    let err = client
        .send_request("/user/createWithArray", "post", &users.to_string())
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .ends_with("[[1].userStatus] String value found, but an integer is required\n"));

    let users = json!([{"username": "a"}, {"username": "b", "userStatus": 1}]);
    let response = client
        .send_request("/user/createWithArray", "post", &users.to_string())
        .await
        .unwrap();
    assert_status(&response, 200);
}

#[tokio::test]
async fn test_e2e_lookup_errors() {
    let gateway = MockGateway::start().await;
    let client = gateway.client().await;

    let err = client.validate("/pets", "post", "{}").unwrap_err();
    assert!(matches!(err, GatewayError::OperationNotFound { .. }));

    let err = client.validate("/pet", "patch", "{}").unwrap_err();
    assert!(matches!(err, GatewayError::OperationNotFound { .. }));

    let err = client.validate("/pet", "post", "{not json").unwrap_err();
    assert!(matches!(err, GatewayError::MalformedRequestBody { .. }));

    assert!(client.validate("/pet/findByStatus", "GET", "").unwrap());
}

#[tokio::test]
async fn test_e2e_pretty_schema() {
    let gateway = MockGateway::start().await;
    let client = gateway.client().await;

    let pretty = client.request_schema_json("/store/order", "post", true).unwrap();
    assert!(pretty.starts_with("{\n  \"type\": \"object\",\n  \"properties\": {\n    \"id\""));

    let compact = client.request_schema_json("/store/order", "post", false).unwrap();
    assert!(!compact.contains('\n'));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&pretty).unwrap(),
        serde_json::from_str::<serde_json::Value>(&compact).unwrap()
    );
}

#[tokio::test]
async fn test_e2e_pet_schema_matches_recording() {
    let gateway = MockGateway::start().await;
    let client = gateway.client().await;

    let pretty = client.request_schema_json("/pet", "post", true).unwrap();
    assert_eq!(pretty, PET_SCHEMA_PRETTY.trim_end());
}

#[tokio::test]
async fn test_e2e_send_to_concrete_path() {
    let gateway = MockGateway::start().await;
    gateway.respond("DELETE", "/v2/pet/42", 200, "{}").await;
    let client = gateway.client().await;

    let response = client.send_request("/pet/42", "delete", "").await.unwrap();
    assert_status(&response, 200);

    let requests = gateway.api_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/v2/pet/42");
}

#[tokio::test]
async fn test_e2e_literal_path_beats_parameter() {
    let gateway = MockGateway::start().await;
    gateway
        .respond("GET", "/v2/pet/findByStatus", 200, "[]")
        .await;
    gateway.respond("GET", "/v2/pet/7", 200, "{}").await;
    let client = gateway.client().await;

    assert_status(&client.send_request("/pet/findByStatus", "get", "").await.unwrap(), 200);
    assert_status(&client.send_request("/pet/7", "GET", "").await.unwrap(), 200);

    // A body on a bodyless operation is checked against the permissive schema.
    assert!(client.validate("/pet/7", "get", "{}").unwrap());

    let err = client.send_request("/pet/7/photos", "get", "").await.unwrap_err();
    assert!(matches!(err, GatewayError::OperationNotFound { .. }));

    let paths: Vec<String> = gateway
        .api_requests()
        .await
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(paths, vec!["/v2/pet/findByStatus", "/v2/pet/7"]);
}

#[tokio::test]
async fn test_e2e_empty_body_for_pet_is_rejected() {
    let gateway = MockGateway::start().await;
    let client = gateway.client().await;

    let err = client.send_request("/pet", "post", "").await.unwrap_err();
    assert!(err
        .to_string()
        .ends_with("[] Null value found, but an object is required\n"));
    assert!(gateway.api_requests().await.is_empty());
}

#[tokio::test]
async fn test_e2e_error_status_is_returned_not_raised() {
    let gateway = MockGateway::start().await;
    gateway
        .respond("POST", "/v2/pet", 404, r#"{"message":"not found"}"#)
        .await;
    let client = gateway.client().await;

    let response = client
        .send_request("/pet", "post", &valid_pet().to_string())
        .await
        .unwrap();

    assert_status(&response, 404);
    assert_eq!(response.text(), r#"{"message":"not found"}"#);
    assert_eq!(gateway.api_requests().await.len(), 1);
}
