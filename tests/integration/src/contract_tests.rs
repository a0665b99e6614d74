//! Contract loading from different sources and dialects.

use crate::fixtures::*;
use crate::helpers::*;
use gateway_contract::ContractFormat;
use gateway_core::GatewayError;
use gateway_sdk::{parse_location, Client};
use pretty_assertions::assert_eq;
use std::io::Write;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn yaml_contract_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(INVENTORY_CONTRACT_YAML.as_bytes()).unwrap();
    file
}

async fn inventory_client(server: &MockServer, file: &tempfile::NamedTempFile) -> Client {
    Client::builder(config_for(server.address(), ""))
        .contract_uri(parse_location(file.path().to_str().unwrap()).unwrap())
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_openapi3_yaml_contract_from_disk() {
    init_tracing();
    let server = MockServer::start().await;
    let file = yaml_contract_file();
    let client = inventory_client(&server, &file).await;

    let contract = client.contract();
    assert_eq!(contract.format(), ContractFormat::OpenApi3);
    assert_eq!(contract.title(), Some("Inventory"));
    assert_eq!(contract.version(), Some("1.4.0"));
    assert_eq!(contract.base_path(), "/inventory");
    assert_eq!(contract.len(), 2);

    // Nothing was fetched over HTTP.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_openapi3_request_body_validation() {
    let server = MockServer::start().await;
    let file = yaml_contract_file();
    let client = inventory_client(&server, &file).await;

    let err = client
        .validate("/items", "post", r#"{"sku":"A-1","restocked":"yesterday"}"#)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed asserting that {\"sku\":\"A-1\",\"restocked\":\"yesterday\"} is a valid request body.\n\
         [quantity] The property quantity is required\n\
         [restocked] Invalid date \"yesterday\", expected format YYYY-MM-DD\n"
    );

    assert!(client
        .validate("/items", "POST", r#"{"sku":"A-1","quantity":3,"restocked":"2024-02-29"}"#)
        .unwrap());
    assert!(client.validate("/items/{sku}", "delete", "").unwrap());
}

#[tokio::test]
async fn test_openapi3_requests_use_server_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/inventory/items"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let file = yaml_contract_file();
    let client = inventory_client(&server, &file).await;
    let response = client
        .send_request("/items", "post", r#"{"sku":"A-1","quantity":3}"#)
        .await
        .unwrap();

    assert_status(&response, 201);
}

#[tokio::test]
async fn test_contract_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/swagger.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = Client::from_config(config_for(server.address(), ""))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ContractUnavailable { .. }));
}

#[tokio::test]
async fn test_swagger_without_base_path_is_malformed() {
    let server = MockServer::start().await;
    let mut contract: serde_json::Value = serde_json::from_str(PETSTORE_CONTRACT).unwrap();
    contract.as_object_mut().unwrap().remove("basePath");

    Mock::given(method("GET"))
        .and(path("/v2/swagger.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(contract))
        .mount(&server)
        .await;

    let err = Client::from_config(config_for(server.address(), ""))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ContractMalformed { .. }));
}

#[tokio::test]
async fn test_custom_swagger_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/docs/api.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PETSTORE_CONTRACT))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::from_config(config_for(server.address(), r#"swagger_path = "/docs/api.json""#))
        .await
        .unwrap();
    assert_eq!(client.contract().len(), 8);
}
