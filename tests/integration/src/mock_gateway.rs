//! Mock Business Fabric gateway for integration tests

use crate::fixtures::PETSTORE_CONTRACT;
use crate::helpers::config_for;
use gateway_config::GatewayConfig;
use gateway_sdk::Client;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// A wiremock server that serves the petstore contract.
pub struct MockGateway {
    /// The underlying mock server
    pub server: MockServer,
}

impl MockGateway {
    /// Start a gateway whose contract may be fetched exactly once.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/swagger.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PETSTORE_CONTRACT))
            .expect(1)
            .named("contract")
            .mount(&server)
            .await;
        Self { server }
    }

    /// Configuration addressing this gateway.
    pub fn config(&self, extra: &str) -> GatewayConfig {
        config_for(self.server.address(), extra)
    }

    /// Build a client against this gateway with default settings.
    pub async fn client(&self) -> Client {
        Client::from_config(self.config(""))
            .await
            .expect("client should load the contract")
    }

    /// Respond to `verb path` with a fixed status and JSON body.
    pub async fn respond(&self, verb: &str, route: &str, status: u16, body: &str) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("content-type", "application/json")
                    .set_body_string(body),
            )
            .mount(&self.server)
            .await;
    }

    /// Requests received on routes other than the contract.
    pub async fn api_requests(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() != "/v2/swagger.json")
            .collect()
    }
}
