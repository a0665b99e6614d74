//! HTTP transport.
//!
//! The dispatcher only needs "send this request, give me the response", so the
//! transport is a trait. [`ReqwestTransport`] is the production implementation.

use async_trait::async_trait;
use gateway_core::{GatewayError, GatewayRequest, GatewayResponse, GatewayResult};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Sends one request and returns whatever the gateway answered.
///
/// Implementations return `Ok` for every HTTP status, including 4xx and 5xx;
/// `Err` is reserved for failing to get a response at all.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send the request.
    async fn send(&self, request: &GatewayRequest) -> GatewayResult<GatewayResponse>;
}

/// Transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    timeout: Duration,
    trace: bool,
}

impl ReqwestTransport {
    /// Create a transport with its own connection pool.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| GatewayError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            timeout,
            trace: false,
        })
    }

    /// Log request and response headers and bodies at debug level.
    /// Credential headers are redacted.
    #[must_use]
    pub fn with_tracing(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> GatewayError {
        let message = if error.is_timeout() {
            format!("request timed out after {}ms", self.timeout.as_millis())
        } else if error.is_connect() {
            "failed to connect to gateway".to_string()
        } else {
            "request failed".to_string()
        };
        GatewayError::transport_with_source(message, error)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &GatewayRequest) -> GatewayResult<GatewayResponse> {
        if self.trace {
            debug!(
                method = %request.method,
                url = %request.url,
                headers = ?request.headers,
                body = %String::from_utf8_lossy(&request.body),
                "Transport request"
            );
        }

        let response = self
            .http
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.map_reqwest_error(e))?;

        if self.trace {
            debug!(
                status = status.as_u16(),
                headers = ?headers,
                body = %String::from_utf8_lossy(&body),
                "Transport response"
            );
        }

        Ok(GatewayResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::HttpMethod;
    use url::Url;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v2/pet"))
            .and(body_string("{}"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5), Duration::from_secs(5)).unwrap();
        let url = Url::parse(&format!("{}/v2/pet", server.uri())).unwrap();
        let request = GatewayRequest::builder(HttpMethod::Put, url).body("{}").build();

        let response = transport.send(&request).await.unwrap();
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.text(), "missing");
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        let transport =
            ReqwestTransport::new(Duration::from_secs(2), Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is closed in test environments.
        let url = Url::parse("http://127.0.0.1:9/v2/pet").unwrap();
        let request = GatewayRequest::builder(HttpMethod::Post, url).build();

        let err = transport.send(&request).await.unwrap_err();
        assert_eq!(err.kind(), "transport_unavailable");
        assert!(std::error::Error::source(&err).is_some());
    }
}
