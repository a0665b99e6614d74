//! Request composition and dispatch.

use crate::credentials::CredentialProvider;
use crate::transport::Transport;
use bytes::Bytes;
use gateway_core::{
    CorrelationId, GatewayError, GatewayRequest, GatewayResponse, GatewayResult, HttpMethod,
};
use gateway_resilience::RetryPolicy;
use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use tracing::{debug, Instrument};
use url::Url;

/// Header carrying the gateway API key.
pub const API_KEY_HEADER: &str = "x-api-key";

const JSON: &str = "application/json";

/// Attaches gateway headers to a request and sends it under a retry policy.
#[derive(Debug, Clone)]
pub struct GatewayDispatcher {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    api_key: HeaderValue,
}

impl GatewayDispatcher {
    /// Create a dispatcher. Fails if the API key is not a valid header value.
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        api_key: &str,
    ) -> GatewayResult<Self> {
        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|e| GatewayError::configuration(format!("Invalid API key: {e}")))?;
        api_key.set_sensitive(true);

        Ok(Self {
            transport,
            credentials,
            api_key,
        })
    }

    /// Send one request.
    ///
    /// A single correlation id is generated per call and reused across
    /// retries. `headers` are applied last and replace the defaults.
    pub async fn dispatch(
        &self,
        method: HttpMethod,
        url: Url,
        body: Bytes,
        headers: HeaderMap,
        retry_policy: &RetryPolicy,
    ) -> GatewayResult<GatewayResponse> {
        let correlation_id = CorrelationId::generate();
        let span = gateway_telemetry::gateway_request_span!(correlation_id, method, url.path());

        async move {
            let mut composed = self.default_headers()?;
            composed.extend(headers);

            let request = GatewayRequest::builder(method, url)
                .body(body)
                .headers(composed)
                .correlation_id(correlation_id)
                .build();

            debug!(url = %request.url, "Dispatching request");

            let transport = &self.transport;
            let request = &request;
            let response = retry_policy
                .execute(|attempt| {
                    if attempt > 0 {
                        debug!(attempt = attempt, "Resending request");
                    }
                    transport.send(request)
                })
                .await?;

            debug!(status = response.status_code(), "Response received");
            Ok(response)
        }
        .instrument(span)
        .await
    }

    fn default_headers(&self) -> GatewayResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), self.api_key.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));

        if let Some(token) = self.credentials.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| GatewayError::configuration(format!("Invalid bearer token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;
    use async_trait::async_trait;
    use gateway_core::CORRELATION_HEADER;
    use http::StatusCode;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records requests and answers with a scripted list of statuses.
    #[derive(Debug, Default)]
    struct RecordingTransport {
        statuses: Vec<u16>,
        seen: Mutex<Vec<GatewayRequest>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: &GatewayRequest) -> GatewayResult<GatewayResponse> {
            let mut seen = self.seen.lock().unwrap();
            let status = self.statuses[seen.len().min(self.statuses.len() - 1)];
            seen.push(request.clone());
            Ok(GatewayResponse::new(
                StatusCode::from_u16(status).unwrap(),
                HeaderMap::new(),
                request.body.clone(),
            ))
        }
    }

    fn dispatcher(transport: Arc<RecordingTransport>, creds: StaticCredentials) -> GatewayDispatcher {
        GatewayDispatcher::new(transport, Arc::new(creds), "key-123").unwrap()
    }

    fn url() -> Url {
        Url::parse("http://gateway.test:8080/v2/pet").unwrap()
    }

    #[tokio::test]
    async fn test_headers_attached() {
        let transport = Arc::new(RecordingTransport {
            statuses: vec![200],
            ..Default::default()
        });
        let response = dispatcher(Arc::clone(&transport), StaticCredentials::new("tok"))
            .dispatch(HttpMethod::Post, url(), Bytes::from_static(b"{}"), HeaderMap::new(), &RetryPolicy::none())
            .await
            .unwrap();

        assert_eq!(response.status_code(), 200);
        let seen = transport.seen.lock().unwrap();
        let headers = &seen[0].headers;
        assert_eq!(headers[API_KEY_HEADER], "key-123");
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[ACCEPT], "application/json");
        assert!(headers.contains_key(CORRELATION_HEADER));
        assert!(headers[API_KEY_HEADER].is_sensitive());
    }

    #[tokio::test]
    async fn test_no_authorization_without_token() {
        let transport = Arc::new(RecordingTransport {
            statuses: vec![200],
            ..Default::default()
        });
        dispatcher(Arc::clone(&transport), StaticCredentials::none())
            .dispatch(HttpMethod::Post, url(), Bytes::new(), HeaderMap::new(), &RetryPolicy::none())
            .await
            .unwrap();

        assert!(!transport.seen.lock().unwrap()[0].headers.contains_key(AUTHORIZATION));
    }

    #[tokio::test(start_paused = true)]
    async fn test_correlation_id_stable_across_retries_and_unique_per_call() {
        let transport = Arc::new(RecordingTransport {
            statuses: vec![503, 200],
            ..Default::default()
        });
        let dispatcher = dispatcher(Arc::clone(&transport), StaticCredentials::none());
        let policy = RetryPolicy::fixed(3, Duration::from_millis(10));

        dispatcher
            .dispatch(HttpMethod::Post, url(), Bytes::new(), HeaderMap::new(), &policy)
            .await
            .unwrap();
        dispatcher
            .dispatch(HttpMethod::Post, url(), Bytes::new(), HeaderMap::new(), &policy)
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].correlation_id, seen[1].correlation_id);
        assert_ne!(seen[1].correlation_id, seen[2].correlation_id);
    }

    #[tokio::test]
    async fn test_caller_headers_override_defaults() {
        let transport = Arc::new(RecordingTransport {
            statuses: vec![200],
            ..Default::default()
        });
        let mut extra = HeaderMap::new();
        extra.insert(ACCEPT, HeaderValue::from_static("application/xml"));

        dispatcher(Arc::clone(&transport), StaticCredentials::none())
            .dispatch(HttpMethod::Get, url(), Bytes::new(), extra, &RetryPolicy::none())
            .await
            .unwrap();

        assert_eq!(transport.seen.lock().unwrap()[0].headers[ACCEPT], "application/xml");
    }

    #[test]
    fn test_invalid_api_key() {
        let err = GatewayDispatcher::new(
            Arc::new(RecordingTransport::default()),
            Arc::new(StaticCredentials::none()),
            "bad\nkey",
        )
        .unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }
}
