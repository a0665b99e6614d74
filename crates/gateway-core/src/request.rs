//! Request types for the gateway.
//!
//! A [`GatewayRequest`] is built once per dispatch and handed to the transport
//! by reference, so a retried attempt resends exactly the same bytes and headers.

use crate::types::CorrelationId;
use bytes::Bytes;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// HTTP methods an operation can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// All methods, in the order contract documents conventionally list them.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Lowercase name, as used for operation keys in contract documents.
    #[must_use]
    pub fn as_lowercase(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }

    /// Uppercase name, as sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Parses a method name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Post => Self::POST,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Options => Self::OPTIONS,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Trace => Self::TRACE,
        }
    }
}

/// A fully composed outbound request.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: Url,
    /// Serialized JSON body.
    pub body: Bytes,
    /// Headers, including the correlation header.
    pub headers: HeaderMap,
    /// Correlation identifier attached to this request.
    pub correlation_id: CorrelationId,
}

impl GatewayRequest {
    /// Create a new builder for `GatewayRequest`
    #[must_use]
    pub fn builder(method: HttpMethod, url: Url) -> GatewayRequestBuilder {
        GatewayRequestBuilder::new(method, url)
    }
}

/// Builder for [`GatewayRequest`].
#[derive(Debug)]
pub struct GatewayRequestBuilder {
    method: HttpMethod,
    url: Url,
    body: Bytes,
    headers: HeaderMap,
    correlation_id: Option<CorrelationId>,
}

impl GatewayRequestBuilder {
    fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            body: Bytes::new(),
            headers: HeaderMap::new(),
            correlation_id: None,
        }
    }

    /// Set the body
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Merge headers; later values replace earlier ones with the same name
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Use a specific correlation id instead of generating one
    #[must_use]
    pub fn correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Build the request, generating a correlation id if none was set and
    /// attaching it as the correlation header.
    #[must_use]
    pub fn build(self) -> GatewayRequest {
        let correlation_id = self.correlation_id.unwrap_or_else(CorrelationId::generate);
        let mut headers = self.headers;
        headers.insert(
            http::HeaderName::from_static(crate::types::CORRELATION_HEADER),
            correlation_id.header_value(),
        );

        GatewayRequest {
            method: self.method,
            url: self.url,
            body: self.body,
            headers,
            correlation_id,
        }
    }
}
