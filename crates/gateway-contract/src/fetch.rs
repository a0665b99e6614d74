//! Contract retrieval.
//!
//! Fetching is a trait so the store can be fed from HTTP, the filesystem, or an
//! in-memory fake in tests.

use async_trait::async_trait;
use bytes::Bytes;
use gateway_core::{GatewayError, GatewayResult};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Retrieves the raw bytes of a contract document.
#[async_trait]
pub trait ContractFetcher: Send + Sync {
    /// Fetch the document at `uri`.
    async fn fetch(&self, uri: &Url) -> GatewayResult<Bytes>;
}

/// Fetches `http` and `https` contracts.
#[derive(Debug, Clone)]
pub struct HttpContractFetcher {
    http: reqwest::Client,
}

impl HttpContractFetcher {
    /// Create a fetcher with its own HTTP client.
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Reuse an existing HTTP client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ContractFetcher for HttpContractFetcher {
    #[instrument(skip(self), fields(uri = %uri))]
    async fn fetch(&self, uri: &Url) -> GatewayResult<Bytes> {
        let response = self
            .http
            .get(uri.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GatewayError::contract_unavailable(uri.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::contract_unavailable(
                uri.as_str(),
                format!("server responded with {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::contract_unavailable(uri.as_str(), e.to_string()))?;

        debug!(bytes = body.len(), "Contract fetched");
        Ok(body)
    }
}

/// Reads `file://` contracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileContractFetcher;

#[async_trait]
impl ContractFetcher for FileContractFetcher {
    #[instrument(skip(self), fields(uri = %uri))]
    async fn fetch(&self, uri: &Url) -> GatewayResult<Bytes> {
        let path = uri
            .to_file_path()
            .map_err(|()| GatewayError::contract_unavailable(uri.as_str(), "not a file path"))?;

        let contents = tokio::fs::read(&path)
            .await
            .map_err(|e| GatewayError::contract_unavailable(uri.as_str(), e.to_string()))?;

        debug!(bytes = contents.len(), "Contract read from disk");
        Ok(Bytes::from(contents))
    }
}

/// Dispatches on the URI scheme.
#[derive(Debug, Clone)]
pub struct DefaultContractFetcher {
    http: HttpContractFetcher,
    file: FileContractFetcher,
}

impl DefaultContractFetcher {
    /// Create a fetcher whose HTTP requests time out after `timeout`.
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        Ok(Self {
            http: HttpContractFetcher::new(timeout)?,
            file: FileContractFetcher,
        })
    }
}

#[async_trait]
impl ContractFetcher for DefaultContractFetcher {
    async fn fetch(&self, uri: &Url) -> GatewayResult<Bytes> {
        match uri.scheme() {
            "http" | "https" => self.http.fetch(uri).await,
            "file" => self.file.fetch(uri).await,
            other => Err(GatewayError::contract_unavailable(
                uri.as_str(),
                format!("unsupported scheme {other:?}"),
            )),
        }
    }
}
