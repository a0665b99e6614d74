//! Client facade for the Business Fabric gateway.

use crate::credentials::{CredentialProvider, StaticCredentials};
use crate::dispatcher::GatewayDispatcher;
use crate::endpoint::Endpoints;
use crate::transport::{ReqwestTransport, Transport};
use bytes::Bytes;
use gateway_config::GatewayConfig;
use gateway_contract::{
    Contract, ContractFetcher, ContractStore, DefaultContractFetcher, OperationSchema,
    RequestValidator, ValidationOutcome,
};
use gateway_core::{GatewayError, GatewayResponse, GatewayResult, HttpMethod};
use gateway_resilience::RetryPolicy;
use http::HeaderMap;
use std::future::Future;
use std::sync::Arc;
use tracing::instrument::WithSubscriber;
use tracing::{debug, instrument, Dispatch};
use url::Url;

/// How [`Client::get_request_schema`] should return the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaFormat {
    /// The schema value itself.
    #[default]
    Value,
    /// Compact JSON text.
    Json,
    /// Pretty-printed JSON text.
    PrettyJson,
}

impl SchemaFormat {
    /// Map the `as_json` / `pretty` flag pair.
    pub fn from_flags(as_json: bool, pretty: bool) -> Self {
        match (as_json, pretty) {
            (false, _) => Self::Value,
            (true, false) => Self::Json,
            (true, true) => Self::PrettyJson,
        }
    }
}

/// A request-body schema, either as a value or as JSON text.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestSchema<'a> {
    /// The schema value.
    Schema(&'a OperationSchema),
    /// Serialized schema.
    Json(String),
}

/// Client for the Business Fabric gateway.
///
/// Construction fetches the gateway's contract once; afterwards every
/// operation is an in-memory lookup except [`Client::send_request`]. The client
/// is cheap to clone and safe to share across tasks.
///
/// # Example
///
/// ```rust,no_run
/// use gateway_sdk::Client;
///
/// #[tokio::main]
/// async fn main() -> Result<(), gateway_core::GatewayError> {
///     let client = Client::from_default_config().await?;
///
///     let body = r#"{"id":12,"name":"doggie","photoUrls":["string"]}"#;
///     let response = client.send_request("/pet", "post", body).await?;
///
///     println!("{} {}", response.status_code(), response.text());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    config: Arc<GatewayConfig>,
    endpoints: Arc<Endpoints>,
    store: Arc<ContractStore>,
    validator: RequestValidator,
    dispatcher: GatewayDispatcher,
    retry_policy: RetryPolicy,
    logger: Option<Dispatch>,
}

impl Client {
    /// Create a new client builder.
    pub fn builder(config: GatewayConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Build a client from configuration with default collaborators.
    pub async fn from_config(config: GatewayConfig) -> GatewayResult<Self> {
        ClientBuilder::new(config).build().await
    }

    /// Load configuration from the default locations and build a client.
    pub async fn from_default_config() -> GatewayResult<Self> {
        let config = gateway_config::load_config()
            .await
            .map_err(|e| GatewayError::configuration(e.to_string()))?;
        Self::from_config(config).await
    }

    /// Get the client configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Resolved gateway locations.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// The loaded contract.
    pub fn contract(&self) -> &Contract {
        self.store.contract()
    }

    /// Check a request body and return `true` if it conforms.
    ///
    /// A non-conforming body is an error: `ValidationFailed`, whose message is
    /// `Failed asserting that <body> is a valid request body.` followed by one
    /// `[field] reason` line per violation.
    pub fn validate(&self, path: &str, method: &str, body: &str) -> GatewayResult<bool> {
        self.with_logger(|| {
            debug!(path, method, "Method: validate");
            self.validator.ensure_valid(path, method, body)?;
            Ok(true)
        })
    }

    /// Check a request body and return the structured outcome.
    pub fn check(&self, path: &str, method: &str, body: &str) -> GatewayResult<ValidationOutcome> {
        self.with_logger(|| self.validator.check(path, method, body))
    }

    /// Request-body schema for an operation, looked up by its exact path template.
    pub fn request_schema(&self, path: &str, method: &str) -> GatewayResult<&OperationSchema> {
        self.store.schema_for(path, method)
    }

    /// Request-body schema as compact or pretty JSON text.
    pub fn request_schema_json(&self, path: &str, method: &str, pretty: bool) -> GatewayResult<String> {
        self.request_schema(path, method)?.to_json(pretty)
    }

    /// Request-body schema in the requested form.
    pub fn get_request_schema(
        &self,
        path: &str,
        method: &str,
        format: SchemaFormat,
    ) -> GatewayResult<RequestSchema<'_>> {
        let schema = self.request_schema(path, method)?;
        Ok(match format {
            SchemaFormat::Value => RequestSchema::Schema(schema),
            SchemaFormat::Json => RequestSchema::Json(schema.to_json(false)?),
            SchemaFormat::PrettyJson => RequestSchema::Json(schema.to_json(true)?),
        })
    }

    /// Validate and send a request.
    ///
    /// `path` is the concrete request path, e.g. `/pet/42`; it is matched
    /// against the contract's path templates for validation and sent as given.
    /// Nothing is sent if validation fails. The gateway's response is returned
    /// as-is, whatever its status; `503` responses are retried per the client's
    /// retry policy first.
    pub async fn send_request(
        &self,
        path: &str,
        method: &str,
        body: &str,
    ) -> GatewayResult<GatewayResponse> {
        self.send_request_with_headers(path, method, body, HeaderMap::new())
            .await
    }

    /// Like [`Client::send_request`], with extra headers that replace the
    /// defaults of the same name.
    pub async fn send_request_with_headers(
        &self,
        path: &str,
        method: &str,
        body: &str,
        headers: HeaderMap,
    ) -> GatewayResult<GatewayResponse> {
        self.with_logger_async(self.send_inner(path, method, body, headers))
            .await
    }

    #[instrument(skip(self, body, headers))]
    async fn send_inner(
        &self,
        path: &str,
        method: &str,
        body: &str,
        headers: HeaderMap,
    ) -> GatewayResult<GatewayResponse> {
        debug!("Method: send_request");

        self.validator.ensure_valid(path, method, body)?;

        let http_method: HttpMethod = method
            .parse()
            .map_err(|_| GatewayError::operation_not_found(path, method))?;
        let url = self.endpoints.request_url(self.store.base_path(), path)?;

        self.dispatcher
            .dispatch(
                http_method,
                url,
                Bytes::copy_from_slice(body.as_bytes()),
                headers,
                &self.retry_policy,
            )
            .await
    }

    fn with_logger<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.logger {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }

    async fn with_logger_async<F: Future>(&self, fut: F) -> F::Output {
        match &self.logger {
            Some(dispatch) => fut.with_subscriber(dispatch.clone()).await,
            None => fut.await,
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("contract_uri", &self.endpoints.contract_uri().as_str())
            .field("base_url", &self.endpoints.base_url().as_str())
            .field("operations", &self.store.contract().len())
            .finish_non_exhaustive()
    }
}

/// Builder for creating a Client.
///
/// Every collaborator has a default derived from the configuration; tests and
/// embedding applications replace the ones they care about.
pub struct ClientBuilder {
    config: GatewayConfig,
    transport: Option<Arc<dyn Transport>>,
    contract_fetcher: Option<Arc<dyn ContractFetcher>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    retry_policy: Option<RetryPolicy>,
    logger: Option<Dispatch>,
    contract_uri: Option<Url>,
}

impl ClientBuilder {
    /// Create a new client builder.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            transport: None,
            contract_fetcher: None,
            credentials: None,
            retry_policy: None,
            logger: None,
            contract_uri: None,
        }
    }

    /// Send requests through this transport.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Fetch the contract with this fetcher.
    #[must_use]
    pub fn contract_fetcher(mut self, fetcher: impl ContractFetcher + 'static) -> Self {
        self.contract_fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Supply bearer tokens from this provider instead of the configuration.
    #[must_use]
    pub fn credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Replace the retry policy derived from `[bfclient]`.
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Send the client's log events to this subscriber instead of the global one.
    #[must_use]
    pub fn logger(mut self, logger: Dispatch) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Load the contract from here instead of the configured gateway.
    #[must_use]
    pub fn contract_uri(mut self, uri: Url) -> Self {
        self.contract_uri = Some(uri);
        self
    }

    /// Fetch the contract and build the client.
    pub async fn build(self) -> GatewayResult<Client> {
        let settings = &self.config.bfclient;

        let mut endpoints = Endpoints::from_config(&self.config.api_gateway)?;
        if let Some(uri) = self.contract_uri {
            endpoints = Endpoints::new(uri, endpoints.base_url().clone());
        }

        let retry_policy = self
            .retry_policy
            .unwrap_or_else(|| RetryPolicy::fixed(settings.max_retries, settings.retry_delay()));

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(settings.timeout, settings.connect_timeout)?
                    .with_tracing(settings.debug),
            ),
        };

        let fetcher = match self.contract_fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(DefaultContractFetcher::new(settings.timeout)?),
        };

        let credentials = self.credentials.unwrap_or_else(|| {
            Arc::new(StaticCredentials::from_config(&self.config.api_gateway))
        });

        let load = ContractStore::load(fetcher.as_ref(), endpoints.contract_uri().clone());
        let store = match &self.logger {
            Some(dispatch) => load.with_subscriber(dispatch.clone()).await,
            None => load.await,
        }?;
        let store = Arc::new(store);

        let dispatcher =
            GatewayDispatcher::new(transport, credentials, self.config.api_gateway.apikey_value())?;

        Ok(Client {
            config: Arc::new(self.config),
            endpoints: Arc::new(endpoints),
            validator: RequestValidator::new(Arc::clone(&store)),
            store,
            dispatcher,
            retry_policy,
            logger: self.logger,
        })
    }
}
