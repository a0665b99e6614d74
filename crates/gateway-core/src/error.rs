//! Error types for the gateway client.
//!
//! Every layer (contract loading, validation, dispatch) reports failures through
//! [`GatewayError`] so callers only ever match on one taxonomy.

use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by the gateway client.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The contract document could not be retrieved.
    #[error("Contract unavailable at {uri}: {message}")]
    ContractUnavailable {
        /// Location the contract was fetched from.
        uri: String,
        /// What went wrong.
        message: String,
    },

    /// The contract document was retrieved but is not a usable contract.
    #[error("Malformed contract: {message}")]
    ContractMalformed {
        /// What is wrong with the document.
        message: String,
    },

    /// No operation in the contract matches the requested path and method.
    #[error("No operation defined for {method} {path}")]
    OperationNotFound {
        /// Requested path, concrete or template.
        path: String,
        /// Requested method, as supplied by the caller.
        method: String,
    },

    /// The caller-supplied body is not syntactically valid JSON.
    #[error("Malformed request body: {message}")]
    MalformedRequestBody {
        /// Parser diagnostic.
        message: String,
    },

    /// The body does not conform to the operation schema.
    ///
    /// The display form is the diagnostic itself, so existing callers that
    /// compare messages keep working.
    #[error("{diagnostic}")]
    ValidationFailed {
        /// Full multi-line diagnostic, one violation per line.
        diagnostic: String,
    },

    /// The gateway could not be reached at all.
    #[error("Transport unavailable: {message}")]
    TransportUnavailable {
        /// What went wrong.
        message: String,
        /// Underlying transport error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Client configuration is unusable.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Internal client error.
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl GatewayError {
    /// Create a contract unavailable error
    pub fn contract_unavailable(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ContractUnavailable {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Create a malformed contract error
    pub fn contract_malformed(message: impl Into<String>) -> Self {
        Self::ContractMalformed {
            message: message.into(),
        }
    }

    /// Create an operation not found error
    pub fn operation_not_found(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self::OperationNotFound {
            path: path.into(),
            method: method.into(),
        }
    }

    /// Create a malformed request body error
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::MalformedRequestBody {
            message: message.into(),
        }
    }

    /// Create a validation failure carrying the full diagnostic
    pub fn validation_failed(diagnostic: impl Into<String>) -> Self {
        Self::ValidationFailed {
            diagnostic: diagnostic.into(),
        }
    }

    /// Create a transport unavailable error without an underlying source
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport unavailable error wrapping the transport's own error
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TransportUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if the error was caused by the caller's input rather than the
    /// contract, the configuration or the network.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::OperationNotFound { .. }
                | Self::MalformedRequestBody { .. }
                | Self::ValidationFailed { .. }
        )
    }

    /// Check if the error prevents the client from being constructed at all.
    pub fn is_contract_error(&self) -> bool {
        matches!(
            self,
            Self::ContractUnavailable { .. } | Self::ContractMalformed { .. }
        )
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ContractUnavailable { .. } => "contract_unavailable",
            Self::ContractMalformed { .. } => "contract_malformed",
            Self::OperationNotFound { .. } => "operation_not_found",
            Self::MalformedRequestBody { .. } => "malformed_request_body",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::TransportUnavailable { .. } => "transport_unavailable",
            Self::Configuration { .. } => "configuration",
            Self::Internal { .. } => "internal",
        }
    }
}
