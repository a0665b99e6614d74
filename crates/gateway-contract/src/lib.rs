//! # Gateway Contract
//!
//! Loads the gateway's published API contract (Swagger 2.0 or OpenAPI 3.x) once
//! and checks request bodies against it.
//!
//! ```no_run
//! use gateway_contract::{ContractStore, DefaultContractFetcher, RequestValidator};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> gateway_core::GatewayResult<()> {
//! let fetcher = DefaultContractFetcher::new(Duration::from_secs(10))?;
//! let uri = url::Url::parse("http://gateway.internal:8080/v2/swagger.json").unwrap();
//! let store = Arc::new(ContractStore::load(&fetcher, uri).await?);
//!
//! let validator = RequestValidator::new(store);
//! validator.ensure_valid("/pet", "post", r#"{"name":"doggie","photoUrls":[]}"#)?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod contract;
pub mod fetch;
pub mod schema;
pub mod store;
pub mod validator;

pub use contract::{Contract, ContractFormat, OperationKey};
pub use fetch::{ContractFetcher, DefaultContractFetcher, FileContractFetcher, HttpContractFetcher};
pub use schema::{JsonKind, OperationSchema, SchemaNode, StringFormat};
pub use store::ContractStore;
pub use validator::{diagnostic, parse_body, validate, RequestValidator, ValidationOutcome, Violation};
