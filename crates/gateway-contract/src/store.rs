//! Loaded-once contract store.

use crate::contract::{Contract, OperationKey};
use crate::fetch::ContractFetcher;
use crate::schema::OperationSchema;
use gateway_core::GatewayResult;
use tracing::{info, instrument};
use url::Url;

/// Holds the contract for the lifetime of a client.
///
/// The document is fetched exactly once, in [`ContractStore::load`]. After that
/// the store is read-only and can be shared freely across tasks.
#[derive(Debug, Clone)]
pub struct ContractStore {
    uri: Url,
    contract: Contract,
}

impl ContractStore {
    /// Fetch and parse the contract at `uri`.
    #[instrument(skip(fetcher), fields(uri = %uri))]
    pub async fn load(fetcher: &dyn ContractFetcher, uri: Url) -> GatewayResult<Self> {
        let bytes = fetcher.fetch(&uri).await?;
        let contract = Contract::from_slice(&bytes)?;

        info!(
            base_path = %contract.base_path(),
            operations = contract.len(),
            "Contract loaded"
        );

        Ok(Self { uri, contract })
    }

    /// Wrap an already parsed contract.
    pub fn from_contract(uri: Url, contract: Contract) -> Self {
        Self { uri, contract }
    }

    /// Where the contract came from.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The parsed contract.
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Base path of the contract.
    pub fn base_path(&self) -> &str {
        self.contract.base_path()
    }

    /// Operation matching a concrete request path; see [`Contract::resolve`].
    pub fn resolve(
        &self,
        path: &str,
        method: &str,
    ) -> GatewayResult<(&OperationKey, &OperationSchema)> {
        self.contract.resolve(path, method)
    }

    /// Request-body schema for an operation; the method is matched in any case.
    pub fn schema_for(&self, path: &str, method: &str) -> GatewayResult<&OperationSchema> {
        self.contract.schema_for(path, method)
    }
}
