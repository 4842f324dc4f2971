use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::model::common::{AssetRef, Identity};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("No balance oracle is configured")]
    Unconfigured,
    #[error("Oracle URL cannot have path segments appended: {0}")]
    BadBaseUrl(Url),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Reports how much of an asset an identity holds.
#[rocket::async_trait]
pub trait BalanceOracle: Send + Sync {
    async fn balance_of(&self, holder: &Identity, asset: &AssetRef) -> Result<u64, OracleError>;
}

/// The oracle in managed state.
pub type SharedOracle = Arc<dyn BalanceOracle>;

/// Queries `GET {base}/balances/{asset}/{holder}`, expecting `{"balance": n}`.
pub struct HttpOracle {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct BalanceResponse {
    balance: u64,
}

impl HttpOracle {
    /// Each query, including connecting, must finish within `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, OracleError> {
        if base_url.cannot_be_a_base() {
            return Err(OracleError::BadBaseUrl(base_url));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn balance_url(&self, holder: &Identity, asset: &AssetRef) -> Result<Url, OracleError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| OracleError::BadBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["balances", &asset.0, holder.as_str()]);
        Ok(url)
    }
}

#[rocket::async_trait]
impl BalanceOracle for HttpOracle {
    async fn balance_of(&self, holder: &Identity, asset: &AssetRef) -> Result<u64, OracleError> {
        let url = self.balance_url(holder, asset)?;
        debug!("Querying balance oracle at {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<BalanceResponse>()
            .await?;
        Ok(response.balance)
    }
}

/// Stands in when no oracle URL is configured: every query fails.
pub struct UnconfiguredOracle;

#[rocket::async_trait]
impl BalanceOracle for UnconfiguredOracle {
    async fn balance_of(&self, _holder: &Identity, _asset: &AssetRef) -> Result<u64, OracleError> {
        Err(OracleError::Unconfigured)
    }
}

/// An in-memory balance table. Unknown holdings are zero.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    balances: Arc<RwLock<HashMap<(AssetRef, Identity), u64>>>,
}

impl StaticOracle {
    pub fn set_balance(&self, holder: &Identity, asset: &AssetRef, balance: u64) {
        self.balances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((asset.clone(), holder.clone()), balance);
    }
}

#[rocket::async_trait]
impl BalanceOracle for StaticOracle {
    async fn balance_of(&self, holder: &Identity, asset: &AssetRef) -> Result<u64, OracleError> {
        let balances = self.balances.read().unwrap_or_else(PoisonError::into_inner);
        Ok(balances
            .get(&(asset.clone(), holder.clone()))
            .copied()
            .unwrap_or_default())
    }
}
