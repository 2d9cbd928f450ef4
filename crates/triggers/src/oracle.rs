//! Contains the direct price oracle tier.

use crate::PriceError;
use async_trait::async_trait;
use reqwest::Client;
use std::{collections::HashMap, time::Duration};

/// Per-request timeout for oracle calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Connect timeout for oracle calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A USD price feed, keyed by oracle asset id (e.g. `ethereum`).
#[async_trait]
pub trait PriceOracle {
    /// Fetches the current USD price for the given asset id.
    async fn fetch_usd(&self, id: &str) -> Result<f64, PriceError>;
}

/// An online [PriceOracle] over the CoinGecko simple-price API (or any
/// endpoint speaking the same shape).
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    /// The simple-price endpoint URL.
    base: String,
    /// The inner reqwest client.
    inner: Client,
}

impl CoinGeckoClient {
    /// Creates a new [CoinGeckoClient] for the given endpoint.
    pub fn new(base: String) -> Result<Self, PriceError> {
        let inner = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| PriceError::Http(e.to_string()))?;
        Ok(Self { base, inner })
    }
}

#[async_trait]
impl PriceOracle for CoinGeckoClient {
    async fn fetch_usd(&self, id: &str) -> Result<f64, PriceError> {
        let response = self
            .inner
            .get(&self.base)
            .query(&[("ids", id), ("vs_currencies", "usd")])
            .send()
            .await
            .map_err(|e| PriceError::Oracle(e.to_string()))?
            .error_for_status()
            .map_err(|e| PriceError::Oracle(e.to_string()))?;
        let data: HashMap<String, HashMap<String, f64>> =
            response.json().await.map_err(|e| PriceError::Oracle(e.to_string()))?;
        data.get(id)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .ok_or_else(|| PriceError::MissingPrice(id.to_string()))
    }
}
