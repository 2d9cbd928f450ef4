//! Contains the collocated backend API tier.
//!
//! The backend fronts the same oracle with its own remote cache (30 s TTL),
//! so a healthy backend saves direct oracle traffic across processes.

use crate::{PriceError, PriceQuote};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// The backend health endpoint path.
const HEALTHZ_PATH: &str = "api/utils/healthz";
/// The backend price endpoint path prefix.
const PRICE_PATH: &str = "api/price";

/// Per-request timeout for backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Connect timeout for backend calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The slice of the backend API the engine consumes.
#[async_trait]
pub trait BackendApi {
    /// Returns true if the backend reports itself healthy.
    async fn health_check(&self) -> bool;

    /// Fetches the current USD price for the given oracle asset id.
    async fn price(&self, id: &str) -> Result<PriceQuote, PriceError>;
}

/// Health endpoint payload.
#[derive(Debug, serde::Deserialize)]
struct HealthResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    status: String,
}

/// Price endpoint payload.
#[derive(Debug, serde::Deserialize)]
struct PriceResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    price_usd: Option<f64>,
}

/// An online [BackendApi] client.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// The backend base URL.
    base: String,
    /// The inner reqwest client.
    inner: Client,
}

impl BackendClient {
    /// Creates a new [BackendClient] for the backend at `base`.
    pub fn new(base: String) -> Result<Self, PriceError> {
        let inner = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| PriceError::Http(e.to_string()))?;
        Ok(Self { base: base.trim_end_matches('/').to_string(), inner })
    }
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn health_check(&self) -> bool {
        let url = format!("{}/{}", self.base, HEALTHZ_PATH);
        let response = match self.inner.get(&url).send().await.and_then(|r| r.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                debug!(target: "backend_client", "Health check failed: {e}");
                return false;
            }
        };
        match response.json::<HealthResponse>().await {
            Ok(health) => health.success && health.status == "healthy",
            Err(e) => {
                debug!(target: "backend_client", "Health check decode failed: {e}");
                false
            }
        }
    }

    async fn price(&self, id: &str) -> Result<PriceQuote, PriceError> {
        let url = format!("{}/{}/{}", self.base, PRICE_PATH, id);
        let response = self
            .inner
            .get(&url)
            .send()
            .await
            .map_err(|e| PriceError::Backend(e.to_string()))?
            .error_for_status()
            .map_err(|e| PriceError::Backend(e.to_string()))?;
        let payload: PriceResponse =
            response.json().await.map_err(|e| PriceError::Backend(e.to_string()))?;
        match (payload.success, payload.price_usd) {
            (true, Some(price)) => Ok(PriceQuote { price, source: "cache".to_string() }),
            _ => Err(PriceError::Backend(format!("unsuccessful price lookup for {id}"))),
        }
    }
}
