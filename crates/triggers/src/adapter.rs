//! Contains the layered price adapter.
//!
//! Lookup order per symbol: local in-process cache (15 s TTL), the
//! collocated backend's cached price endpoint, then the oracle directly.
//! Whichever tier answers writes the local cache. Sources are tagged so a
//! reading downstream can tell where a quote came from: a local hit appends
//! `-cached`, the backend tier reports `backend-<inner>`, and the direct
//! tier reports `coingecko-direct`.

use crate::{BackendApi, BackendHealth, PriceError, PriceOracle};
use async_trait::async_trait;
use futures::future::join_all;
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// Freshness window of the in-process cache. An entry aged exactly at the
/// TTL is stale.
pub const LOCAL_CACHE_TTL: Duration = Duration::from_secs(15);

/// The source tag of the direct oracle tier.
const DIRECT_SOURCE: &str = "coingecko-direct";

/// Symbol shorthand accepted in trigger data, mapped to oracle asset ids.
/// Unknown symbols pass through unchanged.
const SYMBOL_TO_ORACLE_ID: &[(&str, &str)] = &[
    ("dot", "polkadot"),
    ("glmr", "moonbeam"),
    ("eth", "ethereum"),
    ("btc", "bitcoin"),
    ("astr", "astar"),
    ("matic", "polygon"),
];

/// Resolves a trigger symbol to its oracle asset id.
pub fn oracle_id(symbol: &str) -> &str {
    SYMBOL_TO_ORACLE_ID
        .iter()
        .find(|(short, _)| *short == symbol)
        .map_or(symbol, |(_, id)| id)
}

/// A priced asset quote with its provenance tag.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    /// The USD price.
    pub price: f64,
    /// Which tier produced the price.
    pub source: String,
}

/// The seam the price trigger evaluates against.
#[async_trait]
pub trait PriceSource {
    /// Returns the current USD price for a trigger symbol.
    async fn price_usd(&self, symbol: &str) -> Result<PriceQuote, PriceError>;
}

/// A cached quote with its fetch instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    price: f64,
    source: String,
    fetched_at: Instant,
}

impl CacheEntry {
    /// Entries age out strictly: `age < TTL` is fresh, `age == TTL` is not.
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.fetched_at) < LOCAL_CACHE_TTL
    }
}

/// The layered [PriceSource] implementation.
#[derive(Debug)]
pub struct PriceAdapter<O, B> {
    /// The direct oracle tier.
    oracle: O,
    /// The backend tier, absent when backend integration is disabled.
    backend: Option<B>,
    /// The in-process quote cache, keyed by lowercased symbol.
    cache: Mutex<HashMap<String, CacheEntry>>,
    /// Backend availability tracking.
    health: BackendHealth,
    /// The oracle asset ids this deployment supports.
    supported_assets: Vec<String>,
}

impl<O: PriceOracle + Sync, B: BackendApi + Sync> PriceAdapter<O, B> {
    /// Creates a new adapter. Passing `None` for `backend` disables the
    /// backend tier entirely.
    pub fn new(oracle: O, backend: Option<B>, supported_assets: Vec<String>) -> Self {
        Self {
            oracle,
            backend,
            cache: Mutex::new(HashMap::new()),
            health: BackendHealth::new(),
            supported_assets,
        }
    }

    /// The oracle asset ids this deployment supports.
    pub fn supported_assets(&self) -> &[String] {
        &self.supported_assets
    }

    /// Returns the backend availability tracker.
    pub const fn backend_health(&self) -> &BackendHealth {
        &self.health
    }

    /// Fetches prices for several symbols concurrently. Individual failures
    /// are logged and omitted from the returned map.
    pub async fn multiple_prices(&self, symbols: &[String]) -> HashMap<String, PriceQuote> {
        let lookups = symbols.iter().map(|symbol| async move {
            (symbol.clone(), self.price_usd(symbol).await)
        });
        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(symbol, result)| match result {
                Ok(quote) => Some((symbol, quote)),
                Err(e) => {
                    warn!(target: "price_adapter", symbol = %symbol, "Price lookup failed: {e}");
                    None
                }
            })
            .collect()
    }

    /// Returns true if the backend tier should be consulted, probing its
    /// health endpoint when the state machine calls for it.
    async fn backend_ready(&self, backend: &B) -> bool {
        if self.health.needs_probe() {
            if backend.health_check().await {
                self.health.mark_healthy();
            } else {
                self.health.mark_unhealthy();
            }
        }
        matches!(self.health.state(), crate::BackendState::Healthy)
    }

    /// Looks up the local cache tier.
    fn cached(&self, key: &str) -> Option<PriceQuote> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = cache.get(key)?;
        entry.is_fresh(Instant::now()).then(|| PriceQuote {
            price: entry.price,
            source: format!("{}-cached", entry.source),
        })
    }

    /// Writes a fresh quote into the local cache.
    fn store(&self, key: String, quote: &PriceQuote) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).insert(
            key,
            CacheEntry {
                price: quote.price,
                source: quote.source.clone(),
                fetched_at: Instant::now(),
            },
        );
    }

    #[cfg(test)]
    pub(crate) fn seed_cache(&self, key: &str, price: f64, source: &str, age: Duration) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).insert(
            key.to_string(),
            CacheEntry {
                price,
                source: source.to_string(),
                fetched_at: Instant::now() - age,
            },
        );
    }
}

#[async_trait]
impl<O: PriceOracle + Sync, B: BackendApi + Sync> PriceSource for PriceAdapter<O, B> {
    async fn price_usd(&self, symbol: &str) -> Result<PriceQuote, PriceError> {
        let key = symbol.to_lowercase();

        if let Some(quote) = self.cached(&key) {
            debug!(target: "price_adapter", symbol = %key, price = quote.price, "Local cache hit");
            return Ok(quote);
        }

        let id = oracle_id(&key);

        let mut quote = None;
        if let Some(backend) = &self.backend {
            if self.backend_ready(backend).await {
                match backend.price(id).await {
                    Ok(inner) => {
                        info!(target: "price_adapter", symbol = %key, price = inner.price, "Price from backend");
                        quote = Some(PriceQuote {
                            price: inner.price,
                            source: format!("backend-{}", inner.source),
                        });
                    }
                    Err(e) => {
                        warn!(target: "price_adapter", symbol = %key, "Backend price fetch failed: {e}, falling back");
                        self.health.mark_unhealthy();
                    }
                }
            }
        }

        let quote = match quote {
            Some(quote) => quote,
            None => {
                let price = self.oracle.fetch_usd(id).await?;
                info!(target: "price_adapter", symbol = %key, price, "Price from direct oracle");
                PriceQuote { price, source: DIRECT_SOURCE.to_string() }
            }
        };

        self.store(key, &quote);
        Ok(quote)
    }
}
