//! This module contains all CLI-specific code.

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{anyhow, bail, Result};
use clap::{ArgAction, Parser, Subcommand};
use reqwest::Url;
use std::path::PathBuf;

/// The engine binary CLI application arguments. Everything except the mode
/// and verbosity is sourced from the environment.
#[derive(Parser, Clone, Debug)]
#[command(version, about = "Off-chain workflow automation engine")]
pub struct Cli {
    /// Verbosity level (0-4)
    #[arg(long, short, help = "Verbosity level (0-4)", action = ArgAction::Count)]
    pub v: u8,
    /// Which process to run.
    #[command(subcommand)]
    pub mode: Mode,
    /// Shared configuration.
    #[command(flatten)]
    pub args: GlobalArgs,
}

/// The process mode.
#[derive(Subcommand, Clone, Copy, Debug)]
pub enum Mode {
    /// Scan workflows and enqueue ready ones.
    Scheduler,
    /// Execute workflows from the queue.
    Worker,
}

/// Environment-sourced configuration shared by both modes.
#[derive(clap::Args, Clone, Debug)]
pub struct GlobalArgs {
    /// The chain RPC endpoint.
    #[arg(
        long,
        env = "MOONBASE_RPC",
        default_value = "https://rpc.api.moonbase.moonbeam.network"
    )]
    pub rpc_url: String,
    /// The chain id baked into signed transactions.
    #[arg(long, env = "CHAIN_ID", default_value_t = 1287)]
    pub chain_id: u64,
    /// The workflow registry contract address.
    #[arg(long, env = "WORKFLOW_REGISTRY_ADDRESS")]
    pub registry_address: Option<String>,
    /// The action executor contract address.
    #[arg(long, env = "ACTION_EXECUTOR_ADDRESS")]
    pub executor_address: Option<String>,
    /// The fee escrow contract address.
    #[arg(long, env = "FEE_ESCROW_ADDRESS")]
    pub escrow_address: Option<String>,
    /// The worker's signing key.
    #[arg(long, env = "WORKER_PRIVATE_KEY", hide_env_values = true)]
    pub worker_private_key: Option<String>,
    /// Fallback signing key name used by older deployments.
    #[arg(long, env = "RELAYER_PRIVATE_KEY", hide_env_values = true)]
    pub relayer_private_key: Option<String>,
    /// The queue broker URL.
    #[arg(long, env = "REDIS_URL", default_value = "redis://localhost:6379/0")]
    pub redis_url: String,
    /// TTL of the collocated backend's remote price cache. Consumed by the
    /// backend process; accepted here so one environment file serves both.
    #[arg(long, env = "REDIS_CACHE_TTL", default_value_t = 30)]
    pub redis_cache_ttl: u64,
    /// The price oracle simple-price endpoint.
    #[arg(
        long,
        env = "PRICE_FEED_URL",
        default_value = "https://api.coingecko.com/api/v3/simple/price"
    )]
    pub price_feed_url: String,
    /// Oracle asset ids this deployment supports.
    #[arg(
        long,
        env = "SUPPORTED_ASSETS",
        value_delimiter = ',',
        default_value = "ethereum,bitcoin,moonbeam,polkadot,uniswap,chainlink,aave"
    )]
    pub supported_assets: Vec<String>,
    /// The collocated backend API base URL.
    #[arg(long, env = "BACKEND_API_URL", default_value = "http://localhost:8000")]
    pub backend_api_url: String,
    /// Whether to use the backend price tier.
    #[arg(
        long,
        env = "USE_BACKEND_INTEGRATION",
        action = ArgAction::Set,
        default_value_t = true
    )]
    pub use_backend_integration: bool,
    /// Seconds between scheduler sweeps.
    #[arg(long, env = "POLL_INTERVAL", default_value_t = 10)]
    pub poll_interval: u64,
    /// Concurrent trigger evaluations per sweep.
    #[arg(long, env = "MAX_CONCURRENT_EXECUTIONS", default_value_t = 3)]
    pub max_concurrent_executions: usize,
    /// Data directory of the execution history store. History is disabled
    /// when unset.
    #[arg(long, env = "HISTORY_DIR")]
    pub history_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Returns the parsed RPC URL.
    pub fn rpc_url(&self) -> Result<Url> {
        Url::parse(&self.rpc_url).map_err(|e| anyhow!(e))
    }

    /// Returns the registry contract address, required in scheduler mode.
    pub fn registry_address(&self) -> Result<Address> {
        parse_address(self.registry_address.as_deref(), "WORKFLOW_REGISTRY_ADDRESS")
    }

    /// Returns the executor contract address, required in worker mode.
    pub fn executor_address(&self) -> Result<Address> {
        parse_address(self.executor_address.as_deref(), "ACTION_EXECUTOR_ADDRESS")
    }

    /// Returns the escrow contract address, required in worker mode.
    pub fn escrow_address(&self) -> Result<Address> {
        parse_address(self.escrow_address.as_deref(), "FEE_ESCROW_ADDRESS")
    }

    /// Returns the signing key, preferring `WORKER_PRIVATE_KEY` over the
    /// legacy `RELAYER_PRIVATE_KEY` name. Required in worker mode.
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        let raw = self
            .worker_private_key
            .as_deref()
            .or(self.relayer_private_key.as_deref())
            .ok_or_else(|| anyhow!("WORKER_PRIVATE_KEY not set"))?;
        raw.parse().map_err(|e| anyhow!("Invalid worker private key: {e}"))
    }
}

fn parse_address(raw: Option<&str>, name: &str) -> Result<Address> {
    let Some(raw) = raw else {
        bail!("{name} not set");
    };
    raw.parse().map_err(|e| anyhow!("Invalid {name}: {e}"))
}
