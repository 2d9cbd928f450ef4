#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations, missing_docs, rustdoc::all)]
#![deny(unused_must_use, rust_2018_idioms)]

use crate::cli::{Cli, GlobalArgs, Mode};
use alloy_provider::ReqwestProvider;
use anyhow::Result;
use chainflow_executor::{DiskHistoryStore, EvmSigner, JobWorker, WorkflowExecutor};
use chainflow_providers::{EscrowGateway, LogScanner, RegistryGateway};
use chainflow_queue::RedisJobQueue;
use chainflow_scheduler::Scheduler;
use chainflow_triggers::{BackendApi, BackendClient, CoinGeckoClient, PriceAdapter, TriggerSet};
use clap::Parser;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{error, info, warn};

mod cli;
mod metrics;
mod telemetry;

const METRICS_SERVER_ADDR: &str = "127.0.0.1:9090";
const LOG_TARGET: &str = "chainflow";

#[actix_web::main]
async fn main() -> Result<()> {
    let cfg = Cli::parse();
    telemetry::init(cfg.v)?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(target: LOG_TARGET, "Interrupt received, finishing current work");
                running.store(false, Ordering::Relaxed);
            }
        });
    }

    let handle = match cfg.mode {
        Mode::Scheduler => tokio::spawn(run_scheduler(cfg.args, running)),
        Mode::Worker => tokio::spawn(run_worker(cfg.args, running)),
    };

    tokio::select! {
        res = metrics::serve_metrics(METRICS_SERVER_ADDR) => {
            error!(target: LOG_TARGET, "Metrics server failed: {:?}", res);
            res
        }
        val = handle => {
            val??;
            info!(target: LOG_TARGET, "Exiting");
            Ok(())
        }
    }
}

/// Logs the backend's health at startup so an operator sees immediately
/// which price tier the process will lean on.
async fn log_backend_health(args: &GlobalArgs) -> Result<()> {
    if !args.use_backend_integration {
        info!(target: LOG_TARGET, "Backend integration disabled");
        return Ok(());
    }
    let backend = BackendClient::new(args.backend_api_url.clone())?;
    if backend.health_check().await {
        info!(target: LOG_TARGET, url = %args.backend_api_url, "Backend is healthy");
    } else {
        warn!(
            target: LOG_TARGET,
            url = %args.backend_api_url,
            "Backend unavailable, will fall back to direct oracle fetches"
        );
    }
    Ok(())
}

/// Runs the scheduler process: scan, evaluate, enqueue.
async fn run_scheduler(args: GlobalArgs, running: Arc<AtomicBool>) -> Result<()> {
    info!(target: LOG_TARGET, "Starting workflow scheduler");
    log_backend_health(&args).await?;

    let provider = ReqwestProvider::new_http(args.rpc_url()?);
    let registry = RegistryGateway::new(provider.clone(), args.registry_address()?);

    let oracle = CoinGeckoClient::new(args.price_feed_url.clone())?;
    let backend = if args.use_backend_integration {
        Some(BackendClient::new(args.backend_api_url.clone())?)
    } else {
        None
    };
    let adapter = PriceAdapter::new(oracle, backend, args.supported_assets.clone());
    info!(
        target: LOG_TARGET,
        assets = adapter.supported_assets().len(),
        "Price adapter initialized"
    );
    let evaluator = TriggerSet::new(adapter, LogScanner::new(provider));

    let queue = RedisJobQueue::connect(&args.redis_url).await?;
    info!(target: LOG_TARGET, url = %args.redis_url, "Connected to queue broker");

    let scheduler = Scheduler::new(
        registry,
        evaluator,
        queue,
        Duration::from_secs(args.poll_interval),
        args.max_concurrent_executions,
        running,
    );
    scheduler.run().await;
    Ok(())
}

/// Runs the worker process: pop, preflight, execute.
async fn run_worker(args: GlobalArgs, running: Arc<AtomicBool>) -> Result<()> {
    info!(target: LOG_TARGET, "Starting job worker");
    log_backend_health(&args).await?;

    let provider = ReqwestProvider::new_http(args.rpc_url()?);
    let signer =
        EvmSigner::new(provider.clone(), args.signer()?, args.executor_address()?, args.chain_id);
    info!(target: LOG_TARGET, address = %signer.signer_address(), "Worker signer loaded");

    let escrow = EscrowGateway::new(provider, args.escrow_address()?);
    let queue = RedisJobQueue::connect(&args.redis_url).await?;
    info!(target: LOG_TARGET, url = %args.redis_url, "Connected to queue broker");

    let mut worker = JobWorker::new(queue, escrow, signer, running);
    if let Some(dir) = &args.history_dir {
        worker = worker.with_history(Box::new(DiskHistoryStore::open(dir.clone())?));
        info!(target: LOG_TARGET, dir = %dir.display(), "Execution history enabled");
    }
    worker.run().await;
    Ok(())
}
