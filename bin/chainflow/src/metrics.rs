//! Metrics endpoint for the engine binary. The counters themselves live in
//! the scheduler and executor crates and register against the default
//! prometheus registry.

use actix_web::{get, App, HttpServer, Responder};
use anyhow::Result;
use prometheus::{Encoder, TextEncoder};

/// Starts the metrics server.
pub async fn serve_metrics(bind: &str) -> Result<()> {
    let _ = HttpServer::new(|| App::new().service(index).service(metrics))
        .bind(bind)
        .map_err(|e| anyhow::anyhow!(e))?
        .run()
        .await;
    Ok(())
}

#[get("/")]
async fn index() -> impl Responder {
    "chainflow-metrics-server: visit /metrics to view metrics"
}

#[get("/metrics")]
async fn metrics() -> impl Responder {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode prometheus metrics: {:?}", e);
    }

    String::from_utf8(buffer).unwrap_or_default()
}
