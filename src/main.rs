//! GRIP Aggregator: server entrypoint.
//! Boots the Axum HTTP server: engine from config, JSON routes, `/metrics`.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use grip::{api, metrics::Metrics, Engine, GripConfig};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    grip::init_tracing();

    let cfg = GripConfig::load_default().context("loading grip config")?;
    let engine = Engine::from_config(&cfg).context("building engine")?;
    tracing::info!(
        sources = ?engine.source_names(),
        deadline_ms = cfg.engine.deadline_ms,
        capacity = cfg.engine.capacity,
        "engine ready"
    );

    let metrics = Metrics::init(cfg.engine.deadline_ms, cfg.engine.capacity)?;
    let state = api::AppState::new(engine, cfg.default_query.clone());
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
