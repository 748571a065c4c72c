// src/lib.rs
//! Concurrent developer-news aggregator.
//!
//! One query goes out to every configured provider at once; whatever comes
//! back inside the deadline is merged into the newest `K` articles.

pub mod api;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod model;
pub mod ranking;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::GripConfig;
pub use crate::engine::{CollectReport, Engine, SourceOutcome, SourceReport};
pub use crate::model::Record;
pub use crate::ranking::TopK;
pub use crate::sources::{SearchContext, Source, SourceError};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a compact fmt subscriber filtered by `RUST_LOG`
/// (default `grip=info,warn`). A subscriber that is already installed wins.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grip=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}
