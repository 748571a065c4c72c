// src/api.rs
//! JSON surface over the engine. Presentation stays with the client; these
//! handlers only pick the query, run one collect, and encode the result.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::engine::{CollectReport, Engine};
use crate::sources::SearchContext;

pub const LATENCY_HEADER: &str = "x-collect-latency-ms";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub default_query: Arc<str>,
}

impl AppState {
    pub fn new(engine: Engine, default_query: impl Into<Arc<str>>) -> Self {
        Self {
            engine: Arc::new(engine),
            default_query: default_query.into(),
        }
    }

    fn resolve_query(&self, raw: Option<&str>) -> String {
        match raw.map(str::trim) {
            Some(q) if !q.is_empty() => q.to_string(),
            _ => self.default_query.to_string(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(search))
        .route("/report", get(report))
        .route("/health", get(|| async { "OK" }))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Top newest records for `?q=` (falls back to the configured default query).
async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let query = state.resolve_query(params.q.as_deref());

    // Request-scoped context: the engine bounds it by its own ceiling.
    let start = Instant::now();
    let records = state
        .engine
        .collect(&SearchContext::background(), &query)
        .await;
    let latency = start.elapsed().as_millis().to_string();

    let mut resp = Json(records).into_response();
    if let Ok(v) = HeaderValue::from_str(&latency) {
        resp.headers_mut()
            .insert(HeaderName::from_static(LATENCY_HEADER), v);
    }
    resp
}

async fn report(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<CollectReport> {
    let query = state.resolve_query(params.q.as_deref());
    Json(
        state
            .engine
            .collect_with_report(&SearchContext::background(), &query)
            .await,
    )
}
