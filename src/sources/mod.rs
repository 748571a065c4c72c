// src/sources/mod.rs
pub mod providers;
pub mod types;

pub use types::{SearchContext, Source, SourceError};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::config::{GripConfig, SourceKind};
use providers::{
    bootdev::BootDev, devto::DevTo, freecodecamp::FreeCodeCamp, hackernews::HackerNews,
    hashnode::Hashnode, lobsters::Lobsters,
};

/// Turn free text into a provider tag slug: `"Rust  Lang_2"` → `"rust-lang-2"`.
pub fn slugify(query: &str) -> String {
    static RE_INVALID: OnceCell<Regex> = OnceCell::new();
    static RE_DASHES: OnceCell<Regex> = OnceCell::new();
    let re_invalid = RE_INVALID.get_or_init(|| Regex::new(r"[^a-z0-9-]+").unwrap());
    let re_dashes = RE_DASHES.get_or_init(|| Regex::new(r"-{2,}").unwrap());

    let s = query.trim().to_lowercase().replace([' ', '_'], "-");
    let s = re_invalid.replace_all(&s, "");
    let s = re_dashes.replace_all(&s, "-");
    s.trim_matches('-').to_string()
}

/// Tag slug for tag-filtered providers. `None` when nothing survives
/// slugging (`"++"`, `"日本語"`): an empty tag means "no filter" upstream.
pub fn tag_slug(query: &str) -> Option<String> {
    let slug = slugify(query);
    (!slug.is_empty()).then_some(slug)
}

/// Decode HTML entities and collapse whitespace in an upstream title.
pub fn normalize_title(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let decoded = html_escape::decode_html_entities(s);
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

/// The one timestamp policy every adapter applies: anything missing,
/// unparsable, or before the Unix epoch becomes the fetch time.
pub fn published_or(parsed: Option<DateTime<Utc>>, fetched_at: DateTime<Utc>) -> DateTime<Utc> {
    match parsed {
        Some(ts) if ts.timestamp() > 0 => ts,
        _ => fetched_at,
    }
}

pub fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// RSS `pubDate` (RFC 2822 / RFC 1123).
pub fn parse_rfc2822(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Send a request bounded by the context deadline and reject non-2xx answers.
async fn send(
    req: reqwest::RequestBuilder,
    ctx: &SearchContext,
) -> Result<reqwest::Response, SourceError> {
    let req = match ctx.remaining() {
        Some(left) if left.is_zero() => return Err(SourceError::DeadlineExceeded),
        Some(left) => req.timeout(left),
        None => req,
    };

    let resp = req.send().await.map_err(|e| transport_error(e, ctx))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::HttpStatus(status.as_u16()));
    }
    Ok(resp)
}

pub(crate) async fn fetch_json<T: DeserializeOwned>(
    req: reqwest::RequestBuilder,
    ctx: &SearchContext,
) -> Result<T, SourceError> {
    let body = send(req, ctx)
        .await?
        .bytes()
        .await
        .map_err(|e| transport_error(e, ctx))?;
    serde_json::from_slice(&body).map_err(|e| SourceError::Decode(e.to_string()))
}

pub(crate) async fn fetch_text(
    req: reqwest::RequestBuilder,
    ctx: &SearchContext,
) -> Result<String, SourceError> {
    send(req, ctx)
        .await?
        .text()
        .await
        .map_err(|e| transport_error(e, ctx))
}

/// A timeout while the shared deadline has passed is the deadline, not the client.
fn transport_error(e: reqwest::Error, ctx: &SearchContext) -> SourceError {
    match SourceError::from(e) {
        SourceError::Timeout if ctx.is_expired() => SourceError::DeadlineExceeded,
        other => other,
    }
}

/// Shared HTTP client for all adapters (connection pool, UA, hard timeout).
pub fn build_client(cfg: &GripConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.http.user_agent.clone())
        .timeout(Duration::from_secs(cfg.http.timeout_secs))
        .build()
        .context("building provider http client")
}

/// Assemble the configured sources, in configuration order.
pub fn build_sources(cfg: &GripConfig) -> Result<Vec<Arc<dyn Source>>> {
    let client = build_client(cfg)?;

    let sources = cfg
        .sources
        .iter()
        .map(|spec| {
            let client = client.clone();
            let base = spec.base_url.clone();
            let source: Arc<dyn Source> = match spec.kind {
                SourceKind::Devto => Arc::new(DevTo::new(client, base)),
                SourceKind::Hackernews => Arc::new(HackerNews::new(client, base)),
                SourceKind::Hashnode => Arc::new(Hashnode::new(client, base)),
                SourceKind::Freecodecamp => Arc::new(FreeCodeCamp::new(client, base)),
                SourceKind::Lobsters => Arc::new(Lobsters::new(client, base)),
                SourceKind::Bootdev => Arc::new(BootDev::new(client, base)),
            };
            source
        })
        .collect();

    Ok(sources)
}
