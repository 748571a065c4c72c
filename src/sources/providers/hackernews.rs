// src/sources/providers/hackernews.rs
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::model::Record;
use crate::sources::{
    fetch_json, normalize_title, parse_rfc3339, published_or, SearchContext, Source, SourceError,
};

pub const DEFAULT_BASE_URL: &str = "https://hn.algolia.com/api/v1";
const ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    title: Option<String>,
    url: Option<String>,
    created_at: Option<String>,
    #[serde(rename = "objectID")]
    object_id: Option<String>,
}

/// Hacker News stories via the Algolia search API.
pub struct HackerNews {
    client: reqwest::Client,
    base_url: String,
}

impl HackerNews {
    pub fn new(client: reqwest::Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// External link if there is one, otherwise the HN discussion page.
fn link_for(hit: &Hit) -> Option<String> {
    match (hit.url.as_deref(), hit.object_id.as_deref()) {
        (Some(u), _) if !u.trim().is_empty() => Some(u.to_string()),
        (_, Some(id)) if !id.is_empty() => Some(format!("{ITEM_URL}{id}")),
        _ => None,
    }
}

#[async_trait]
impl Source for HackerNews {
    async fn search(&self, query: &str, ctx: &SearchContext) -> Result<Vec<Record>, SourceError> {
        let fetched_at = Utc::now();
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let req = self
            .client
            .get(url)
            .query(&[("query", query.trim()), ("tags", "story")]);

        let resp: SearchResponse = fetch_json(req, ctx).await?;

        Ok(resp
            .hits
            .into_iter()
            .filter_map(|hit| {
                let link = link_for(&hit)?;
                let ts = hit.created_at.as_deref().and_then(parse_rfc3339);
                Some(Record::new(
                    normalize_title(hit.title.as_deref().unwrap_or_default()),
                    link,
                    self.name(),
                    published_or(ts, fetched_at),
                ))
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "Hacker News"
    }
}
