// src/sources/providers/lobsters.rs
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::model::Record;
use crate::sources::{
    fetch_json, normalize_title, parse_rfc3339, published_or, tag_slug, SearchContext, Source,
    SourceError,
};

pub const DEFAULT_BASE_URL: &str = "https://lobste.rs";

#[derive(Debug, Deserialize)]
struct Story {
    title: String,
    #[serde(default)]
    url: String,
    created_at: Option<String>,
    #[serde(default)]
    comments_url: String,
}

/// Stories under a Lobsters tag (`/t/<tag>.json`).
pub struct Lobsters {
    client: reqwest::Client,
    base_url: String,
}

impl Lobsters {
    pub fn new(client: reqwest::Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl Source for Lobsters {
    async fn search(&self, query: &str, ctx: &SearchContext) -> Result<Vec<Record>, SourceError> {
        let Some(tag) = tag_slug(query) else {
            return Ok(Vec::new());
        };
        let fetched_at = Utc::now();
        let url = format!("{}/t/{}.json", self.base_url.trim_end_matches('/'), tag);

        let stories: Vec<Story> = fetch_json(self.client.get(url), ctx).await?;

        Ok(stories
            .into_iter()
            .filter_map(|s| {
                // Text posts have no external url; link the discussion instead.
                let link = if s.url.is_empty() { s.comments_url } else { s.url };
                if link.is_empty() {
                    return None;
                }
                let ts = s.created_at.as_deref().and_then(parse_rfc3339);
                Some(Record::new(
                    normalize_title(&s.title),
                    link,
                    self.name(),
                    published_or(ts, fetched_at),
                ))
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "Lobsters"
    }
}
