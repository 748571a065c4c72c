// src/sources/providers/devto.rs
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::model::Record;
use crate::sources::{
    fetch_json, normalize_title, parse_rfc3339, published_or, tag_slug, SearchContext, Source,
    SourceError,
};

pub const DEFAULT_BASE_URL: &str = "https://dev.to/api";

#[derive(Debug, Deserialize)]
struct Article {
    title: String,
    url: String,
    published_at: Option<String>,
}

/// Dev.to public articles API, filtered by tag.
pub struct DevTo {
    client: reqwest::Client,
    base_url: String,
}

impl DevTo {
    pub fn new(client: reqwest::Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl Source for DevTo {
    async fn search(&self, query: &str, ctx: &SearchContext) -> Result<Vec<Record>, SourceError> {
        let Some(tag) = tag_slug(query) else {
            return Ok(Vec::new());
        };
        let fetched_at = Utc::now();
        let url = format!("{}/articles", self.base_url.trim_end_matches('/'));
        let req = self.client.get(url).query(&[("tag", tag)]);

        let articles: Vec<Article> = fetch_json(req, ctx).await?;

        Ok(articles
            .into_iter()
            .map(|a| {
                let ts = a.published_at.as_deref().and_then(parse_rfc3339);
                Record::new(
                    normalize_title(&a.title),
                    a.url,
                    self.name(),
                    published_or(ts, fetched_at),
                )
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "Dev.to"
    }
}
