// src/sources/providers/freecodecamp.rs
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::graphql::{self, PostConnection, HASHNODE_GQL_URL};
use crate::model::Record;
use crate::sources::{tag_slug, SearchContext, Source, SourceError};

const PUBLICATION_HOST: &str = "freecodecamp.org/news";

const PUBLICATION_POSTS: &str = r#"
query PublicationPosts($host: String!, $slug: String!) {
  publication(host: $host) {
    posts(first: 10, filter: { tagSlugs: [$slug] }) {
      edges { node { title url publishedAt } }
    }
  }
}"#;

#[derive(Debug, Deserialize)]
struct Data {
    publication: Option<Publication>,
}

#[derive(Debug, Deserialize)]
struct Publication {
    posts: PostConnection,
}

/// freeCodeCamp News, which is hosted on Hashnode and filtered by tag slug.
pub struct FreeCodeCamp {
    client: reqwest::Client,
    endpoint: String,
}

impl FreeCodeCamp {
    pub fn new(client: reqwest::Client, endpoint: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.unwrap_or_else(|| HASHNODE_GQL_URL.to_string()),
        }
    }
}

#[async_trait]
impl Source for FreeCodeCamp {
    async fn search(&self, query: &str, ctx: &SearchContext) -> Result<Vec<Record>, SourceError> {
        let Some(slug) = tag_slug(query) else {
            return Ok(Vec::new());
        };
        let fetched_at = Utc::now();
        let vars = json!({ "host": PUBLICATION_HOST, "slug": slug });

        let data: Option<Data> =
            graphql::query(&self.client, &self.endpoint, PUBLICATION_POSTS, vars, ctx).await?;

        let posts = data
            .and_then(|d| d.publication)
            .map(|p| graphql::into_records(p.posts, self.name(), fetched_at))
            .unwrap_or_default();

        tracing::debug!(source = self.name(), count = posts.len(), "parsed posts");
        Ok(posts)
    }

    fn name(&self) -> &'static str {
        "freeCodeCamp"
    }
}
