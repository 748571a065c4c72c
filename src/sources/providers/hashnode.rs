// src/sources/providers/hashnode.rs
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::graphql::{self, PostConnection, HASHNODE_GQL_URL};
use crate::model::Record;
use crate::sources::{tag_slug, SearchContext, Source, SourceError};

const TAG_POSTS: &str = r#"
query TagPosts($slug: String!) {
  tag(slug: $slug) {
    posts(first: 10, filter: { sortBy: recent }) {
      edges { node { title url publishedAt } }
    }
  }
}"#;

#[derive(Debug, Deserialize)]
struct Data {
    tag: Option<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    posts: PostConnection,
}

/// Most recent posts under a Hashnode tag.
pub struct Hashnode {
    client: reqwest::Client,
    endpoint: String,
}

impl Hashnode {
    pub fn new(client: reqwest::Client, endpoint: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.unwrap_or_else(|| HASHNODE_GQL_URL.to_string()),
        }
    }
}

#[async_trait]
impl Source for Hashnode {
    async fn search(&self, query: &str, ctx: &SearchContext) -> Result<Vec<Record>, SourceError> {
        let Some(slug) = tag_slug(query) else {
            return Ok(Vec::new());
        };
        let fetched_at = Utc::now();
        let vars = json!({ "slug": slug });

        let data: Option<Data> =
            graphql::query(&self.client, &self.endpoint, TAG_POSTS, vars, ctx).await?;

        // Unknown tag comes back as `tag: null`: nothing to show, not a failure.
        let Some(tag) = data.and_then(|d| d.tag) else {
            return Ok(Vec::new());
        };
        Ok(graphql::into_records(tag.posts, self.name(), fetched_at))
    }

    fn name(&self) -> &'static str {
        "Hashnode"
    }
}
