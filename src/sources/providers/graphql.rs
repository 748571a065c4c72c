// src/sources/providers/graphql.rs
//! Hashnode GraphQL plumbing shared by the Hashnode and freeCodeCamp adapters.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::Record;
use crate::sources::{
    fetch_json, normalize_title, parse_rfc3339, published_or, SearchContext, SourceError,
};

pub const HASHNODE_GQL_URL: &str = "https://gql.hashnode.com";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GqlError>,
}

#[derive(Debug, Deserialize)]
struct GqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostConnection {
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edge {
    pub node: Node,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Node {
    pub title: String,
    pub url: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

/// POST a query with variables. `Ok(None)` means the server sent no `data`.
pub(crate) async fn query<T: DeserializeOwned>(
    client: &reqwest::Client,
    endpoint: &str,
    document: &str,
    variables: Value,
    ctx: &SearchContext,
) -> Result<Option<T>, SourceError> {
    let req = client
        .post(endpoint)
        .json(&json!({ "query": document, "variables": variables }));

    let env: Envelope<T> = fetch_json(req, ctx).await?;
    if let Some(first) = env.errors.first() {
        return Err(SourceError::Upstream(first.message.clone()));
    }
    Ok(env.data)
}

pub(crate) fn into_records(
    posts: PostConnection,
    source: &str,
    fetched_at: DateTime<Utc>,
) -> Vec<Record> {
    posts
        .edges
        .into_iter()
        .map(|e| {
            let n = e.node;
            let ts = n.published_at.as_deref().and_then(parse_rfc3339);
            Record::new(
                normalize_title(&n.title),
                n.url,
                source,
                published_or(ts, fetched_at),
            )
        })
        .collect()
}
