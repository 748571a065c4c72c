// src/model.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized article, as produced by a provider adapter.
///
/// `published_at` is always a real timestamp: adapters substitute their fetch
/// time for anything missing or unparsable (see [`crate::sources::published_or`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    #[serde(rename = "url")]
    pub link: String,
    pub source: String, // e.g., "Dev.to", "Lobsters"
    pub published_at: DateTime<Utc>,
}

impl Record {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        source: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            source: source.into(),
            published_at,
        }
    }
}
