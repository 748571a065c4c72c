// src/sources/types.rs
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::model::Record;

/// Why a single provider produced nothing.
///
/// Adapters fail atomically: any of these means "no records from this source",
/// never a half-decoded batch.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// The HTTP client's own timeout fired
    #[error("request timed out")]
    Timeout,
    /// The shared collect deadline was spent before or during the call
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Body could not be decoded into the provider's schema
    #[error("decode error: {0}")]
    Decode(String),
    /// Provider answered 200 but reported an error in the payload
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::Timeout
        } else if e.is_decode() {
            SourceError::Decode(e.to_string())
        } else {
            SourceError::Network(e)
        }
    }
}

/// Cancellable deadline handed to every source call.
///
/// Cheap to copy. A context without a deadline never expires on its own; the
/// engine always derives a bounded child before fanning out.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchContext {
    deadline: Option<Instant>,
}

impl SearchContext {
    /// No deadline of its own.
    pub fn background() -> Self {
        Self { deadline: None }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Child context whose deadline is the earlier of ours and `now + ceiling`.
    pub fn bounded_by(&self, ceiling: Duration) -> Self {
        let ceiling_at = Instant::now() + ceiling;
        let deadline = match self.deadline {
            Some(parent) => parent.min(ceiling_at),
            None => ceiling_at,
        };
        Self::with_deadline(deadline)
    }
}

/// A content provider: given a query and a deadline, produce normalized records
/// or fail as a whole.
///
/// Implementations must not assume anything about ordering of their output and
/// must bound every blocking network operation by [`SearchContext::remaining`].
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    async fn search(&self, query: &str, ctx: &SearchContext) -> Result<Vec<Record>, SourceError>;
    fn name(&self) -> &'static str;
}
