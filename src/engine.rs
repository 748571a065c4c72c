//! # Collection Engine
//! Fans one query out to every configured source, merges whatever arrives
//! before the deadline into a [`TopK`], and returns the newest records.
//!
//! Policy: one task per source, one shared deadline for the whole call. A
//! source that fails or misses the deadline simply contributes nothing;
//! `collect` itself never fails.
//!
//! Only the consuming loop touches the ranking structure. Tasks hand their
//! batch over a channel sized to the number of sources, so a send never
//! waits; the channel closing (every sender dropped) is the all-done signal.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::config::GripConfig;
use crate::model::Record;
use crate::ranking::TopK;
use crate::sources::{self, SearchContext, Source, SourceError};

pub const DEFAULT_CEILING: Duration = Duration::from_secs(2);
pub const DEFAULT_CAPACITY: usize = 20;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("grip_collect_total", "Collect calls completed.");
        describe_counter!(
            "grip_collect_timeouts_total",
            "Collect calls that hit the deadline before every source reported."
        );
        describe_histogram!("grip_collect_duration_ms", "Collect wall time in milliseconds.");
        describe_counter!(
            "grip_records_received_total",
            "Records delivered by sources and offered to the ranking."
        );
        describe_counter!("grip_source_errors_total", "Source search failures.");
        describe_counter!(
            "grip_source_abandoned_total",
            "Sources still in flight when the deadline fired."
        );
    });
}

/// What happened to one source during a collect call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Delivered { records: usize },
    Failed { error: String },
    /// Still running when the deadline fired; its result, if any, is discarded.
    Abandoned,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: &'static str,
    pub outcome: SourceOutcome,
    /// Time until the source reported; the whole call's elapsed time if abandoned.
    pub elapsed_ms: u64,
}

/// Full result of a collect call, including per-source diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct CollectReport {
    pub records: Vec<Record>,
    pub elapsed_ms: u64,
    pub timed_out: bool,
    pub sources: Vec<SourceReport>,
}

struct Delivery {
    index: usize,
    elapsed: Duration,
    result: Result<Vec<Record>, SourceError>,
}

/// Holds the immutable source list; each collect call is self-contained.
#[derive(Clone)]
pub struct Engine {
    sources: Arc<[Arc<dyn Source>]>,
    ceiling: Duration,
    capacity: usize,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("sources", &self.source_names())
            .field("ceiling", &self.ceiling)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Engine {
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self {
            sources: sources.into(),
            ceiling: DEFAULT_CEILING,
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build the configured providers and limits.
    pub fn from_config(cfg: &GripConfig) -> anyhow::Result<Self> {
        let sources = sources::build_sources(cfg)?;
        Ok(Self::new(sources)
            .with_ceiling(Duration::from_millis(cfg.engine.deadline_ms))
            .with_capacity(cfg.engine.capacity))
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Newest records (at most `capacity`, newest first) across all sources
    /// that answered before the deadline. Empty when nothing arrived.
    pub async fn collect(&self, ctx: &SearchContext, query: &str) -> Vec<Record> {
        self.collect_with_report(ctx, query).await.records
    }

    /// Same as [`Engine::collect`], plus what happened to each source.
    ///
    /// Dropping the returned future aborts every in-flight source task.
    pub async fn collect_with_report(&self, ctx: &SearchContext, query: &str) -> CollectReport {
        ensure_metrics_described();
        let started = Instant::now();
        let ctx = ctx.bounded_by(self.ceiling);
        let deadline = ctx
            .deadline()
            .unwrap_or_else(|| started + self.ceiling);

        let mut ranking = TopK::new(self.capacity);
        let mut outcomes: Vec<Option<(SourceOutcome, Duration)>> = vec![None; self.sources.len()];

        // Fan-out
        let (tx, mut rx) = mpsc::channel::<Delivery>(self.sources.len().max(1));
        let mut tasks = JoinSet::new();
        let query: Arc<str> = Arc::from(query);
        for (index, source) in self.sources.iter().enumerate() {
            let source = Arc::clone(source);
            let query = Arc::clone(&query);
            let tx = tx.clone();
            tasks.spawn(async move {
                let t0 = Instant::now();
                let result = source.search(&query, &ctx).await;
                // Receiver is gone once the deadline fired; the late batch is dropped here.
                let _ = tx
                    .send(Delivery {
                        index,
                        elapsed: t0.elapsed(),
                        result,
                    })
                    .await;
            });
        }
        drop(tx);

        // Fan-in until every sender is gone or the deadline fires.
        let expiry = tokio::time::sleep_until(deadline);
        tokio::pin!(expiry);
        let timed_out = loop {
            tokio::select! {
                biased;
                () = &mut expiry => break true,
                delivery = rx.recv() => match delivery {
                    Some(d) => {
                        let outcome = self.merge(&mut ranking, d.index, d.result);
                        outcomes[d.index] = Some((outcome, d.elapsed));
                    }
                    None => break false,
                },
            }
        };

        // Nothing may be merged from here on.
        drop(rx);
        tasks.abort_all();

        let elapsed = started.elapsed();
        let sources = self
            .sources
            .iter()
            .zip(outcomes)
            .map(|(source, outcome)| {
                let (outcome, took) = outcome.unwrap_or_else(|| {
                    counter!("grip_source_abandoned_total", "source" => source.name())
                        .increment(1);
                    tracing::warn!(source = source.name(), "source missed the deadline");
                    (SourceOutcome::Abandoned, elapsed)
                });
                SourceReport {
                    source: source.name(),
                    outcome,
                    elapsed_ms: millis(took),
                }
            })
            .collect();

        let records = ranking.drain();

        counter!("grip_collect_total").increment(1);
        if timed_out {
            counter!("grip_collect_timeouts_total").increment(1);
        }
        histogram!("grip_collect_duration_ms").record(elapsed.as_secs_f64() * 1_000.0);
        tracing::info!(
            query = %query,
            kept = records.len(),
            elapsed_ms = millis(elapsed),
            timed_out,
            "collect finished"
        );

        CollectReport {
            records,
            elapsed_ms: millis(elapsed),
            timed_out,
            sources,
        }
    }

    /// Feed one source's result into the ranking. Runs on the consuming path only.
    fn merge(
        &self,
        ranking: &mut TopK,
        index: usize,
        result: Result<Vec<Record>, SourceError>,
    ) -> SourceOutcome {
        let name = self.sources[index].name();
        match result {
            Ok(batch) => {
                let n = batch.len();
                counter!("grip_records_received_total").increment(n as u64);
                for record in batch {
                    ranking.insert(record);
                }
                tracing::debug!(source = name, records = n, "merged batch");
                SourceOutcome::Delivered { records: n }
            }
            Err(e) => {
                counter!("grip_source_errors_total", "source" => name).increment(1);
                tracing::warn!(source = name, error = %e, "source failed");
                SourceOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
