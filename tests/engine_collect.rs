// tests/engine_collect.rs
//
// Collect-level behavior with in-process mock sources. Time is paused, so
// "slow" sources cost nothing and deadline checks are exact.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::time::Instant;

use grip::{Engine, Record, SearchContext, Source, SourceError, SourceOutcome};

fn at(hours_ago: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap() - chrono::Duration::hours(hours_ago)
}

fn rec(source: &str, title: &str, hours_ago: i64) -> Record {
    Record::new(
        title,
        format!("https://example.test/{title}"),
        source,
        at(hours_ago),
    )
}

/// Returns a fixed batch after an optional delay.
struct Mock {
    name: &'static str,
    delay: Duration,
    batch: Vec<Record>,
}

impl Mock {
    fn now(name: &'static str, batch: Vec<Record>) -> Arc<dyn Source> {
        Arc::new(Self {
            name,
            delay: Duration::ZERO,
            batch,
        })
    }

    fn after(name: &'static str, delay: Duration, batch: Vec<Record>) -> Arc<dyn Source> {
        Arc::new(Self { name, delay, batch })
    }
}

#[async_trait]
impl Source for Mock {
    async fn search(&self, _q: &str, _ctx: &SearchContext) -> Result<Vec<Record>, SourceError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.batch.clone())
    }
    fn name(&self) -> &'static str {
        self.name
    }
}

struct Failing;

#[async_trait]
impl Source for Failing {
    async fn search(&self, _q: &str, _ctx: &SearchContext) -> Result<Vec<Record>, SourceError> {
        Err(SourceError::Decode("unexpected token".into()))
    }
    fn name(&self) -> &'static str {
        "Failing"
    }
}

/// Ignores the deadline entirely; records whether it ever finished.
struct Stubborn {
    finished: Arc<AtomicBool>,
}

#[async_trait]
impl Source for Stubborn {
    async fn search(&self, _q: &str, _ctx: &SearchContext) -> Result<Vec<Record>, SourceError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(vec![rec("Stubborn", "late", 0)])
    }
    fn name(&self) -> &'static str {
        "Stubborn"
    }
}

/// Captures what each call saw.
#[derive(Default)]
struct Recording {
    seen: Mutex<Vec<(String, Option<Duration>)>>,
}

#[async_trait]
impl Source for Recording {
    async fn search(&self, q: &str, ctx: &SearchContext) -> Result<Vec<Record>, SourceError> {
        self.seen.lock().push((q.to_string(), ctx.remaining()));
        Ok(Vec::new())
    }
    fn name(&self) -> &'static str {
        "Recording"
    }
}

#[tokio::test(start_paused = true)]
async fn two_sources_merge_newest_first() {
    let engine = Engine::new(vec![
        Mock::now("A", vec![rec("A", "fresh", 0)]),
        Mock::now("B", vec![rec("B", "yesterday", 24)]),
    ]);

    let out = engine.collect(&SearchContext::background(), "golang").await;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].source, "A");
    assert_eq!(out[1].source, "B");
}

#[tokio::test(start_paused = true)]
async fn twenty_five_records_keep_newest_twenty() {
    // hours_ago 24 .. 0, i.e. strictly increasing timestamps
    let batch: Vec<_> = (0..25)
        .map(|i| rec("A", &format!("p{i}"), 24 - i))
        .collect();
    let engine = Engine::new(vec![Mock::now("A", batch)]);

    let out = engine.collect(&SearchContext::background(), "golang").await;

    assert_eq!(out.len(), 20);
    assert_eq!(out[0].title, "p24");
    assert_eq!(out[19].title, "p5");
    assert!(out.windows(2).all(|w| w[0].published_at >= w[1].published_at));
}

#[tokio::test(start_paused = true)]
async fn failing_source_is_dropped_silently() {
    let engine = Engine::new(vec![
        Arc::new(Failing),
        Mock::now(
            "B",
            vec![rec("B", "b1", 3), rec("B", "b2", 1), rec("B", "b3", 2)],
        ),
    ]);

    let report = engine
        .collect_with_report(&SearchContext::background(), "golang")
        .await;

    assert_eq!(report.records.len(), 3);
    let titles: Vec<_> = report.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["b2", "b3", "b1"]);
    assert!(!report.timed_out);
    assert!(matches!(
        report.sources[0].outcome,
        SourceOutcome::Failed { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn zero_sources_returns_empty_without_waiting() {
    let engine = Engine::new(Vec::new());
    let start = Instant::now();

    let report = engine
        .collect_with_report(&SearchContext::background(), "golang")
        .await;

    assert!(report.records.is_empty());
    assert!(report.sources.is_empty());
    assert!(!report.timed_out);
    assert!(start.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn slow_source_is_abandoned_at_the_ceiling() {
    let engine = Engine::new(vec![
        Mock::now("Fast", vec![rec("Fast", "f1", 5)]),
        Mock::after("Slow", Duration::from_secs(10), vec![rec("Slow", "s1", 0)]),
    ]);
    let start = Instant::now();

    let report = engine
        .collect_with_report(&SearchContext::background(), "golang")
        .await;

    assert_eq!(start.elapsed(), Duration::from_secs(2));
    assert!(report.timed_out);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].source, "Fast");
    assert_eq!(report.sources[1].outcome, SourceOutcome::Abandoned);
}

#[tokio::test(start_paused = true)]
async fn source_just_inside_the_ceiling_is_merged() {
    let engine = Engine::new(vec![Mock::after(
        "Late",
        Duration::from_millis(1_900),
        vec![rec("Late", "l1", 0)],
    )]);

    let report = engine
        .collect_with_report(&SearchContext::background(), "golang")
        .await;

    assert!(!report.timed_out);
    assert_eq!(report.records.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn abandoned_task_is_aborted_not_awaited() {
    let finished = Arc::new(AtomicBool::new(false));
    let engine = Engine::new(vec![Arc::new(Stubborn {
        finished: Arc::clone(&finished),
    })]);

    let out = engine.collect(&SearchContext::background(), "golang").await;
    assert!(out.is_empty());

    // Well past the point the stubborn source would have completed.
    tokio::time::sleep(Duration::from_secs(7200)).await;
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn caller_deadline_tighter_than_ceiling_wins() {
    let engine = Engine::new(vec![Mock::after(
        "Slow",
        Duration::from_secs(1),
        vec![rec("Slow", "s1", 0)],
    )]);
    let start = Instant::now();

    let ctx = SearchContext::with_timeout(Duration::from_millis(500));
    let out = engine.collect(&ctx, "golang").await;

    assert!(out.is_empty());
    assert_eq!(start.elapsed(), Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn every_source_sees_the_query_and_shared_deadline() {
    let a = Arc::new(Recording::default());
    let b = Arc::new(Recording::default());
    let engine = Engine::new(vec![a.clone(), b.clone()]).with_ceiling(Duration::from_millis(750));

    engine.collect(&SearchContext::background(), "rust async").await;

    for r in [&a, &b] {
        let seen = r.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "rust async");
        assert_eq!(seen[0].1, Some(Duration::from_millis(750)));
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_collects_do_not_share_results() {
    let engine = Arc::new(
        Engine::new(vec![Mock::now(
            "A",
            vec![rec("A", "a1", 1), rec("A", "a2", 2)],
        )])
        .with_capacity(2),
    );

    let ctx_one = SearchContext::background();
    let ctx_two = SearchContext::background();
    let (x, y) = tokio::join!(
        engine.collect(&ctx_one, "one"),
        engine.collect(&ctx_two, "two"),
    );

    assert_eq!(x, y);
    assert_eq!(x.len(), 2);
}
