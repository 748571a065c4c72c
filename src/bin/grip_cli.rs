//! Terminal client: run one collect and print the newest articles.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use grip::{Engine, GripConfig, SearchContext};

#[derive(Debug, Parser)]
#[command(name = "grip-cli", about = "Newest developer articles for a search term")]
struct Cli {
    /// Search term (defaults to the configured default query)
    query: Option<String>,

    /// Path to a grip.toml (otherwise $GRIP_CONFIG_PATH, then config/grip.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long)]
    json: bool,

    /// Also print what each source did
    #[arg(long)]
    report: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    grip::init_tracing();
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(p) => GripConfig::load_from(p)
            .with_context(|| format!("loading grip config from {}", p.display()))?,
        None => GripConfig::load_default().context("loading grip config")?,
    };
    let query = cli
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(cfg.default_query.as_str())
        .to_string();
    let engine = Engine::from_config(&cfg).context("building engine")?;

    if !cli.json {
        println!("Searching for {query}...");
    }
    let report = engine
        .collect_with_report(&SearchContext::background(), &query)
        .await;

    if cli.json {
        let out = if cli.report {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string_pretty(&report.records)
        };
        println!("{}", out.context("encoding results")?);
        return Ok(());
    }

    if report.records.is_empty() {
        println!("No results found.");
    }
    for (i, r) in report.records.iter().enumerate() {
        println!("[{}] {:<60} | {}", i + 1, r.title, r.source);
        println!("     {}  ({})", r.link, r.published_at.format("%Y-%m-%d %H:%M"));
    }

    if cli.report {
        println!();
        println!("{} ms, timed out: {}", report.elapsed_ms, report.timed_out);
        for s in &report.sources {
            println!("  {:<14} {:?} ({} ms)", s.source, s.outcome, s.elapsed_ms);
        }
    }
    Ok(())
}
