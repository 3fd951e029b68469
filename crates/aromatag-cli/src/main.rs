//! Aromatag — batch entry point for the content classification engine.
//!
//! The engine itself is a library pipeline invoked by the surrounding
//! service; this binary drives it for cron jobs and operator use.

use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aromatag_core::{EngineConfig, Source};
use aromatag_lexicon::Lexicon;
use aromatag_runtime::{BatchRunner, RunOptions};
use aromatag_store::{NewItem, TaggingStore};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = EngineConfig::from_env();

    match args.get(1).map(String::as_str) {
        Some("run") => cmd_run(&config, &args[2..]),
        Some("stats") => cmd_stats(&config),
        Some("seed") => cmd_seed(&config, &args[2..]),
        Some("--help") | Some("-h") | Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!("Aromatag — content classification engine");
    println!();
    println!("Usage: aromatag <command> [options]");
    println!();
    println!("Commands:");
    println!("  run [--force-retag] [--batch-size N] [--lexicon FILE]");
    println!("        Run one tagging batch and print the run report as JSON");
    println!("  stats");
    println!("        Print tag-state, segment, and sentiment counters as JSON");
    println!("  seed FILE");
    println!("        Import untagged content items from a JSON array");
    println!();
    println!("Environment:");
    println!("  AROMATAG_DB                Database file (default: data/aromatag.db)");
    println!("  AROMATAG_BATCH_SIZE        Default batch size (default: 50)");
    println!("  AROMATAG_CLAIM_TIMEOUT_MIN Stale-claim deadline in minutes (default: 10)");
    println!("  RUST_LOG                   Log filter (default: info)");
}

fn cmd_run(config: &EngineConfig, rest: &[String]) -> anyhow::Result<()> {
    let mut force_retag = false;
    let mut batch_size = config.batch_size;
    let mut lexicon_path: Option<PathBuf> = None;

    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--force-retag" => force_retag = true,
            "--batch-size" => {
                batch_size = iter
                    .next()
                    .context("--batch-size needs a value")?
                    .parse()
                    .context("--batch-size must be a number")?;
            }
            "--lexicon" => {
                lexicon_path = Some(PathBuf::from(
                    iter.next().context("--lexicon needs a file path")?,
                ));
            }
            other => anyhow::bail!("unknown option: {}", other),
        }
    }

    let loaded;
    let lexicon: &Lexicon = match lexicon_path {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading lexicon {}", path.display()))?;
            loaded = Lexicon::from_json_str(&json)?;
            info!("Loaded lexicon {} ({} terms)", loaded.version_tag(), loaded.len());
            &loaded
        }
        None => Lexicon::builtin(),
    };

    let store = TaggingStore::open(&config.db_path)?;
    let mut options = RunOptions::from_config(config, force_retag);
    options.batch_size = batch_size;

    let report = BatchRunner::run(&store, lexicon, &store, &options);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_stats(config: &EngineConfig) -> anyhow::Result<()> {
    let store = TaggingStore::open(&config.db_path)?;
    let stats = serde_json::json!({
        "tagStates": store.tag_state_counts()?,
        "segments": store.segment_stats()?,
        "sentiments": store.sentiment_stats()?,
        "highConversionLeads": store.high_conversion_leads(0.6, 50)?,
    });
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// JSON shape accepted by `seed`.
#[derive(Debug, Deserialize)]
struct SeedItem {
    source: Source,
    id: String,
    text: String,
    #[serde(default)]
    declared_user_id: Option<i64>,
}

fn cmd_seed(config: &EngineConfig, rest: &[String]) -> anyhow::Result<()> {
    let path = rest.first().context("seed needs a JSON file path")?;
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let items: Vec<SeedItem> = serde_json::from_str(&json)?;

    let store = TaggingStore::open(&config.db_path)?;
    let mut inserted = 0usize;
    for item in items {
        let new = NewItem {
            declared_user_id: item.declared_user_id,
            ..NewItem::new(item.source, &item.id, &item.text)
        };
        match store.insert_item(new) {
            Ok(()) => inserted += 1,
            Err(aromatag_core::Error::Conflict(message)) => {
                warn!("skipping duplicate: {}", message)
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Seeded {} items into {}", inserted, config.db_path.display());
    Ok(())
}
