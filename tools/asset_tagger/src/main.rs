/// Asset tagger: asks a multimodal model for search keywords for every game
/// asset that has no tags yet, and stores them one transaction per asset.

use std::path::PathBuf;

use anyhow::{Context, Result};
use asset_core::tagger::keywords::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use asset_core::tagger::{AssetStore, OpenAiConfig, OpenAiKeywords, Tagger};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "asset_tagger", about = "Tag untagged game assets with AI-suggested keywords")]
struct Args {
    /// SQLite database holding GameAsset, ContentTag and GameAssetTag.
    #[arg(long, env = "DATABASE_URL")]
    database: PathBuf,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    openai_base_url: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Create the tables when they are missing.
    #[arg(long)]
    init_schema: bool,
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut store = AssetStore::open(&args.database)
        .with_context(|| format!("Cannot open database {}", args.database.display()))?;
    if args.init_schema {
        store.ensure_schema().context("Schema creation failed")?;
    }

    let source = OpenAiKeywords::new(OpenAiConfig {
        api_key: args.openai_key,
        base_url: args.openai_base_url,
        model: args.model,
    });

    let pending = store.untagged_assets().context("Cannot list untagged assets")?.len();
    let bar = ProgressBar::new(pending as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let report = {
        let mut tagger = Tagger::new(&mut store, &source).context("Cannot load tags")?;
        tagger
            .run(|asset, outcome| {
                bar.set_message(asset.name.clone());
                if let Err(e) = &outcome.result {
                    bar.suspend(|| warn!(asset = %asset.id, error = %e, "asset rolled back"));
                }
                bar.inc(1);
            })
            .context("Tagging aborted")?
    };
    bar.finish_and_clear();

    let totals = report.totals();
    info!(
        committed = report.committed(),
        failed = report.failed(),
        created_tags = totals.created_tags,
        linked_tags = totals.linked_tags,
        "[asset_tagger] Done."
    );
    Ok(())
}
