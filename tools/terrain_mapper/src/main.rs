/// Terrain mapper: attaches a land / water / desert category to every tile
/// of the hex-sphere graph by sampling an equirectangular reference map.

use std::path::PathBuf;

use anyhow::{Context, Result};
use asset_core::terrain::{classify_graph, ReferenceMap};
use asset_core::tilegraph::TileGraph;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "terrain_mapper", about = "Classify hex-sphere tiles from a reference map")]
struct Args {
    /// Input tile graph (JSON with `radius` and `tiles`).
    #[arg(long, default_value = "public/map/hexasphere.json")]
    tiles: PathBuf,

    /// Equirectangular reference bitmap.
    #[arg(long, default_value = "public/map/reference.png")]
    map: PathBuf,

    /// Output tile graph; defaults to overwriting the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Relative distance from the sphere above which a tile center is reported.
    #[arg(long, default_value = "0.01")]
    drift_tolerance: f64,
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut graph = TileGraph::load(&args.tiles)
        .with_context(|| format!("Cannot load tile graph {}", args.tiles.display()))?;
    let map = ReferenceMap::load(&args.map)
        .with_context(|| format!("Cannot load reference map {}", args.map.display()))?;
    info!(
        tiles = graph.tiles.len(),
        radius = graph.radius,
        width = map.width(),
        height = map.height(),
        "[terrain_mapper] inputs loaded"
    );

    let off = graph.validate(args.drift_tolerance);
    if !off.is_empty() {
        info!(count = off.len(), "tile centers off the sphere; latitude will be clamped");
    }

    let counts = classify_graph(&mut graph, &map).context("Classification failed")?;

    let output = args.output.unwrap_or(args.tiles);
    graph
        .save(&output)
        .with_context(|| format!("Write failed: {}", output.display()))?;

    info!(
        water = counts.water,
        land = counts.land,
        desert = counts.desert,
        output = %output.display(),
        "[terrain_mapper] Done."
    );
    Ok(())
}
