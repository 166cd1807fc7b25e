/// Sprite packer: scales a directory of animation frames into one vertical
/// strip. Optionally writes a looping GIF preview, or uploads a compressed
/// derivative and appends the matching `GameAsset` insert to a SQL script.

use std::path::PathBuf;

use anyhow::{Context, Result};
use asset_core::preview::write_gif;
use asset_core::publish::{publish, PublishOptions};
use asset_core::sprite::{pack, sibling_output, FrameSet, SharedScale, DEFAULT_TILE_SIZE};
use asset_core::sql::DEFAULT_SPEED;
use asset_core::storage::{HttpObjectStore, StorageConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sprite_packer", about = "Pack animation frames into a single sprite strip")]
struct Args {
    /// Directory of PNG frames, packed in file-name order.
    #[arg(short, long, default_value = "public/animations/smoke")]
    image_directory: PathBuf,

    /// Edge of each square tile in pixels.
    #[arg(short, long, default_value_t = DEFAULT_TILE_SIZE)]
    sprite_size: u32,

    /// Strip output; defaults to `<dir>/../<dir name>.png`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a looping GIF preview next to the strip.
    #[arg(long)]
    gif: bool,

    /// Upload a compressed derivative and record it in the SQL script.
    #[arg(long)]
    upload: bool,

    /// Tile edge of the uploaded derivative.
    #[arg(long, default_value = "64")]
    upload_size: u32,

    /// Asset name; defaults to the directory name.
    #[arg(long)]
    name: Option<String>,

    /// Playback speed stored with the asset.
    #[arg(long, default_value_t = DEFAULT_SPEED)]
    speed: u32,

    /// License text stored with the asset.
    #[arg(long, default_value = "Created in-house for the game")]
    license: String,

    /// SQL script the insert statement is appended to.
    #[arg(long, default_value = "assets.sql")]
    sql_file: PathBuf,

    #[arg(long, env = "STORAGE_ENDPOINT", default_value = "https://s3.us-east-1.amazonaws.com")]
    storage_endpoint: String,

    #[arg(long, env = "STORAGE_BUCKET", default_value = "tnr-game-assets")]
    storage_bucket: String,

    #[arg(long, env = "STORAGE_REGION", default_value = "us-east-1")]
    storage_region: String,

    #[arg(long, env = "STORAGE_TOKEN", hide_env_values = true)]
    storage_token: Option<String>,

    /// Base URL uploaded objects are served from (default: the bucket's S3 address).
    #[arg(long, env = "STORAGE_PUBLIC_BASE")]
    storage_public_base: Option<String>,
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let dir = &args.image_directory;

    let frames = FrameSet::load_dir(dir)
        .with_context(|| format!("Cannot load frames from {}", dir.display()))?;
    if let Some(scale) = SharedScale::for_dims(&frames.dims(), args.sprite_size) {
        info!(
            frames = frames.len(),
            max_dim = scale.max_dim,
            ratio = scale.ratio(),
            "[sprite_packer] frames loaded"
        );
    }

    let packed = pack(&frames, args.sprite_size).context("Packing failed")?;

    let png_path = args.output.clone().unwrap_or_else(|| sibling_output(dir, "png"));
    packed
        .save_png(&png_path)
        .with_context(|| format!("Write failed: {}", png_path.display()))?;
    info!(path = %png_path.display(), width = packed.strip.width(), height = packed.strip.height(), "Wrote strip");

    if args.gif {
        let gif_path = png_path.with_extension("gif");
        write_gif(&packed.tiles, packed.tile_size, &gif_path)
            .with_context(|| format!("Write failed: {}", gif_path.display()))?;
        info!(path = %gif_path.display(), "Wrote preview");
    }

    if args.upload {
        let name = match &args.name {
            Some(n) => n.clone(),
            None => dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("Cannot derive an asset name from the frame directory; pass --name")?,
        };
        let store = HttpObjectStore::new(StorageConfig {
            endpoint: args.storage_endpoint.clone(),
            bucket: args.storage_bucket.clone(),
            region: args.storage_region.clone(),
            token: args.storage_token.clone(),
            public_base: args.storage_public_base.clone(),
        });
        let published = publish(
            &packed,
            &store,
            &PublishOptions {
                name: &name,
                upload_tile: args.upload_size,
                speed: args.speed,
                license: &args.license,
                sql_path: &args.sql_file,
            },
        )
        .context("Upload failed")?;
        info!(url = %published.url, id = %published.insert.id, "Uploaded asset");
    }

    info!("[sprite_packer] Done.");
    Ok(())
}
