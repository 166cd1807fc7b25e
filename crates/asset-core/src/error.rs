//! Error types shared across the asset pipeline.

use std::path::PathBuf;

/// Failures of the terrain mapper.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    #[error("sphere radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    #[error("reference map has zero size ({width}x{height})")]
    EmptyMap { width: u32, height: u32 },

    #[error("failed to read tile graph {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write tile graph {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed tile graph: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load reference map {path}: {source}")]
    Map {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Failures of the sprite packer.
#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error("no PNG frames found in {0}")]
    NoFrames(PathBuf),

    #[error("tile size must be at least 1 px")]
    ZeroTileSize,

    #[error("{frames} frames of {tile} px do not fit in one strip")]
    StripTooTall { frames: usize, tile: u32 },

    #[error("cannot list frame directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode frame {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the remote object store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },
}

/// Failures of the asset tagger.
#[derive(Debug, thiserror::Error)]
pub enum TaggerError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("inference request failed: {0}")]
    Inference(String),

    #[error("malformed inference response: {0}")]
    Response(String),

    #[error("keyword {keyword:?} failed for asset {asset_id}: {source}")]
    Keyword {
        asset_id: String,
        keyword: String,
        source: rusqlite::Error,
    },
}

impl TaggerError {
    /// True for failures that belong to one asset and must not stop the run.
    pub fn is_per_asset(&self) -> bool {
        matches!(self, TaggerError::Db(_) | TaggerError::Keyword { .. })
    }
}

/// Aggregate error for callers that drive several stages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Terrain(#[from] TerrainError),

    #[error(transparent)]
    Sprite(#[from] SpriteError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Tagger(#[from] TaggerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;
