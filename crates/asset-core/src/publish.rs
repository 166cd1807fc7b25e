//! Upload a packed strip and record it as a new `GameAsset` row in the SQL
//! script that accompanies the upload.

use std::path::Path;

use tracing::info;

use crate::encode::encode_webp;
use crate::ids::new_id;
use crate::sprite::PackedSprite;
use crate::sql::{append_statement, AssetKind, GameAssetInsert};
use crate::storage::ObjectStore;
use crate::Result;

pub struct PublishOptions<'a> {
    /// Asset name; also the basename of the uploaded object.
    pub name: &'a str,
    /// Tile edge of the uploaded derivative.
    pub upload_tile: u32,
    pub speed: u32,
    pub license: &'a str,
    pub sql_path: &'a Path,
}

#[derive(Debug, Clone)]
pub struct Published {
    pub url: String,
    pub insert: GameAssetInsert,
}

pub fn publish(packed: &PackedSprite, store: &dyn ObjectStore, opts: &PublishOptions<'_>) -> Result<Published> {
    let derivative = packed.downscale(opts.upload_tile)?;
    let bytes = encode_webp(&derivative)?;
    let key = format!("{}.webp", opts.name);
    let url = store.put(&key, &bytes, "image/webp")?;

    let frames = packed.frame_count();
    let insert = GameAssetInsert {
        id: new_id(),
        name: opts.name.to_owned(),
        kind: AssetKind::for_frames(frames),
        image: url.clone(),
        frames,
        speed: opts.speed,
        license: opts.license.to_owned(),
    };
    append_statement(opts.sql_path, &insert.to_string())?;
    info!(asset = %insert.id, %url, sql = %opts.sql_path.display(), "registered asset");

    Ok(Published { url, insert })
}
