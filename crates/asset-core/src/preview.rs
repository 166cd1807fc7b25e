//! Looping GIF preview of a packed animation.

use std::fs;
use std::io::Write;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::error::SpriteError;

/// Display time of each preview frame.
pub const FRAME_DELAY_MS: u32 = 100;

/// Encode `tiles` as an endlessly looping GIF into `out`.
///
/// The preview opens on a blank `tile_size` tile, then plays the tiles in
/// order at [`FRAME_DELAY_MS`] each.
pub fn encode_gif<W: Write>(tiles: &[RgbaImage], tile_size: u32, out: W) -> Result<(), SpriteError> {
    let delay = Delay::from_numer_denom_ms(FRAME_DELAY_MS, 1);
    let mut encoder = GifEncoder::new(out);
    encoder.set_repeat(Repeat::Infinite)?;

    let blank = RgbaImage::new(tile_size, tile_size);
    encoder.encode_frame(Frame::from_parts(blank, 0, 0, delay))?;
    for tile in tiles {
        encoder.encode_frame(Frame::from_parts(tile.clone(), 0, 0, delay))?;
    }
    Ok(())
}

pub fn write_gif(tiles: &[RgbaImage], tile_size: u32, path: &Path) -> Result<(), SpriteError> {
    let mut bytes = Vec::new();
    // The encoder writes the GIF trailer when dropped.
    encode_gif(tiles, tile_size, &mut bytes)?;
    fs::write(path, bytes)?;
    Ok(())
}
