use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, RgbaImage};

use crate::error::SpriteError;

/// Lossless WebP bytes of `img`, the format uploaded to object storage.
pub fn encode_webp(img: &RgbaImage) -> Result<Vec<u8>, SpriteError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img.clone()).write_with_encoder(WebPEncoder::new_lossless(&mut bytes))?;
    Ok(bytes)
}
