//! Sprite-strip packing.
//!
//! Every frame of an animation is scaled by one shared factor, derived from
//! the largest dimension found anywhere in the set, so relative sizes between
//! frames survive. Each scaled frame is centered in a transparent S×S tile
//! and the tiles are stacked top to bottom: frame i occupies rows
//! [i·S, (i+1)·S) of the strip.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::debug;

use crate::error::SpriteError;

/// Tile edge used when none is configured.
pub const DEFAULT_TILE_SIZE: u32 = 128;

/// One decoded animation frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    pub image: RgbaImage,
}

/// Ordered frames of a single animation.
#[derive(Debug, Clone, Default)]
pub struct FrameSet {
    frames: Vec<Frame>,
}

impl FrameSet {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Load every `*.png` in `dir`, sorted by file name.
    pub fn load_dir(dir: &Path) -> Result<Self, SpriteError> {
        let list_err = |source| SpriteError::ListDir {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(list_err)? {
            let path = entry.map_err(list_err)?.path();
            let is_png = path
                .extension()
                .and_then(OsStr::to_str)
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if is_png && path.is_file() {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(SpriteError::NoFrames(dir.to_path_buf()));
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let image = image::open(&path)
                .map_err(|source| SpriteError::Decode {
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            debug!(frame = %name, width = image.width(), height = image.height(), "loaded frame");
            frames.push(Frame { name, image });
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn dims(&self) -> Vec<(u32, u32)> {
        self.frames.iter().map(|f| f.image.dimensions()).collect()
    }
}

/// The single scale factor applied to a whole frame set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedScale {
    /// Largest width or height over all frames.
    pub max_dim: u32,
    pub tile: u32,
}

impl SharedScale {
    /// `None` for an empty set.
    pub fn for_dims(dims: &[(u32, u32)], tile: u32) -> Option<Self> {
        let max_dim = dims.iter().map(|&(w, h)| w.max(h)).max()?;
        Some(Self { max_dim: max_dim.max(1), tile })
    }

    /// ratio = max_dim / S. Above 1 shrinks, below 1 enlarges.
    pub fn ratio(&self) -> f64 {
        f64::from(self.max_dim) / f64::from(self.tile)
    }

    /// Size of a `(w, h)` frame after dividing by the ratio, truncated.
    ///
    /// Evaluated as w·S / max_dim in integers so the largest frame lands on
    /// exactly S instead of S-1 through float rounding. Never below 1 px.
    pub fn fit(&self, (w, h): (u32, u32)) -> (u32, u32) {
        let scale = |v: u32| {
            let scaled = u64::from(v) * u64::from(self.tile) / u64::from(self.max_dim);
            (scaled as u32).clamp(1, self.tile)
        };
        (scale(w), scale(h))
    }
}

/// Offset that centers a span of `len` px within `tile` px, floored.
pub fn center_offset(tile: u32, len: u32) -> u32 {
    tile.saturating_sub(len) / 2
}

/// A packed strip together with the individual tiles it was built from.
#[derive(Debug, Clone)]
pub struct PackedSprite {
    pub tile_size: u32,
    pub tiles: Vec<RgbaImage>,
    pub strip: RgbaImage,
}

impl PackedSprite {
    pub fn frame_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn save_png(&self, path: &Path) -> Result<(), SpriteError> {
        self.strip.save(path)?;
        Ok(())
    }

    /// The strip re-rendered with `target` px tiles.
    pub fn downscale(&self, target: u32) -> Result<RgbaImage, SpriteError> {
        if target == 0 {
            return Err(SpriteError::ZeroTileSize);
        }
        let small: Vec<RgbaImage> = self
            .tiles
            .iter()
            .map(|t| imageops::resize(t, target, target, FilterType::Triangle))
            .collect();
        stack(&small, target)
    }
}

/// Stack equal `tile`×`tile` cells top to bottom.
fn stack(cells: &[RgbaImage], tile: u32) -> Result<RgbaImage, SpriteError> {
    let mut strip = RgbaImage::new(tile, strip_height(cells.len(), tile)?);
    for (i, cell) in cells.iter().enumerate() {
        imageops::replace(&mut strip, cell, 0, i as i64 * i64::from(tile));
    }
    Ok(strip)
}

fn strip_height(frames: usize, tile: u32) -> Result<u32, SpriteError> {
    u32::try_from(frames)
        .ok()
        .and_then(|n| n.checked_mul(tile))
        .ok_or(SpriteError::StripTooTall { frames, tile })
}

/// Scale, center and stack `set` into a `tile`×(`tile`·n) strip.
pub fn pack(set: &FrameSet, tile: u32) -> Result<PackedSprite, SpriteError> {
    if tile == 0 {
        return Err(SpriteError::ZeroTileSize);
    }
    let scale = SharedScale::for_dims(&set.dims(), tile)
        .ok_or_else(|| SpriteError::NoFrames(PathBuf::new()))?;
    strip_height(set.len(), tile)?;
    debug!(max_dim = scale.max_dim, ratio = scale.ratio(), "shared scale");

    let mut tiles = Vec::with_capacity(set.len());
    for frame in set.frames() {
        let (w, h) = scale.fit(frame.image.dimensions());
        let resized = imageops::resize(&frame.image, w, h, FilterType::Nearest);
        let mut cell = RgbaImage::new(tile, tile);
        imageops::replace(
            &mut cell,
            &resized,
            i64::from(center_offset(tile, w)),
            i64::from(center_offset(tile, h)),
        );
        tiles.push(cell);
    }

    let strip = stack(&tiles, tile)?;
    Ok(PackedSprite {
        tile_size: tile,
        tiles,
        strip,
    })
}

/// `<dir>/../<dir name>.<ext>`, where the packer writes its outputs by default.
pub fn sibling_output(dir: &Path, ext: &str) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sprite".to_owned());
    dir.join("..").join(format!("{name}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn solid(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, RED)
    }

    fn set_of(sizes: &[(u32, u32)]) -> FrameSet {
        FrameSet::new(
            sizes
                .iter()
                .enumerate()
                .map(|(i, &(w, h))| Frame {
                    name: format!("{i:03}.png"),
                    image: solid(w, h),
                })
                .collect(),
        )
    }

    #[test]
    fn shared_ratio_uses_largest_dimension() {
        let scale = SharedScale::for_dims(&[(100, 50), (40, 200)], 64).unwrap();
        assert_eq!(scale.max_dim, 200);
        assert_abs_diff_eq!(scale.ratio(), 3.125, epsilon = 1e-12);
        assert_eq!(scale.fit((100, 50)), (32, 16));
        assert_eq!(scale.fit((40, 200)), (12, 64));
    }

    #[test]
    fn small_frames_are_enlarged() {
        let scale = SharedScale::for_dims(&[(16, 8), (32, 32)], 64).unwrap();
        assert!(scale.ratio() < 1.0);
        assert_eq!(scale.fit((32, 32)), (64, 64));
        assert_eq!(scale.fit((16, 8)), (32, 16));
    }

    #[test]
    fn tiny_frames_keep_one_pixel() {
        let scale = SharedScale::for_dims(&[(1, 1), (1000, 1000)], 10).unwrap();
        assert_eq!(scale.fit((1, 1)), (1, 1));
    }

    #[test]
    fn offsets_are_floored() {
        assert_eq!(center_offset(64, 32), 16);
        assert_eq!(center_offset(64, 12), 26);
        assert_eq!(center_offset(64, 13), 25);
        assert_eq!(center_offset(64, 64), 0);
    }

    #[test]
    fn pack_worked_example() {
        let packed = pack(&set_of(&[(100, 50), (40, 200)]), 64).unwrap();
        assert_eq!(packed.strip.dimensions(), (64, 128));
        assert_eq!(packed.frame_count(), 2);

        // Frame 0: 32×16 at (16, 24).
        assert_eq!(packed.strip.get_pixel(16, 24), &RED);
        assert_eq!(packed.strip.get_pixel(47, 39), &RED);
        assert_eq!(packed.strip.get_pixel(15, 24)[3], 0);
        assert_eq!(packed.strip.get_pixel(16, 40)[3], 0);

        // Frame 1: 12×64 at (26, 0) inside the second band.
        assert_eq!(packed.strip.get_pixel(26, 64), &RED);
        assert_eq!(packed.strip.get_pixel(37, 127), &RED);
        assert_eq!(packed.strip.get_pixel(25, 100)[3], 0);
        assert_eq!(packed.strip.get_pixel(38, 100)[3], 0);
    }

    #[test]
    fn single_frame_strip_is_one_tile() {
        let packed = pack(&set_of(&[(30, 20)]), 48).unwrap();
        assert_eq!(packed.strip.dimensions(), (48, 48));
        assert_eq!(packed.tiles.len(), 1);
        assert_eq!(packed.tiles[0], packed.strip);
    }

    #[test]
    fn empty_set_and_zero_tile_fail() {
        assert!(matches!(pack(&FrameSet::default(), 64), Err(SpriteError::NoFrames(_))));
        assert!(matches!(pack(&set_of(&[(4, 4)]), 0), Err(SpriteError::ZeroTileSize)));
    }

    #[test]
    fn downscale_keeps_frame_layout() {
        let packed = pack(&set_of(&[(64, 64), (64, 64), (64, 64)]), 64).unwrap();
        let small = packed.downscale(16).unwrap();
        assert_eq!(small.dimensions(), (16, 48));
        assert!(matches!(packed.downscale(0), Err(SpriteError::ZeroTileSize)));
    }

    #[test]
    fn downscale_does_not_bleed_between_frames() {
        const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
        let set = FrameSet::new(vec![
            Frame { name: "0.png".into(), image: solid(64, 64) },
            Frame { name: "1.png".into(), image: RgbaImage::from_pixel(64, 64, BLUE) },
        ]);
        let small = pack(&set, 64).unwrap().downscale(16).unwrap();
        for x in 0..16 {
            assert_eq!(small.get_pixel(x, 15), &RED);
            assert_eq!(small.get_pixel(x, 16), &BLUE);
        }
    }

    #[test]
    fn load_dir_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        solid(8, 4).save(dir.path().join("b.png")).unwrap();
        solid(2, 2)
            .save_with_format(dir.path().join("a.PNG"), image::ImageFormat::Png)
            .unwrap();
        solid(6, 6).save(dir.path().join("c.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let set = FrameSet::load_dir(dir.path()).unwrap();
        let names: Vec<_> = set.frames().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.PNG", "b.png", "c.png"]);
        assert_eq!(set.dims(), vec![(2, 2), (8, 4), (6, 6)]);
    }

    #[test]
    fn load_dir_without_pngs_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(FrameSet::load_dir(dir.path()), Err(SpriteError::NoFrames(_))));
    }

    #[test]
    fn sibling_output_sits_next_to_dir() {
        let out = sibling_output(Path::new("animations/fire"), "png");
        assert_eq!(out, Path::new("animations/fire/../fire.png"));
    }
}
