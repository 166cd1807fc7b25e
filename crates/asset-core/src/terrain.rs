//! Tile terrain classification against a hand-painted equirectangular map.
//!
//! Each tile center is projected to (lat, lon), the reference map is sampled
//! at the matching pixel, and the RGB triple is bucketed by two fixed channel
//! comparisons. The thresholds are keyed to the palette of the reference map
//! the game ships with and must stay literal, including their order.

use std::fmt;
use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coords::{equirect_pixel, PixelCoord};
use crate::error::TerrainError;
use crate::sphere::Vec3;
use crate::tilegraph::TileGraph;

/// Red must exceed green minus this margin for a pixel to count as desert.
pub const DESERT_RED_MARGIN: i32 = 40;

/// Terrain category of a map tile.
///
/// Encoded in the tile graph as `t`: 0 = water, 1 = land, 2 = desert, which
/// is what the client's map reader expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TerrainCategory {
    Water,
    Land,
    Desert,
}

impl From<TerrainCategory> for u8 {
    fn from(c: TerrainCategory) -> u8 {
        match c {
            TerrainCategory::Water => 0,
            TerrainCategory::Land => 1,
            TerrainCategory::Desert => 2,
        }
    }
}

impl TryFrom<u8> for TerrainCategory {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(TerrainCategory::Water),
            1 => Ok(TerrainCategory::Land),
            2 => Ok(TerrainCategory::Desert),
            other => Err(format!("unknown terrain category {other}")),
        }
    }
}

impl fmt::Display for TerrainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TerrainCategory::Water => "water",
            TerrainCategory::Land => "land",
            TerrainCategory::Desert => "desert",
        })
    }
}

/// Desert is checked first, then land; everything else is water.
pub fn classify_rgb([r, g, b]: [u8; 3]) -> TerrainCategory {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    if r > g - DESERT_RED_MARGIN {
        TerrainCategory::Desert
    } else if g > b {
        TerrainCategory::Land
    } else {
        TerrainCategory::Water
    }
}

/// The equirectangular reference bitmap.
pub struct ReferenceMap {
    image: RgbImage,
}

impl ReferenceMap {
    pub fn load(path: &Path) -> Result<Self, TerrainError> {
        let image = image::open(path)
            .map_err(|source| TerrainError::Map {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        Self::from_image(image)
    }

    pub fn from_image(image: RgbImage) -> Result<Self, TerrainError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(TerrainError::EmptyMap { width, height });
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn sample(&self, p: PixelCoord) -> [u8; 3] {
        self.image.get_pixel(p.col, p.row).0
    }
}

/// Category of the tile centered at `center` on a sphere of `radius`.
pub fn classify_tile(center: Vec3, radius: f64, map: &ReferenceMap) -> TerrainCategory {
    let ll = center.to_latlon_on(radius);
    // from_image guarantees a non-empty map.
    let px = equirect_pixel(ll, map.width(), map.height()).unwrap_or(PixelCoord { col: 0, row: 0 });
    classify_rgb(map.sample(px))
}

/// Per-category tile totals of one classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub water: usize,
    pub land: usize,
    pub desert: usize,
}

impl CategoryCounts {
    fn record(&mut self, c: TerrainCategory) {
        match c {
            TerrainCategory::Water => self.water += 1,
            TerrainCategory::Land => self.land += 1,
            TerrainCategory::Desert => self.desert += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.water + self.land + self.desert
    }
}

/// Attach a category to every tile of `graph`. Any existing `t` is replaced.
pub fn classify_graph(graph: &mut TileGraph, map: &ReferenceMap) -> Result<CategoryCounts, TerrainError> {
    let radius = graph.radius;
    if !(radius.is_finite() && radius > 0.0) {
        return Err(TerrainError::InvalidRadius(radius));
    }

    let mut counts = CategoryCounts::default();
    for (i, tile) in graph.tiles.iter_mut().enumerate() {
        let category = classify_tile(tile.c, radius, map);
        debug!(tile = i, %category, "classified");
        tile.t = Some(category);
        counts.record(category);
    }
    Ok(counts)
}
