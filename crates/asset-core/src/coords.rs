/// Geographic coordinates and equirectangular pixel addressing.
/// All coordinate math uses f64 for precision.

/// A point on the sphere in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    /// Latitude in degrees, -90 to +90.
    pub lat: f64,
    /// Longitude in degrees, -180 to +180.
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A pixel position in a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub col: u32,
    pub row: u32,
}

/// Pixel of a `width`×`height` equirectangular raster containing `ll`.
///
/// Longitude -180 maps to column 0 and latitude -90 maps to row 0. Both axes
/// are floored and then clamped, so +180 / +90 land on the last column / row.
/// Returns `None` for a zero-sized raster.
pub fn equirect_pixel(ll: LatLon, width: u32, height: u32) -> Option<PixelCoord> {
    if width == 0 || height == 0 {
        return None;
    }
    let col = axis_index((ll.lon + 180.0) / 360.0, width);
    let row = axis_index((ll.lat + 90.0) / 180.0, height);
    Some(PixelCoord { col, row })
}

fn axis_index(t: f64, n: u32) -> u32 {
    let i = (t * n as f64).floor();
    // NaN casts to 0; negative values saturate to 0.
    (i as i64).clamp(0, n as i64 - 1) as u32
}
