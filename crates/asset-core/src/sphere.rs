//! Points on the map sphere.
//! The hex-sphere is not a unit sphere: every tile center sits at the
//! graph's `radius`, so conversions take the radius explicitly.

use serde::{Deserialize, Serialize};

use crate::coords::LatLon;

/// A tile center in Cartesian coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_latlon_on(lat_deg: f64, lon_deg: f64, radius: f64) -> Self {
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();
        Self {
            x: radius * lat.cos() * lon.cos(),
            y: radius * lat.cos() * lon.sin(),
            z: radius * lat.sin(),
        }
    }

    /// Geographic position of this point on a sphere of `radius`.
    ///
    /// `z / radius` is clamped to [-1, 1] before the inverse sine; exported
    /// tile centers drift slightly off the sphere and would otherwise yield NaN
    /// at the poles.
    pub fn to_latlon_on(self, radius: f64) -> LatLon {
        let lat = (self.z / radius).clamp(-1.0, 1.0).asin().to_degrees();
        let lon = self.y.atan2(self.x).to_degrees();
        LatLon::new(lat, lon)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }
}

/// Relative deviation of `p` from the sphere surface, |(|p| - r) / r|.
pub fn radial_drift(p: Vec3, radius: f64) -> f64 {
    ((p.length() - radius) / radius).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn latlon_roundtrip() {
        let pairs = [(0.0, 0.0), (45.0, 90.0), (-60.0, -120.0), (89.0, 179.0)];
        for (lat, lon) in pairs {
            let v = Vec3::from_latlon_on(lat, lon, 30.0);
            let ll = v.to_latlon_on(30.0);
            assert_abs_diff_eq!(ll.lat, lat, epsilon = 1e-9);
            assert_abs_diff_eq!(ll.lon, lon, epsilon = 1e-9);
        }
    }

    #[test]
    fn drift_past_pole_is_clamped() {
        // z slightly larger than the radius must not produce NaN.
        let ll = Vec3::new(0.0, 0.0, 10.000_001).to_latlon_on(10.0);
        assert_eq!(ll.lat, 90.0);
        let ll = Vec3::new(0.0, 0.0, -10.2).to_latlon_on(10.0);
        assert_eq!(ll.lat, -90.0);
    }

    #[test]
    fn latitude_stays_in_range() {
        for i in -20..=20 {
            let z = i as f64 * 0.5;
            let ll = Vec3::new(1.0, 1.0, z).to_latlon_on(10.0);
            assert!((-90.0..=90.0).contains(&ll.lat), "lat {} out of range", ll.lat);
            assert!((-180.0..=180.0).contains(&ll.lon));
        }
    }

    #[test]
    fn radial_drift_on_surface_is_zero() {
        let p = Vec3::from_latlon_on(12.0, 34.0, 5.0);
        assert!(radial_drift(p, 5.0) < 1e-12);
        assert_abs_diff_eq!(radial_drift(Vec3::new(0.0, 0.0, 5.5), 5.0), 0.1, epsilon = 1e-12);
    }
}
