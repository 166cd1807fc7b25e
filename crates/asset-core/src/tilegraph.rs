use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::TerrainError;
use crate::sphere::{radial_drift, Vec3};
use crate::terrain::TerrainCategory;

/// The hex-sphere map as exported for the game client.
///
/// Fields this tool does not understand are carried through untouched, so an
/// output graph is exactly its input plus a `t` on every tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGraph {
    pub radius: f64,
    pub tiles: Vec<Tile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One hexagonal (or pentagonal) face of the sphere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    /// Center point, at distance ≈`radius` from the origin.
    pub c: Vec3,
    /// Boundary polygon; not used for classification.
    #[serde(default)]
    pub b: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<TerrainCategory>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TileGraph {
    pub fn load(path: &Path) -> Result<Self, TerrainError> {
        let text = fs::read_to_string(path).map_err(|source| TerrainError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), TerrainError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json).map_err(|source| TerrainError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Indices of tiles whose center is more than `tolerance`·radius off the
    /// sphere. Each offender is logged; none of them is fatal.
    pub fn validate(&self, tolerance: f64) -> Vec<usize> {
        let off: Vec<usize> = self
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| radial_drift(tile.c, self.radius) > tolerance)
            .map(|(i, _)| i)
            .collect();
        for &i in &off {
            let c = self.tiles[i].c;
            warn!(tile = i, x = c.x, y = c.y, z = c.z, radius = self.radius, "tile center off sphere");
        }
        off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "radius": 10.0,
        "version": 3,
        "tiles": [
            {"c": {"x": 10.0, "y": 0.0, "z": 0.0},
             "b": [{"x": 9.9, "y": 0.1, "z": 0.0}],
             "id": "a"},
            {"c": {"x": 0.0, "y": 0.0, "z": 12.0}, "b": []}
        ]
    }"#;

    #[test]
    fn unknown_fields_survive_roundtrip() {
        let graph: TileGraph = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(graph.extra.get("version"), Some(&Value::from(3)));
        assert_eq!(graph.tiles[0].extra.get("id"), Some(&Value::from("a")));

        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["version"], 3);
        assert_eq!(json["tiles"][0]["id"], "a");
        assert!(json["tiles"][0].get("t").is_none(), "unclassified tiles carry no t");
    }

    #[test]
    fn category_is_written_as_integer() {
        let mut graph: TileGraph = serde_json::from_str(SAMPLE).unwrap();
        graph.tiles[0].t = Some(TerrainCategory::Desert);
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["tiles"][0]["t"], 2);
    }

    #[test]
    fn validate_flags_off_sphere_tiles() {
        let graph: TileGraph = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(graph.validate(0.01), vec![1]);
    }

    #[test]
    fn load_and_save_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        fs::write(&input, SAMPLE).unwrap();

        let graph = TileGraph::load(&input).unwrap();
        let output = dir.path().join("out.json");
        graph.save(&output).unwrap();
        let again = TileGraph::load(&output).unwrap();
        assert_eq!(again.tiles.len(), 2);
        assert_eq!(again.radius, 10.0);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = TileGraph::load(Path::new("/nonexistent/graph.json")).unwrap_err();
        assert!(matches!(err, TerrainError::Read { .. }));
    }
}
