//! Offline asset-pipeline utilities for the game client: terrain
//! classification of the hex-sphere map, sprite-strip packing, and
//! AI-assisted keyword tagging of stored game assets.

pub mod coords;
pub mod encode;
pub mod error;
pub mod ids;
pub mod preview;
pub mod publish;
pub mod sphere;
pub mod sprite;
pub mod sql;
pub mod storage;
pub mod tagger;
pub mod terrain;
pub mod tilegraph;

pub use error::{Error, Result};
