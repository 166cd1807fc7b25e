//! Generated SQL for registering a packed sprite as a game asset.
//!
//! The statements go to a script file that is reviewed and applied by hand,
//! so values are rendered as escaped literals rather than bound parameters.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Client playback speed written for new animations.
pub const DEFAULT_SPEED: u32 = 50;

/// `value` as a single-quoted SQL string literal.
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Asset kind stored in `GameAsset.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Static,
    Animation,
}

impl AssetKind {
    pub fn for_frames(frames: usize) -> Self {
        if frames > 1 {
            AssetKind::Animation
        } else {
            AssetKind::Static
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Static => "STATIC",
            AssetKind::Animation => "ANIMATION",
        }
    }
}

/// One `GameAsset` row.
#[derive(Debug, Clone)]
pub struct GameAssetInsert {
    pub id: String,
    pub name: String,
    pub kind: AssetKind,
    pub image: String,
    pub frames: usize,
    pub speed: u32,
    pub license: String,
}

impl fmt::Display for GameAssetInsert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "INSERT INTO GameAsset (id, name, type, image, frames, speed, licenseDetails, hidden) \
             VALUES ({}, {}, {}, {}, {}, {}, {}, 0);",
            sql_literal(&self.id),
            sql_literal(&self.name),
            sql_literal(self.kind.as_str()),
            sql_literal(&self.image),
            self.frames,
            self.speed,
            sql_literal(&self.license),
        )
    }
}

/// Append `statement` as one line of the script at `path`.
pub fn append_statement(path: &Path, statement: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{statement}")
}
