//! Map file format
//!
//! A map is a gzip-compressed JSON document:
//!
//! ```text
//! { "version": 1,
//!   "cursor": { "x": 200.0, "y": 200.0 },
//!   "nodes": [ { "file_path": "rain.mp3", "x": 0.0, "y": 0.0, "radius": 120.0,
//!                "enabled": true, "playstyle": "loop_forever", "loops": -1 } ] }
//! ```
//!
//! `version` and `nodes` are required; everything else falls back to defaults.

use std::io::{Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{PlayStyle, Vec2, DEFAULT_CURSOR, DEFAULT_RADIUS, LOOP_INFINITE};

/// The only map format version this build reads and writes
pub const MAP_FORMAT_VERSION: u32 = 1;

/// Errors reading or writing a map
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Map file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes are not a valid gzip stream
    #[error("Map is not a valid gzip stream: {0}")]
    Compression(String),

    /// JSON is malformed or misses required fields
    #[error("Invalid map document: {0}")]
    Json(#[from] serde_json::Error),

    /// Listener position can't be represented in a map file
    #[error("Invalid cursor position: {0:?}")]
    InvalidCursor(Vec2),

    #[error("Unsupported map version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// A node carries values that can't be placed
    #[error("Invalid node {index}: {reason}")]
    InvalidNode { index: usize, reason: String },
}

/// Result type for map persistence
pub type PersistenceResult<T> = Result<T, PersistenceError>;

fn default_enabled() -> bool {
    true
}

fn default_radius() -> f32 {
    DEFAULT_RADIUS
}

fn default_loops() -> i32 {
    LOOP_INFINITE
}

fn default_cursor() -> Vec2 {
    DEFAULT_CURSOR
}

/// One node as stored in a map file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub file_path: String,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, rename = "playstyle")]
    pub play_style: PlayStyle,
    #[serde(default = "default_loops")]
    pub loops: i32,
}

impl NodeSnapshot {
    /// Snapshot with default radius, style and loops
    pub fn new(file_path: impl Into<String>, position: Vec2) -> Self {
        Self {
            file_path: file_path.into(),
            x: position.x,
            y: position.y,
            radius: DEFAULT_RADIUS,
            enabled: true,
            play_style: PlayStyle::default(),
            loops: LOOP_INFINITE,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Persisted soundscape: node set plus listener position
#[derive(Debug, Clone, PartialEq)]
pub struct SoundscapeMap {
    pub cursor: Vec2,
    pub nodes: Vec<NodeSnapshot>,
}

impl Default for SoundscapeMap {
    fn default() -> Self {
        Self {
            cursor: DEFAULT_CURSOR,
            nodes: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct MapDocument {
    version: u32,
    #[serde(default = "default_cursor")]
    cursor: Vec2,
    nodes: Vec<NodeSnapshot>,
}

impl SoundscapeMap {
    /// Check that every value can be placed on a map
    ///
    /// Non-finite numbers serialize as JSON `null` and could not be read
    /// back, so they are rejected both on load and before saving.
    pub fn validate(&self) -> PersistenceResult<()> {
        if !self.cursor.is_finite() {
            return Err(PersistenceError::InvalidCursor(self.cursor));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if node.file_path.is_empty() {
                return Err(PersistenceError::InvalidNode {
                    index,
                    reason: "empty file path".to_string(),
                });
            }
            if !node.position().is_finite() || !node.radius.is_finite() {
                return Err(PersistenceError::InvalidNode {
                    index,
                    reason: format!("non-finite geometry for '{}'", node.file_path),
                });
            }
        }
        Ok(())
    }

    /// Encode as gzip-compressed JSON
    pub fn save(&self) -> PersistenceResult<Vec<u8>> {
        self.validate()?;
        let document = MapDocument {
            version: MAP_FORMAT_VERSION,
            cursor: self.cursor,
            nodes: self.nodes.clone(),
        };
        let json = serde_json::to_vec(&document)?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        let bytes = encoder.finish()?;

        log::debug!(
            "Map: encoded {} nodes ({} bytes compressed)",
            self.nodes.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Decode gzip-compressed JSON, rejecting unknown versions
    pub fn load(bytes: &[u8]) -> PersistenceResult<Self> {
        let mut json = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut json)
            .map_err(|e| PersistenceError::Compression(e.to_string()))?;

        // Check the version before the full schema so old or future files
        // report the version instead of a missing field
        #[derive(Deserialize)]
        struct VersionHeader {
            version: u32,
        }
        let header: VersionHeader = serde_json::from_slice(&json)?;
        if header.version != MAP_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: header.version,
                expected: MAP_FORMAT_VERSION,
            });
        }

        let document: MapDocument = serde_json::from_slice(&json)?;
        let map = Self {
            cursor: document.cursor,
            nodes: document.nodes,
        };
        map.validate()?;

        log::debug!("Map: decoded {} nodes", map.nodes.len());
        Ok(map)
    }

    /// Write to a file
    pub fn save_to_file(&self, path: &Path) -> PersistenceResult<()> {
        let bytes = self.save()?;
        std::fs::write(path, bytes)?;
        log::info!("Map: saved {} nodes to {:?}", self.nodes.len(), path);
        Ok(())
    }

    /// Read from a file
    pub fn load_from_file(path: &Path) -> PersistenceResult<Self> {
        let bytes = std::fs::read(path)?;
        let map = Self::load(&bytes)?;
        log::info!("Map: loaded {} nodes from {:?}", map.nodes.len(), path);
        Ok(map)
    }
}
