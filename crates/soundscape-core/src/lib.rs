//! Soundscape core
//!
//! Sounds are placed as nodes on a 2D map; a gliding listener cursor is
//! re-evaluated against every node each tick and each node's channel volume
//! follows the listener's distance.
//!
//! - [`engine`]: nodes, listener cursor, mixing and the [`engine::Soundscape`] aggregate
//! - [`loader`]: deduplicating background sound loader
//! - [`audio`]: playback backends (virtual, and cpal behind `cpal-output`)
//! - [`map`]: gzip JSON map files
//! - [`config`]: YAML editor options

pub mod audio;
pub mod audio_file;
pub mod config;
pub mod display;
pub mod engine;
pub mod events;
pub mod loader;
pub mod map;
pub mod types;
pub mod viewport;

pub use types::*;
