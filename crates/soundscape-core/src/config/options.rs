//! Editor options
//!
//! Persisted as YAML next to the user's other settings. Every field has a
//! default so partial or older files still load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::GlideSpeeds;
use crate::loader::MIN_LOADER_WORKERS;
use crate::types::{GlideMode, PlayStyle, DEFAULT_CHANNEL_COUNT, DEFAULT_GRID_SIZE, LOOP_INFINITE};

/// Playback defaults remembered per sound file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAudioSettings {
    pub play_style: PlayStyle,
    /// Extra repeats after the first pass; -1 loops forever
    pub loops: i32,
}

impl Default for FileAudioSettings {
    fn default() -> Self {
        Self {
            play_style: PlayStyle::LoopForever,
            loops: LOOP_INFINITE,
        }
    }
}

/// All user-tunable settings of the editor core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundscapeOptions {
    /// Snap newly placed and dragged nodes to the grid
    pub snap_to_grid: bool,
    pub glide_mode: GlideMode,
    /// Show plain "Volume: N" labels instead of bars
    pub simple_ui: bool,
    pub glide: GlideSpeeds,
    pub grid_size: f32,
    /// Decode threads in the asset cache (at least 2)
    pub loader_workers: usize,
    /// Playback channels requested from the audio backend
    pub channel_count: usize,
    /// Per-file playback defaults, keyed by file path
    pub files: HashMap<String, FileAudioSettings>,
}

impl Default for SoundscapeOptions {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            glide_mode: GlideMode::Linear,
            simple_ui: false,
            glide: GlideSpeeds::default(),
            grid_size: DEFAULT_GRID_SIZE,
            loader_workers: MIN_LOADER_WORKERS,
            channel_count: DEFAULT_CHANNEL_COUNT,
            files: HashMap::new(),
        }
    }
}

impl SoundscapeOptions {
    /// Playback defaults for a file, falling back to loop forever
    pub fn file_settings(&self, path: &str) -> FileAudioSettings {
        self.files.get(path).copied().unwrap_or_default()
    }

    /// Remember playback defaults for a file
    pub fn set_file_settings(&mut self, path: &str, settings: FileAudioSettings) {
        self.files.insert(path.to_string(), settings);
    }

    /// Drop a file's remembered settings
    pub fn forget_file(&mut self, path: &str) {
        self.files.remove(path);
    }
}
