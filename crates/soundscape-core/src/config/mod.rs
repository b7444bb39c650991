//! Configuration for the soundscape editor
//!
//! - Generic YAML config loading/saving
//! - Standard config paths
//! - [`SoundscapeOptions`], the persisted editor settings
//!
//! # Usage
//!
//! ```ignore
//! use soundscape_core::config::{default_options_path, load_config, save_config, SoundscapeOptions};
//!
//! let path = default_options_path();
//! let mut options: SoundscapeOptions = load_config(&path);
//! options.simple_ui = true;
//! save_config(&options, &path)?;
//! ```

mod io;
mod options;
mod paths;

pub use io::{load_config, save_config};
pub use options::{FileAudioSettings, SoundscapeOptions};
pub use paths::{default_config_dir, default_config_path, default_options_path};
