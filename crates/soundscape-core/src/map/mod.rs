//! Map persistence
//!
//! Saves and restores the node set and listener position of a soundscape.

mod document;

pub use document::{
    NodeSnapshot, PersistenceError, PersistenceResult, SoundscapeMap, MAP_FORMAT_VERSION,
};
