//! Soundscape engine
//!
//! - [`AudioSource`]: one sound on one playback channel
//! - [`SoundscapeNode`]: a source placed on the map with a radius
//! - [`ListenerCursor`]: the gliding listener position
//! - [`MixingEngine`]: distance-to-volume decisions, once per tick
//! - [`Soundscape`]: owns all of the above and takes user intents

mod cursor;
mod mixing;
mod node;
mod soundscape;
mod source;

pub use cursor::{GlideSpeeds, ListenerCursor, DEFAULT_EASE_SPEED, DEFAULT_LINEAR_SPEED};
pub use mixing::{falloff_volume, MixingEngine, NodeMix};
pub use node::SoundscapeNode;
pub use soundscape::{Diagnostics, Soundscape, SoundscapeError, SoundscapeResult, TickReport};
pub use source::{AudioSource, LoadMode};
