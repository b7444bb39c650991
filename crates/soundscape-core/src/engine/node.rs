//! A placed sound on the map

use crate::audio::AudioBackend;
use crate::types::{NodeId, Vec2};

use super::source::AudioSource;

/// Audio source plus its place and reach on the map
#[derive(Debug)]
pub struct SoundscapeNode {
    id: NodeId,
    /// World-space center
    pub position: Vec2,
    /// Influence radius in world units; `<= 0` never connects
    pub radius: f32,
    pub source: AudioSource,
}

impl SoundscapeNode {
    pub fn new(id: NodeId, position: Vec2, radius: f32, source: AudioSource) -> Self {
        Self {
            id,
            position,
            radius,
            source,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn file_path(&self) -> &str {
        self.source.asset_path()
    }

    pub fn enabled(&self) -> bool {
        self.source.enabled
    }

    /// Whether `point` lies strictly inside the influence radius
    pub fn contains(&self, point: Vec2) -> bool {
        self.radius > 0.0 && self.position.distance(point) < self.radius
    }

    /// Stop playback and return the channel; the node is unusable afterwards
    pub fn dispose<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) {
        self.source.release(backend);
    }
}
