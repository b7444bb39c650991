//! Spatial mixing - distance to volume, once per tick
//!
//! Each node is evaluated in insertion order against a single listener
//! snapshot. Volume falls off linearly from 1 at the node's center to 0 at
//! its radius. `PlayOnCursorEnter` nodes are started and stopped as the
//! listener crosses the radius; `LoopForever` nodes only get their gain set.

use crate::audio::AudioBackend;
use crate::types::{NodeId, PlayStyle, Vec2};

use super::node::SoundscapeNode;

/// Mix decision for one node on one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMix {
    pub id: NodeId,
    /// Gain in `[0, 1]`
    pub volume: f32,
    /// Listener is strictly inside the radius (and the node is enabled)
    pub connected: bool,
}

/// Linear falloff: `1 - dist/radius` inside the radius, 0 elsewhere
///
/// Non-positive or non-finite radii never connect.
#[inline]
pub fn falloff_volume(dist: f32, radius: f32) -> f32 {
    if radius > 0.0 && radius.is_finite() && dist < radius {
        (1.0 - dist / radius).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Stateless per-tick mixer
#[derive(Debug, Default, Clone, Copy)]
pub struct MixingEngine;

impl MixingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Mix a single node against `listener`
    pub fn mix_node<B: AudioBackend + ?Sized>(
        &self,
        node: &mut SoundscapeNode,
        listener: Vec2,
        backend: &mut B,
    ) -> NodeMix {
        let id = node.id();

        if !node.enabled() {
            node.source.set_volume(backend, 0.0);
            return NodeMix {
                id,
                volume: 0.0,
                connected: false,
            };
        }

        let dist = listener.distance(node.position);
        let volume = falloff_volume(dist, node.radius);
        let connected = volume > 0.0;

        if node.source.play_style() == PlayStyle::PlayOnCursorEnter {
            if connected && !node.source.is_playing() {
                log::debug!("Mixing: listener entered {} ({})", id, node.file_path());
                node.source.play(backend);
            } else if !connected && node.source.is_playing() {
                log::debug!("Mixing: listener left {} ({})", id, node.file_path());
                node.source.stop(backend);
            }
        }

        node.source.set_volume(backend, volume);

        NodeMix {
            id,
            volume,
            connected,
        }
    }

    /// Mix every node in order; never fails
    pub fn mix<'a, B, I>(&self, nodes: I, listener: Vec2, backend: &mut B) -> Vec<NodeMix>
    where
        B: AudioBackend + ?Sized,
        I: IntoIterator<Item = &'a mut SoundscapeNode>,
    {
        nodes
            .into_iter()
            .map(|node| self.mix_node(node, listener, backend))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::VirtualBackend;
    use crate::audio_file::{AssetLoadError, DecodedSound, SoundDecoder};
    use crate::engine::source::{AudioSource, LoadMode};
    use crate::loader::SoundAssetCache;
    use std::sync::Arc;

    struct Beep;

    impl SoundDecoder for Beep {
        fn decode(&self, path: &str) -> Result<DecodedSound, AssetLoadError> {
            Ok(DecodedSound {
                path: path.to_string(),
                samples: vec![0.25; 64],
                sample_rate: 22_050,
                channels: 1,
            })
        }
    }

    fn node(
        id: u64,
        radius: f32,
        style: PlayStyle,
        cache: &SoundAssetCache,
        backend: &mut VirtualBackend,
    ) -> SoundscapeNode {
        let (source, _) =
            AudioSource::create("beep.wav", style, -1, LoadMode::Blocking, cache, backend);
        SoundscapeNode::new(NodeId(id), Vec2::ZERO, radius, source)
    }

    #[test]
    fn test_falloff_shape() {
        assert_eq!(falloff_volume(0.0, 100.0), 1.0);
        assert_eq!(falloff_volume(50.0, 100.0), 0.5);
        assert_eq!(falloff_volume(100.0, 100.0), 0.0);
        assert_eq!(falloff_volume(250.0, 100.0), 0.0);
        assert_eq!(falloff_volume(0.0, 0.0), 0.0);
        assert_eq!(falloff_volume(0.0, -10.0), 0.0);
        assert_eq!(falloff_volume(0.0, f32::INFINITY), 0.0);

        let mut last = 1.0;
        for step in 0..=40 {
            let v = falloff_volume(step as f32 * 5.0, 120.0);
            assert!(v <= last);
            last = v;
        }
    }

    #[test]
    fn test_cursor_enter_transport_follows_radius() {
        let cache = SoundAssetCache::with_decoder(Arc::new(Beep), 2);
        let mut backend = VirtualBackend::new(4);
        let mut n = node(1, 100.0, PlayStyle::PlayOnCursorEnter, &cache, &mut backend);
        let ch = n.source.channel().unwrap();
        let engine = MixingEngine::new();

        let mix = engine.mix_node(&mut n, Vec2::new(50.0, 0.0), &mut backend);
        assert_eq!(mix.volume, 0.5);
        assert!(mix.connected);
        assert!(n.source.is_playing());
        assert_eq!(backend.channel(ch).unwrap().volume, 0.5);

        let stops_before = backend.channel(ch).unwrap().stop_calls;
        let mix = engine.mix_node(&mut n, Vec2::new(150.0, 0.0), &mut backend);
        assert_eq!(mix.volume, 0.0);
        assert!(!mix.connected);
        assert!(!n.source.is_playing());
        assert_eq!(backend.channel(ch).unwrap().stop_calls, stops_before + 1);

        // Staying outside doesn't stop again
        engine.mix_node(&mut n, Vec2::new(160.0, 0.0), &mut backend);
        assert_eq!(backend.channel(ch).unwrap().stop_calls, stops_before + 1);
    }

    #[test]
    fn test_loop_forever_only_changes_gain() {
        let cache = SoundAssetCache::with_decoder(Arc::new(Beep), 2);
        let mut backend = VirtualBackend::new(4);
        let mut n = node(1, 100.0, PlayStyle::LoopForever, &cache, &mut backend);
        let ch = n.source.channel().unwrap();
        let engine = MixingEngine::new();

        engine.mix_node(&mut n, Vec2::new(500.0, 0.0), &mut backend);
        assert!(n.source.is_playing());
        assert_eq!(backend.channel(ch).unwrap().stop_calls, 0);
        assert_eq!(backend.channel(ch).unwrap().volume, 0.0);
    }

    #[test]
    fn test_disabled_node_is_silent() {
        let cache = SoundAssetCache::with_decoder(Arc::new(Beep), 2);
        let mut backend = VirtualBackend::new(4);
        let mut n = node(1, 100.0, PlayStyle::PlayOnCursorEnter, &cache, &mut backend);
        n.source.enabled = false;

        let mix = MixingEngine::new().mix_node(&mut n, Vec2::ZERO, &mut backend);
        assert_eq!(mix.volume, 0.0);
        assert!(!mix.connected);
        assert!(!n.source.is_playing());
    }

    #[test]
    fn test_identical_nodes_are_independent() {
        let cache = SoundAssetCache::with_decoder(Arc::new(Beep), 2);
        let mut backend = VirtualBackend::new(4);
        let mut nodes = vec![
            node(1, 100.0, PlayStyle::LoopForever, &cache, &mut backend),
            node(2, 100.0, PlayStyle::LoopForever, &cache, &mut backend),
        ];

        let mixes = MixingEngine::new().mix(nodes.iter_mut(), Vec2::new(25.0, 0.0), &mut backend);
        assert_eq!(mixes.len(), 2);
        assert_eq!(mixes[0].id, NodeId(1));
        assert_eq!(mixes[1].id, NodeId(2));
        assert_eq!(mixes[0].volume, 0.75);
        assert_eq!(mixes[1].volume, 0.75);
        assert_ne!(nodes[0].source.channel(), nodes[1].source.channel());
    }
}
