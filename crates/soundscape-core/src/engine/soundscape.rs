//! The live soundscape
//!
//! Owns the nodes, the listener cursor, the audio backend and a handle to the
//! shared asset cache. User intents are `&mut self` methods, and [`Soundscape::tick`]
//! is driven by an external fixed-rate timer:
//!
//! ```text
//! intents ──► nodes / cursor ──► tick(dt) ──► cursor.advance
//!                                           ──► pending sources refresh
//!                                           ──► MixingEngine ──► TickReport / EventBus
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::audio::AudioBackend;
use crate::config::{FileAudioSettings, SoundscapeOptions};
use crate::events::{EventBus, SoundscapeEvent};
use crate::loader::{AssetResolved, SoundAssetCache};
use crate::map::{NodeSnapshot, PersistenceError, SoundscapeMap};
use crate::types::{GlideMode, NodeId, PlayStyle, Vec2, DEFAULT_RADIUS};
use crate::viewport;

use super::cursor::{GlideSpeeds, ListenerCursor};
use super::mixing::{MixingEngine, NodeMix};
use super::node::SoundscapeNode;
use super::source::{AudioSource, LoadMode};

/// Errors from soundscape intents
#[derive(Error, Debug)]
pub enum SoundscapeError {
    #[error("No node with id {0}")]
    UnknownNode(NodeId),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result type for soundscape intents
pub type SoundscapeResult<T> = Result<T, SoundscapeError>;

/// Everything one tick decided
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Listener position the mix was computed against
    pub listener: Vec2,
    /// One entry per node, in insertion order
    pub mixes: Vec<NodeMix>,
    /// Background loads that finished since the previous tick
    pub resolved: Vec<AssetResolved>,
}

impl TickReport {
    /// Mix result for a node, if it existed during the tick
    pub fn mix_for(&self, id: NodeId) -> Option<&NodeMix> {
        self.mixes.iter().find(|m| m.id == id)
    }
}

/// Counters for problems that degrade silently
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Nodes created without a playback channel
    pub channel_exhaustions: usize,
    /// Ticks run since creation
    pub ticks: u64,
}

/// Nodes, listener and audio of one open map
pub struct Soundscape<B: AudioBackend> {
    backend: B,
    cache: Arc<SoundAssetCache>,
    options: SoundscapeOptions,
    nodes: Vec<SoundscapeNode>,
    cursor: ListenerCursor,
    mixer: MixingEngine,
    /// Known sound files, in the order they were added
    library: Vec<String>,
    next_id: u64,
    events: Option<EventBus>,
    diagnostics: Diagnostics,
}

impl<B: AudioBackend> Soundscape<B> {
    pub fn new(backend: B, cache: Arc<SoundAssetCache>, options: SoundscapeOptions) -> Self {
        let cursor = ListenerCursor::new(
            crate::types::DEFAULT_CURSOR,
            options.glide_mode,
            options.glide,
        );
        Self {
            backend,
            cache,
            options,
            nodes: Vec::new(),
            cursor,
            mixer: MixingEngine::new(),
            library: Vec::new(),
            next_id: 1,
            events: None,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Publish tick results and node changes on `bus`
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    fn emit(&self, event: SoundscapeEvent) {
        if let Some(bus) = &self.events {
            bus.try_publish(event);
        }
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn index_of(&self, id: NodeId) -> SoundscapeResult<usize> {
        self.nodes
            .iter()
            .position(|n| n.id() == id)
            .ok_or(SoundscapeError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> SoundscapeResult<&mut SoundscapeNode> {
        let idx = self.index_of(id)?;
        Ok(&mut self.nodes[idx])
    }

    fn create_node(
        &mut self,
        path: &str,
        position: Vec2,
        radius: f32,
        settings: FileAudioSettings,
        enabled: bool,
        mode: LoadMode,
    ) -> NodeId {
        let (source, exhausted) = AudioSource::create_with_enabled(
            path,
            settings.play_style,
            settings.loops,
            enabled,
            mode,
            &self.cache,
            &mut self.backend,
        );
        if exhausted.is_some() {
            self.diagnostics.channel_exhaustions += 1;
        }

        let id = self.allocate_id();
        self.nodes.push(SoundscapeNode::new(id, position, radius, source));
        id
    }

    // ------------------------------------------------------------------
    // File library
    // ------------------------------------------------------------------

    /// Register a sound file and start loading it; returns `false` if already known
    pub fn add_file(&mut self, path: &str) -> bool {
        if !self.register_file(path) {
            return false;
        }
        // Warm the cache so the first placed node starts quickly
        self.cache.request_load(path);
        true
    }

    fn register_file(&mut self, path: &str) -> bool {
        if self.library.iter().any(|f| f == path) {
            return false;
        }
        self.library.push(path.to_string());
        log::info!("Soundscape: added file {}", path);
        true
    }

    /// Known sound files, in insertion order
    pub fn files(&self) -> &[String] {
        &self.library
    }

    /// Forget a file and remove every node that plays it
    ///
    /// Returns the number of nodes removed.
    pub fn remove_file(&mut self, path: &str) -> usize {
        let ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.file_path() == path)
            .map(|n| n.id())
            .collect();
        for id in &ids {
            // Ids were just collected from the live set
            let _ = self.remove_node(*id);
        }

        self.library.retain(|f| f != path);
        self.options.forget_file(path);
        self.cache.evict(path);
        log::info!("Soundscape: removed file {} ({} nodes)", path, ids.len());
        ids.len()
    }

    // ------------------------------------------------------------------
    // Node intents
    // ------------------------------------------------------------------

    /// Place a node for `path` at `position` using the file's remembered playback settings
    ///
    /// The sound loads in the background; a `LoopForever` node starts on the
    /// first tick after it arrives.
    pub fn add_node(&mut self, path: &str, position: Vec2) -> NodeId {
        self.add_file(path);
        let settings = self.options.file_settings(path);
        let id = self.create_node(
            path,
            position,
            DEFAULT_RADIUS,
            settings,
            true,
            LoadMode::Background,
        );

        log::info!("Soundscape: added node {} for {} at {}", id, path, position);
        self.emit(SoundscapeEvent::NodeAdded {
            id,
            file_path: path.to_string(),
        });
        id
    }

    /// Stop a node, free its channel and drop it
    pub fn remove_node(&mut self, id: NodeId) -> SoundscapeResult<()> {
        let idx = self.index_of(id)?;
        let mut node = self.nodes.remove(idx);
        node.dispose(&mut self.backend);

        log::info!("Soundscape: removed node {}", id);
        self.emit(SoundscapeEvent::NodeRemoved { id });
        Ok(())
    }

    pub fn move_node(&mut self, id: NodeId, position: Vec2) -> SoundscapeResult<()> {
        if !position.is_finite() {
            log::warn!("Soundscape: ignoring non-finite position for {}", id);
            return Ok(());
        }
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Change the influence radius; values `<= 0` make the node silent
    ///
    /// Non-finite radii are ignored, they couldn't be saved to a map.
    pub fn set_radius(&mut self, id: NodeId, radius: f32) -> SoundscapeResult<()> {
        if !radius.is_finite() {
            log::warn!("Soundscape: ignoring non-finite radius {} for {}", radius, id);
            return Ok(());
        }
        self.node_mut(id)?.radius = radius;
        Ok(())
    }

    /// Enable or mute a node; re-enabling re-applies its play style
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> SoundscapeResult<()> {
        let idx = self.index_of(id)?;
        let node = &mut self.nodes[idx];
        let was_enabled = node.source.enabled;
        node.source.enabled = enabled;
        if enabled && !was_enabled {
            node.source.refresh(&self.cache, &mut self.backend);
        }
        Ok(())
    }

    /// Change how a node plays and remember it for the node's file
    pub fn set_play_style(
        &mut self,
        id: NodeId,
        play_style: PlayStyle,
        loops: i32,
    ) -> SoundscapeResult<()> {
        let idx = self.index_of(id)?;
        let node = &mut self.nodes[idx];
        node.source
            .set_play_style(play_style, loops, &self.cache, &mut self.backend);

        let path = node.file_path().to_string();
        self.options
            .set_file_settings(&path, FileAudioSettings { play_style, loops });
        log::debug!(
            "Soundscape: {} now {} with {} loops",
            id,
            play_style.name(),
            loops
        );
        Ok(())
    }

    /// Nodes whose id (`3` or `#3`) or file path matches `query`, case-insensitively
    pub fn find_nodes(&self, query: &str) -> Vec<NodeId> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.nodes.iter().map(|n| n.id()).collect();
        }
        let id_query = query.strip_prefix('#').unwrap_or(&query);

        self.nodes
            .iter()
            .filter(|n| {
                n.id().0.to_string() == id_query || n.file_path().to_lowercase().contains(&query)
            })
            .map(|n| n.id())
            .collect()
    }

    // ------------------------------------------------------------------
    // Listener
    // ------------------------------------------------------------------

    pub fn set_cursor_target(&mut self, target: Vec2) {
        self.cursor.set_target(target);
    }

    pub fn set_glide_mode(&mut self, mode: GlideMode) {
        self.cursor.set_mode(mode);
        self.options.glide_mode = mode;
    }

    /// Change glide speeds of the live cursor and remember them in the options
    pub fn set_glide_speeds(&mut self, speeds: GlideSpeeds) {
        self.cursor.set_speeds(speeds);
        self.options.glide = speeds;
    }

    /// Apply grid snapping to a world position if the options ask for it
    pub fn snap_position(&self, world: Vec2) -> Vec2 {
        if self.options.snap_to_grid {
            viewport::snap_to_grid(world, self.options.grid_size)
        } else {
            world
        }
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the listener by `dt` seconds and re-mix every node
    pub fn tick(&mut self, dt: f32) -> TickReport {
        self.cursor.advance(dt);
        let listener = self.cursor.position();

        let resolved = self.cache.poll();

        for node in self.nodes.iter_mut() {
            if node.source.is_loading() && !self.cache.status(node.file_path()).is_pending() {
                node.source.refresh(&self.cache, &mut self.backend);
            }
        }

        let mixes = self
            .mixer
            .mix(self.nodes.iter_mut(), listener, &mut self.backend);

        self.diagnostics.ticks += 1;

        if self.events.is_some() {
            for r in &resolved {
                self.emit(SoundscapeEvent::AssetResolved(r.clone()));
            }
            for mix in &mixes {
                self.emit(SoundscapeEvent::VolumeChanged(*mix));
            }
        }

        TickReport {
            listener,
            mixes,
            resolved,
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Current node set and listener as a map document
    pub fn snapshot(&self) -> SoundscapeMap {
        SoundscapeMap {
            cursor: self.cursor.position(),
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeSnapshot {
                    file_path: n.file_path().to_string(),
                    x: n.position.x,
                    y: n.position.y,
                    radius: n.radius,
                    enabled: n.enabled(),
                    play_style: n.source.play_style(),
                    loops: n.source.loop_count(),
                })
                .collect(),
        }
    }

    /// Replace every node with the contents of `map`
    ///
    /// Sounds are decoded on the calling thread so the map is audible on the
    /// very next tick.
    pub fn apply_map(&mut self, map: &SoundscapeMap) {
        self.clear();
        self.cursor.teleport(map.cursor);

        // Paths that already failed during this load aren't decoded again;
        // a background request just picks up the recorded failure
        let mut failed: HashSet<&str> = HashSet::new();

        for snapshot in &map.nodes {
            self.register_file(&snapshot.file_path);
            let settings = FileAudioSettings {
                play_style: snapshot.play_style,
                loops: snapshot.loops,
            };
            let mode = if failed.contains(snapshot.file_path.as_str()) {
                LoadMode::Background
            } else {
                LoadMode::Blocking
            };
            let id = self.create_node(
                &snapshot.file_path,
                snapshot.position(),
                snapshot.radius,
                settings,
                snapshot.enabled,
                mode,
            );
            if self.node(id).is_some_and(|n| n.source.load_failed()) {
                failed.insert(&snapshot.file_path);
            }
        }

        log::info!("Soundscape: loaded map with {} nodes", self.nodes.len());
        self.emit(SoundscapeEvent::MapLoaded {
            node_count: self.nodes.len(),
        });
    }

    /// Load a map from encoded bytes; on error nothing changes
    pub fn load_map_bytes(&mut self, bytes: &[u8]) -> SoundscapeResult<usize> {
        let map = SoundscapeMap::load(bytes)?;
        self.apply_map(&map);
        Ok(self.nodes.len())
    }

    /// Load a map file; on error nothing changes
    pub fn load_map_file(&mut self, path: &Path) -> SoundscapeResult<usize> {
        let map = SoundscapeMap::load_from_file(path)?;
        self.apply_map(&map);
        Ok(self.nodes.len())
    }

    pub fn save_map_bytes(&self) -> SoundscapeResult<Vec<u8>> {
        Ok(self.snapshot().save()?)
    }

    pub fn save_map_file(&self, path: &Path) -> SoundscapeResult<()> {
        Ok(self.snapshot().save_to_file(path)?)
    }

    /// Remove every node, releasing their channels
    pub fn clear(&mut self) {
        for mut node in self.nodes.drain(..) {
            node.dispose(&mut self.backend);
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn nodes(&self) -> &[SoundscapeNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&SoundscapeNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn cursor(&self) -> &ListenerCursor {
        &self.cursor
    }

    pub fn options(&self) -> &SoundscapeOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn cache(&self) -> &Arc<SoundAssetCache> {
        &self.cache
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::VirtualBackend;
    use crate::audio_file::{AssetLoadError, DecodedSound, SoundDecoder};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Hum;

    impl SoundDecoder for Hum {
        fn decode(&self, path: &str) -> Result<DecodedSound, AssetLoadError> {
            if path.contains("broken") {
                return Err(AssetLoadError::Decode {
                    path: path.to_string(),
                    reason: "bad frame".to_string(),
                });
            }
            Ok(DecodedSound {
                path: path.to_string(),
                samples: vec![0.1; 128],
                sample_rate: 48_000,
                channels: 2,
            })
        }
    }

    /// Decoder that counts calls and fails for paths containing "broken"
    struct CountingHum {
        calls: Arc<AtomicUsize>,
    }

    impl SoundDecoder for CountingHum {
        fn decode(&self, path: &str) -> Result<DecodedSound, AssetLoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Hum.decode(path)
        }
    }

    fn soundscape(channels: usize) -> Soundscape<VirtualBackend> {
        let cache = Arc::new(SoundAssetCache::with_decoder(Arc::new(Hum), 2));
        let mut options = SoundscapeOptions::default();
        options.glide_mode = GlideMode::Snap;
        Soundscape::new(VirtualBackend::new(channels), cache, options)
    }

    fn settle(s: &mut Soundscape<VirtualBackend>) -> TickReport {
        assert!(s.cache().wait_until_idle(Duration::from_secs(5)));
        s.tick(0.016)
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut s = soundscape(8);
        let a = s.add_node("a.wav", Vec2::ZERO);
        let b = s.add_node("b.wav", Vec2::ZERO);
        s.remove_node(b).unwrap();
        let c = s.add_node("c.wav", Vec2::ZERO);
        assert!(a < b && b < c);
        assert!(matches!(
            s.remove_node(b),
            Err(SoundscapeError::UnknownNode(id)) if id == b
        ));
    }

    #[test]
    fn test_loop_forever_starts_when_asset_arrives() {
        let mut s = soundscape(4);
        let id = s.add_node("rain.wav", Vec2::ZERO);
        s.set_cursor_target(Vec2::new(60.0, 0.0));

        let report = settle(&mut s);
        assert_eq!(report.resolved.len(), 1);
        let node = s.node(id).unwrap();
        assert!(node.source.is_playing());
        assert_eq!(report.mix_for(id).unwrap().volume, 0.5);
    }

    #[test]
    fn test_failed_asset_node_stays_silent() {
        let mut s = soundscape(4);
        let id = s.add_node("broken.wav", Vec2::ZERO);
        s.set_cursor_target(Vec2::ZERO);

        let report = settle(&mut s);
        assert_eq!(
            report.resolved,
            vec![AssetResolved {
                path: "broken.wav".to_string(),
                success: false
            }]
        );
        // Geometry still reports full volume; there's just nothing to hear
        assert_eq!(report.mix_for(id).unwrap().volume, 1.0);
        assert!(!s.node(id).unwrap().source.is_playing());
        assert!(s.node(id).unwrap().source.load_failed());
    }

    #[test]
    fn test_channel_exhaustion_is_counted() {
        let mut s = soundscape(1);
        s.add_node("a.wav", Vec2::ZERO);
        let silent = s.add_node("b.wav", Vec2::ZERO);
        assert_eq!(s.diagnostics().channel_exhaustions, 1);

        let report = settle(&mut s);
        assert_eq!(report.mixes.len(), 2);
        assert!(s.node(silent).unwrap().source.channel().is_none());
    }

    #[test]
    fn test_set_play_style_is_remembered_per_file() {
        let mut s = soundscape(4);
        let first = s.add_node("birds.mp3", Vec2::ZERO);
        s.set_play_style(first, PlayStyle::PlayOnCursorEnter, 2).unwrap();

        let second = s.add_node("birds.mp3", Vec2::new(300.0, 0.0));
        let node = s.node(second).unwrap();
        assert_eq!(node.source.play_style(), PlayStyle::PlayOnCursorEnter);
        assert_eq!(node.source.loop_count(), 2);
    }

    #[test]
    fn test_remove_file_drops_its_nodes() {
        let mut s = soundscape(8);
        s.add_node("wind.wav", Vec2::ZERO);
        let keep = s.add_node("fire.wav", Vec2::ZERO);
        s.add_node("wind.wav", Vec2::new(10.0, 10.0));

        assert_eq!(s.remove_file("wind.wav"), 2);
        assert_eq!(s.nodes().len(), 1);
        assert_eq!(s.nodes()[0].id(), keep);
        assert_eq!(s.files(), &["fire.wav".to_string()]);
        assert_eq!(s.backend().allocated_count(), 1);
    }

    #[test]
    fn test_find_nodes_by_id_and_path() {
        let mut s = soundscape(8);
        let rain = s.add_node("ambience/Rain.wav", Vec2::ZERO);
        let bell = s.add_node("fx/bell.wav", Vec2::ZERO);

        assert_eq!(s.find_nodes("rain"), vec![rain]);
        assert_eq!(s.find_nodes(&format!("#{}", bell.0)), vec![bell]);
        assert_eq!(s.find_nodes(".wav"), vec![rain, bell]);
        assert!(s.find_nodes("thunder").is_empty());
    }

    #[test]
    fn test_reenabling_restarts_loop() {
        let mut s = soundscape(4);
        let id = s.add_node("hum.wav", Vec2::ZERO);
        settle(&mut s);

        s.set_enabled(id, false).unwrap();
        s.set_cursor_target(Vec2::ZERO);
        let report = s.tick(0.016);
        assert_eq!(report.mix_for(id).unwrap().volume, 0.0);
        assert!(!report.mix_for(id).unwrap().connected);

        s.set_enabled(id, true).unwrap();
        let report = s.tick(0.016);
        assert_eq!(report.mix_for(id).unwrap().volume, 1.0);
        assert!(s.node(id).unwrap().source.is_playing());
    }

    #[test]
    fn test_snapshot_roundtrip_through_bytes() {
        let mut s = soundscape(8);
        let a = s.add_node("a.wav", Vec2::new(40.0, 80.0));
        s.set_radius(a, 64.0).unwrap();
        let b = s.add_node("b.wav", Vec2::new(-40.0, 0.0));
        s.set_enabled(b, false).unwrap();
        s.set_cursor_target(Vec2::new(5.0, 5.0));
        s.tick(0.016);

        let bytes = s.save_map_bytes().unwrap();
        let mut restored = soundscape(8);
        assert_eq!(restored.load_map_bytes(&bytes).unwrap(), 2);
        assert_eq!(restored.snapshot(), s.snapshot());
        assert_eq!(restored.files().len(), 2);
    }

    #[test]
    fn test_events_are_published() {
        let bus = EventBus::new(64);
        let rx = bus.subscribe();
        let mut s = soundscape(4).with_events(bus);

        let id = s.add_node("a.wav", Vec2::ZERO);
        settle(&mut s);

        let events: Vec<_> = rx.try_iter().collect();
        assert!(events.contains(&SoundscapeEvent::NodeAdded {
            id,
            file_path: "a.wav".to_string()
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            SoundscapeEvent::AssetResolved(r) if r.path == "a.wav" && r.success
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, SoundscapeEvent::VolumeChanged(m) if m.id == id)));
    }

    #[test]
    fn test_non_finite_radius_is_ignored() {
        let mut s = soundscape(4);
        let id = s.add_node("a.wav", Vec2::ZERO);
        s.set_radius(id, 75.0).unwrap();
        s.set_radius(id, f32::INFINITY).unwrap();
        s.set_radius(id, f32::NAN).unwrap();
        assert_eq!(s.node(id).unwrap().radius, 75.0);

        let bytes = s.save_map_bytes().unwrap();
        let map = SoundscapeMap::load(&bytes).unwrap();
        assert_eq!(map.nodes[0].radius, 75.0);
    }

    #[test]
    fn test_overflowing_cursor_in_map_is_rejected() {
        let mut s = soundscape(4);
        s.add_node("a.wav", Vec2::ZERO);
        s.set_cursor_target(Vec2::new(5.0, 5.0));
        let before = s.snapshot();

        let json = br#"{"version":1,"cursor":{"x":1e39,"y":0},"nodes":[]}"#;
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        std::io::Write::write_all(&mut encoder, json).unwrap();
        let bytes = encoder.finish().unwrap();

        assert!(matches!(
            s.load_map_bytes(&bytes),
            Err(SoundscapeError::Persistence(PersistenceError::InvalidCursor(_)))
        ));
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn test_disabled_loop_in_map_stays_stopped() {
        let mut s = soundscape(4);
        let mut snapshot = NodeSnapshot::new("hum.wav", Vec2::ZERO);
        snapshot.enabled = false;
        let map = SoundscapeMap {
            cursor: Vec2::ZERO,
            nodes: vec![snapshot],
        };
        s.apply_map(&map);

        let node = &s.nodes()[0];
        let ch = node.source.channel().unwrap();
        assert!(!node.source.is_playing());
        assert_eq!(s.backend().channel(ch).unwrap().play_calls, 0);

        let report = s.tick(0.016);
        assert_eq!(report.mixes[0].volume, 0.0);
        assert_eq!(s.backend().playing_count(), 0);
    }

    #[test]
    fn test_unreadable_file_decoded_once_per_map_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let decoder = CountingHum {
            calls: calls.clone(),
        };
        let cache = Arc::new(SoundAssetCache::with_decoder(Arc::new(decoder), 2));
        let mut s = Soundscape::new(VirtualBackend::new(8), cache, SoundscapeOptions::default());

        let map = SoundscapeMap {
            cursor: Vec2::ZERO,
            nodes: (0..3)
                .map(|i| NodeSnapshot::new("broken.wav", Vec2::new(i as f32 * 50.0, 0.0)))
                .collect(),
        };
        s.apply_map(&map);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(s.nodes().len(), 3);
        assert!(s.nodes().iter().all(|n| n.source.load_failed()));
    }

    #[test]
    fn test_glide_speeds_reach_live_cursor() {
        let mut s = soundscape(2);
        s.set_glide_mode(GlideMode::Linear);
        s.set_glide_speeds(GlideSpeeds {
            linear_speed: 100.0,
            ease_speed: 2.0,
        });
        assert_eq!(s.options().glide.linear_speed, 100.0);

        let start = s.cursor().position();
        s.set_cursor_target(start + Vec2::new(500.0, 0.0));
        s.tick(0.5);
        assert!((s.cursor().position().x - (start.x + 50.0)).abs() < 1e-3);
    }
}
