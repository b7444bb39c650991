//! AudioSource - one playback channel bound to one sound file
//!
//! Owns the transport state of a node's audio but none of the mixing logic.
//! Every operation degrades to a silent no-op when the channel or the sound
//! is missing, so a node whose asset failed still works geometrically.

use crate::audio::{AudioBackend, AudioError, ChannelId};
use crate::audio_file::SoundAsset;
use crate::loader::{AssetStatus, SoundAssetCache};
use crate::types::PlayStyle;

/// How the source obtains its sound on creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Decode on the calling thread (paths known to be good, e.g. from a saved map)
    Blocking,
    /// Go through the asset cache's worker pool and pick the sound up on a later tick
    #[default]
    Background,
}

/// A sound asset plus the channel it plays on
#[derive(Debug)]
pub struct AudioSource {
    asset_path: String,
    /// When false the source is forced silent regardless of distance
    pub enabled: bool,
    play_style: PlayStyle,
    loop_count: i32,
    is_playing: bool,
    channel: Option<ChannelId>,
    sound: Option<SoundAsset>,
    load_failed: bool,
}

impl AudioSource {
    /// Create a source, allocate its channel and apply the play-style policy
    ///
    /// Returns the source together with the channel exhaustion error, if any;
    /// the source is still usable (silent) in that case.
    pub fn create<B: AudioBackend + ?Sized>(
        path: impl Into<String>,
        play_style: PlayStyle,
        loops: i32,
        mode: LoadMode,
        cache: &SoundAssetCache,
        backend: &mut B,
    ) -> (Self, Option<AudioError>) {
        Self::create_with_enabled(path, play_style, loops, true, mode, cache, backend)
    }

    /// Like [`create`](Self::create), but a disabled source never starts playback
    pub fn create_with_enabled<B: AudioBackend + ?Sized>(
        path: impl Into<String>,
        play_style: PlayStyle,
        loops: i32,
        enabled: bool,
        mode: LoadMode,
        cache: &SoundAssetCache,
        backend: &mut B,
    ) -> (Self, Option<AudioError>) {
        let asset_path = path.into();
        let channel = backend.allocate_channel();
        let exhausted = if channel.is_none() {
            let err = AudioError::ChannelExhausted {
                capacity: backend.channel_capacity(),
            };
            log::warn!("AudioSource: {} for '{}', node will stay silent", err, asset_path);
            Some(err)
        } else {
            None
        };

        let mut source = Self {
            asset_path,
            enabled,
            play_style,
            loop_count: loops,
            is_playing: false,
            channel,
            sound: None,
            load_failed: false,
        };

        if mode == LoadMode::Blocking {
            match cache.load_blocking(&source.asset_path) {
                Ok(sound) => source.sound = Some(sound),
                Err(e) => {
                    log::warn!("AudioSource: blocking load failed: {}", e);
                    source.load_failed = true;
                }
            }
        }

        source.refresh(cache, backend);
        (source, exhausted)
    }

    /// Pick up the sound if it isn't resolved yet and apply the play-style policy
    ///
    /// `LoopForever` starts playback, `PlayOnCursorEnter` stops it (the mixing
    /// tick restarts it when the cursor is inside the radius).
    pub fn refresh<B: AudioBackend + ?Sized>(&mut self, cache: &SoundAssetCache, backend: &mut B) {
        if self.sound.is_none() && !self.load_failed {
            self.sound = cache.request_load(&self.asset_path);
            if self.sound.is_none() {
                if let AssetStatus::Failed(_) = cache.status(&self.asset_path) {
                    self.load_failed = true;
                }
            }
        }

        match self.play_style {
            PlayStyle::LoopForever => self.play(backend),
            PlayStyle::PlayOnCursorEnter => self.stop(backend),
        }
    }

    /// Start playback; volume is forced to 0 right after so the mixer sets the real gain
    pub fn play<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.is_playing || !self.enabled {
            return;
        }
        let (Some(channel), Some(sound)) = (self.channel, self.sound.as_ref()) else {
            return;
        };

        match backend.play(channel, sound, self.loop_count) {
            Ok(()) => {
                backend.set_volume(channel, 0.0);
                self.is_playing = true;
            }
            Err(e) => log::warn!("AudioSource: failed to play '{}': {}", self.asset_path, e),
        }
    }

    /// Halt playback
    pub fn stop<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) {
        let Some(channel) = self.channel else {
            return;
        };
        backend.stop(channel);
        self.is_playing = false;
    }

    /// Set channel gain, clamped to `[0, 1]`
    pub fn set_volume<B: AudioBackend + ?Sized>(&mut self, backend: &mut B, volume: f32) {
        let Some(channel) = self.channel else {
            return;
        };
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        backend.set_volume(channel, volume);
    }

    /// Stop and hand the channel back to the backend
    pub fn release<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(channel) = self.channel.take() {
            backend.stop(channel);
            backend.release_channel(channel);
        }
        self.is_playing = false;
    }

    /// Change play style and loop count, then re-apply the policy
    pub fn set_play_style<B: AudioBackend + ?Sized>(
        &mut self,
        play_style: PlayStyle,
        loops: i32,
        cache: &SoundAssetCache,
        backend: &mut B,
    ) {
        let restart = loops != self.loop_count && self.is_playing;
        self.play_style = play_style;
        self.loop_count = loops;
        if restart {
            // New loop count only takes effect on a fresh start
            self.stop(backend);
        }
        self.refresh(cache, backend);
    }

    pub fn asset_path(&self) -> &str {
        &self.asset_path
    }

    pub fn play_style(&self) -> PlayStyle {
        self.play_style
    }

    pub fn loop_count(&self) -> i32 {
        self.loop_count
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn channel(&self) -> Option<ChannelId> {
        self.channel
    }

    /// Whether the decoded sound is available
    pub fn has_sound(&self) -> bool {
        self.sound.is_some()
    }

    /// Whether the sound is still expected to arrive from the cache
    pub fn is_loading(&self) -> bool {
        self.sound.is_none() && !self.load_failed
    }

    /// Whether loading the sound failed for good
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }
}
