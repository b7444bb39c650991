//! In-memory audio backend
//!
//! Keeps the transport state of each channel without producing sound.
//! Used by the test suite and by `map-inspect`, and handy for running a
//! soundscape headless.

use crate::audio_file::SoundAsset;

use super::backend::{AudioBackend, ChannelId};
use super::error::{AudioError, AudioResult};

/// Observable state of one virtual channel
#[derive(Debug, Clone, Default)]
pub struct VirtualChannel {
    /// Whether the channel is handed out
    pub allocated: bool,
    /// Path of the sound currently playing
    pub playing: Option<String>,
    /// Loop count passed to the last play call
    pub loops: i32,
    /// Current gain
    pub volume: f32,
    /// Number of play calls that reached this channel
    pub play_calls: usize,
    /// Number of stop calls that reached this channel
    pub stop_calls: usize,
    /// Number of set_volume calls that reached this channel
    pub volume_calls: usize,
}

/// Backend with a fixed pool of silent channels
#[derive(Debug, Clone)]
pub struct VirtualBackend {
    channels: Vec<VirtualChannel>,
}

impl VirtualBackend {
    /// Create a backend with `capacity` channels
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: vec![VirtualChannel::default(); capacity],
        }
    }

    /// Inspect a channel
    pub fn channel(&self, channel: ChannelId) -> Option<&VirtualChannel> {
        self.channels.get(channel.0)
    }

    /// Number of channels currently handed out
    pub fn allocated_count(&self) -> usize {
        self.channels.iter().filter(|c| c.allocated).count()
    }

    /// Number of channels currently playing
    pub fn playing_count(&self) -> usize {
        self.channels.iter().filter(|c| c.playing.is_some()).count()
    }

    fn slot(&mut self, channel: ChannelId) -> Option<&mut VirtualChannel> {
        self.channels.get_mut(channel.0).filter(|c| c.allocated)
    }
}

impl Default for VirtualBackend {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_CHANNEL_COUNT)
    }
}

impl AudioBackend for VirtualBackend {
    fn allocate_channel(&mut self) -> Option<ChannelId> {
        let idx = self.channels.iter().position(|c| !c.allocated)?;
        self.channels[idx] = VirtualChannel {
            allocated: true,
            ..Default::default()
        };
        Some(ChannelId(idx))
    }

    fn release_channel(&mut self, channel: ChannelId) {
        if let Some(slot) = self.channels.get_mut(channel.0) {
            slot.allocated = false;
            slot.playing = None;
            slot.volume = 0.0;
        }
    }

    fn play(&mut self, channel: ChannelId, sound: &SoundAsset, loops: i32) -> AudioResult<()> {
        if sound.samples.is_empty() {
            return Err(AudioError::NoSound(sound.path.clone()));
        }
        let slot = self.slot(channel).ok_or(AudioError::InvalidChannel(channel))?;
        slot.playing = Some(sound.path.clone());
        slot.loops = loops;
        slot.play_calls += 1;
        Ok(())
    }

    fn stop(&mut self, channel: ChannelId) {
        if let Some(slot) = self.slot(channel) {
            slot.playing = None;
            slot.stop_calls += 1;
        }
    }

    fn set_volume(&mut self, channel: ChannelId, volume: f32) {
        if let Some(slot) = self.slot(channel) {
            slot.volume = volume;
            slot.volume_calls += 1;
        }
    }

    fn channel_capacity(&self) -> usize {
        self.channels.len()
    }
}
