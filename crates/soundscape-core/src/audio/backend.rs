//! Audio backend trait
//!
//! The soundscape core never talks to hardware directly. Everything it needs
//! from an audio system is behind [`AudioBackend`]:
//! - a fixed pool of playback channels, allocated per node
//! - play / stop / set volume on a channel
//!
//! Implementations:
//! - [`VirtualBackend`](super::VirtualBackend): in-memory channel pool (tests, tools)
//! - [`CpalBackend`](super::CpalBackend): real output via CPAL (`cpal-output` feature)

use crate::audio_file::SoundAsset;

use super::error::AudioResult;

/// Opaque handle to one playback channel of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub usize);

/// Narrow interface to a mixer with a fixed number of channels
///
/// All calls are made from the interaction thread. Implementations must not
/// panic on a stale channel id; they return an error or ignore the call.
pub trait AudioBackend {
    /// Reserve a free channel, or `None` when the pool is exhausted
    fn allocate_channel(&mut self) -> Option<ChannelId>;

    /// Return a channel to the pool, stopping anything playing on it
    fn release_channel(&mut self, channel: ChannelId);

    /// Start `sound` on `channel`
    ///
    /// `loops` is the number of extra repeats after the first pass;
    /// `-1` repeats forever.
    fn play(&mut self, channel: ChannelId, sound: &SoundAsset, loops: i32) -> AudioResult<()>;

    /// Halt playback on `channel`
    fn stop(&mut self, channel: ChannelId);

    /// Set channel gain, already clamped to `[0, 1]` by the caller
    fn set_volume(&mut self, channel: ChannelId, volume: f32);

    /// Total channels this backend can hand out
    fn channel_capacity(&self) -> usize;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn allocate_channel(&mut self) -> Option<ChannelId> {
        (**self).allocate_channel()
    }

    fn release_channel(&mut self, channel: ChannelId) {
        (**self).release_channel(channel)
    }

    fn play(&mut self, channel: ChannelId, sound: &SoundAsset, loops: i32) -> AudioResult<()> {
        (**self).play(channel, sound, loops)
    }

    fn stop(&mut self, channel: ChannelId) {
        (**self).stop(channel)
    }

    fn set_volume(&mut self, channel: ChannelId, volume: f32) {
        (**self).set_volume(channel, volume)
    }

    fn channel_capacity(&self) -> usize {
        (**self).channel_capacity()
    }
}
