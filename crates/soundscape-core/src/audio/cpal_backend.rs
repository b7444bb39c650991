//! CPAL audio backend implementation
//!
//! Real output for a soundscape: every channel is a voice that plays one
//! decoded sound at its own gain, and the output callback sums all voices.
//!
//! ```text
//! ┌──────────────────┐   push()    ┌─────────────────────┐   pop()   ┌─────────────────────┐
//! │ Interaction loop │ ──────────► │   Command Queue     │ ────────► │  CPAL Audio Thread  │
//! │   (~16ms cycle)  │             │  (lock-free SPSC)   │           │   (owns voices)     │
//! └──────────────────┘             └─────────────────────┘           └─────────────────────┘
//! ```
//!
//! Channel bookkeeping (which channels are handed out) stays on the
//! interaction thread; the audio thread only sees play/stop/volume commands.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};

use crate::audio_file::SoundAsset;

use super::backend::{AudioBackend, ChannelId};
use super::error::{AudioError, AudioResult};

/// Capacity of the command queue to the audio thread
const COMMAND_QUEUE_SIZE: usize = 1024;

/// Commands sent from the interaction thread to the audio callback
enum VoiceCommand {
    Play {
        channel: usize,
        sound: SoundAsset,
        loops: i32,
    },
    Stop {
        channel: usize,
    },
    Volume {
        channel: usize,
        volume: f32,
    },
}

/// Playback state of one channel, owned by the audio thread
#[derive(Default)]
struct Voice {
    sound: Option<SoundAsset>,
    /// Read position in source frames
    cursor: f64,
    /// Repeats left after the current pass (-1 = forever)
    loops_left: i32,
    volume: f32,
}

impl Voice {
    /// Next stereo frame, advancing by `step` source frames
    fn next_frame(&mut self, step: f64) -> Option<(f32, f32)> {
        let sound = self.sound.as_ref()?;
        let channels = sound.channels.max(1) as usize;
        let frames = sound.frame_count();
        if frames == 0 {
            self.sound = None;
            return None;
        }

        let idx = (self.cursor as usize).min(frames - 1) * channels;
        let left = sound.samples[idx];
        let right = if channels > 1 { sound.samples[idx + 1] } else { left };

        self.cursor += step;
        if self.cursor >= frames as f64 {
            match self.loops_left {
                0 => self.sound = None,
                n => {
                    if n > 0 {
                        self.loops_left -= 1;
                    }
                    self.cursor -= frames as f64;
                }
            }
        }

        Some((left * self.volume, right * self.volume))
    }
}

/// State moved into the output callback
struct CallbackState {
    command_rx: rtrb::Consumer<VoiceCommand>,
    voices: Vec<Voice>,
    output_rate: f64,
}

impl CallbackState {
    fn process_commands(&mut self) {
        while let Ok(cmd) = self.command_rx.pop() {
            match cmd {
                VoiceCommand::Play { channel, sound, loops } => {
                    if let Some(voice) = self.voices.get_mut(channel) {
                        voice.sound = Some(sound);
                        voice.cursor = 0.0;
                        voice.loops_left = loops;
                    }
                }
                VoiceCommand::Stop { channel } => {
                    if let Some(voice) = self.voices.get_mut(channel) {
                        voice.sound = None;
                    }
                }
                VoiceCommand::Volume { channel, volume } => {
                    if let Some(voice) = self.voices.get_mut(channel) {
                        voice.volume = volume;
                    }
                }
            }
        }
    }

    fn render(&mut self, data: &mut [f32], channels: usize) {
        self.process_commands();

        for frame in data.chunks_mut(channels) {
            let (mut left, mut right) = (0.0f32, 0.0f32);
            for voice in self.voices.iter_mut() {
                let step = match voice.sound.as_ref() {
                    Some(sound) => sound.sample_rate as f64 / self.output_rate,
                    None => continue,
                };
                if let Some((l, r)) = voice.next_frame(step) {
                    left += l;
                    right += r;
                }
            }

            frame[0] = left.clamp(-1.0, 1.0);
            if channels > 1 {
                frame[1] = right.clamp(-1.0, 1.0);
            }
            // Fill additional channels with silence
            for ch in frame.iter_mut().skip(2) {
                *ch = 0.0;
            }
        }
    }
}

/// Audio backend that plays through the default output device
///
/// Keeps the stream alive. Drop this to stop audio.
pub struct CpalBackend {
    _stream: Stream,
    command_tx: rtrb::Producer<VoiceCommand>,
    allocated: Vec<bool>,
    sample_rate: u32,
}

impl CpalBackend {
    /// Open the default output device with `channel_count` voices
    pub fn start(channel_count: usize) -> AudioResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Device("No default output device".to_string()))?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        log::info!("Using audio device: {}", device_name);

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::Device(e.to_string()))?;
        if supported.sample_format() != SampleFormat::F32 {
            return Err(AudioError::StreamBuild(format!(
                "Unsupported sample format: {:?}",
                supported.sample_format()
            )));
        }

        let config: StreamConfig = supported.config();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;

        log::info!(
            "Audio config: {} channels, {}Hz, {} voices",
            channels,
            sample_rate,
            channel_count
        );

        let (command_tx, command_rx) = rtrb::RingBuffer::<VoiceCommand>::new(COMMAND_QUEUE_SIZE);
        let mut state = CallbackState {
            command_rx,
            voices: (0..channel_count).map(|_| Voice::default()).collect(),
            output_rate: sample_rate as f64,
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    state.render(data, channels);
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        log::info!("Audio stream started");

        Ok(Self {
            _stream: stream,
            command_tx,
            allocated: vec![false; channel_count],
            sample_rate,
        })
    }

    /// Output sample rate negotiated with the device
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_allocated(&self, channel: ChannelId) -> bool {
        self.allocated.get(channel.0).copied().unwrap_or(false)
    }

    fn send(&mut self, cmd: VoiceCommand) -> AudioResult<()> {
        self.command_tx.push(cmd).map_err(|_| AudioError::QueueFull)
    }
}

impl AudioBackend for CpalBackend {
    fn allocate_channel(&mut self) -> Option<ChannelId> {
        let idx = self.allocated.iter().position(|used| !used)?;
        self.allocated[idx] = true;
        if let Err(e) = self.send(VoiceCommand::Volume { channel: idx, volume: 0.0 }) {
            log::warn!("Failed to reset channel {}: {}", idx, e);
        }
        Some(ChannelId(idx))
    }

    fn release_channel(&mut self, channel: ChannelId) {
        if !self.is_allocated(channel) {
            return;
        }
        self.allocated[channel.0] = false;
        if let Err(e) = self.send(VoiceCommand::Stop { channel: channel.0 }) {
            log::warn!("Failed to stop released channel {}: {}", channel.0, e);
        }
    }

    fn play(&mut self, channel: ChannelId, sound: &SoundAsset, loops: i32) -> AudioResult<()> {
        if !self.is_allocated(channel) {
            return Err(AudioError::InvalidChannel(channel));
        }
        if sound.samples.is_empty() {
            return Err(AudioError::NoSound(sound.path.clone()));
        }
        self.send(VoiceCommand::Play {
            channel: channel.0,
            sound: sound.clone(),
            loops,
        })
    }

    fn stop(&mut self, channel: ChannelId) {
        if !self.is_allocated(channel) {
            return;
        }
        if let Err(e) = self.send(VoiceCommand::Stop { channel: channel.0 }) {
            log::warn!("Failed to stop channel {}: {}", channel.0, e);
        }
    }

    fn set_volume(&mut self, channel: ChannelId, volume: f32) {
        if !self.is_allocated(channel) {
            return;
        }
        // Dropped volume updates are corrected by the next tick
        let _ = self.send(VoiceCommand::Volume { channel: channel.0, volume });
    }

    fn channel_capacity(&self) -> usize {
        self.allocated.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_file::DecodedSound;
    use std::sync::Arc;

    fn mono(samples: Vec<f32>) -> SoundAsset {
        Arc::new(DecodedSound {
            path: "test.wav".to_string(),
            samples,
            sample_rate: 10,
            channels: 1,
        })
    }

    #[test]
    fn test_voice_plays_once_then_stops() {
        let mut voice = Voice {
            sound: Some(mono(vec![0.5, 0.5])),
            cursor: 0.0,
            loops_left: 0,
            volume: 1.0,
        };
        assert_eq!(voice.next_frame(1.0), Some((0.5, 0.5)));
        assert_eq!(voice.next_frame(1.0), Some((0.5, 0.5)));
        assert_eq!(voice.next_frame(1.0), None);
    }

    #[test]
    fn test_voice_counts_down_loops() {
        let mut voice = Voice {
            sound: Some(mono(vec![1.0])),
            cursor: 0.0,
            loops_left: 2,
            volume: 0.5,
        };
        let played = std::iter::from_fn(|| voice.next_frame(1.0)).take(10).count();
        assert_eq!(played, 3);
    }
}
