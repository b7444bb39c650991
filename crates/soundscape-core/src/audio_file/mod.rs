//! Sound file decoding
//!
//! Turns a file on disk (mp3, wav, flac, ogg) into interleaved `f32` samples.
//! Decoding is the slow part of placing a node, which is why the
//! [`SoundAssetCache`](crate::loader::SoundAssetCache) runs it on worker threads.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur while loading a sound asset
///
/// Stored per path by the asset cache and handed out repeatedly,
/// so every variant carries owned, cloneable data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetLoadError {
    /// File not found or couldn't be opened
    #[error("Failed to open '{path}': {reason}")]
    Io { path: String, reason: String },

    /// Container or codec not supported
    #[error("Unsupported audio format in '{path}': {reason}")]
    Unsupported { path: String, reason: String },

    /// Stream could not be decoded
    #[error("Failed to decode '{path}': {reason}")]
    Decode { path: String, reason: String },

    /// File decoded to zero samples
    #[error("'{0}' contains no audio")]
    Empty(String),

    /// The loader pool is shut down and can't take jobs
    #[error("Asset loader is not running")]
    WorkerUnavailable,
}

/// A fully decoded sound, ready to be handed to an audio backend
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSound {
    /// Path the sound was decoded from
    pub path: String,
    /// Interleaved samples
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Interleaved channel count
    pub channels: u16,
}

impl DecodedSound {
    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

/// Shared handle to a decoded sound
///
/// Cheap to clone; every node placed from the same file shares one buffer.
pub type SoundAsset = Arc<DecodedSound>;

/// Capability to turn a path into decoded audio
///
/// The asset cache calls this from its worker threads.
pub trait SoundDecoder: Send + Sync + 'static {
    fn decode(&self, path: &str) -> Result<DecodedSound, AssetLoadError>;
}

/// Default decoder backed by symphonia
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl SoundDecoder for SymphoniaDecoder {
    fn decode(&self, path: &str) -> Result<DecodedSound, AssetLoadError> {
        decode_file(Path::new(path))
    }
}

/// Decode an entire audio file into interleaved f32 samples
pub fn decode_file(path: &Path) -> Result<DecodedSound, AssetLoadError> {
    use symphonia::core::audio::SampleBuffer;
    use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let display = path.display().to_string();

    let file = File::open(path).map_err(|e| AssetLoadError::Io {
        path: display.clone(),
        reason: e.to_string(),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Create a hint with the file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AssetLoadError::Unsupported {
            path: display.clone(),
            reason: e.to_string(),
        })?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AssetLoadError::Unsupported {
            path: display.clone(),
            reason: "No audio track found".to_string(),
        })?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(2);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AssetLoadError::Unsupported {
            path: display.clone(),
            reason: e.to_string(),
        })?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                if samples.is_empty() {
                    return Err(AssetLoadError::Decode {
                        path: display,
                        reason: e.to_string(),
                    });
                }
                log::warn!("decode_file: stopping at read error in {}: {}", display, e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                log::warn!("decode_file: skipping bad packet in {}: {}", display, e);
                continue;
            }
            Err(e) => {
                return Err(AssetLoadError::Decode {
                    path: display,
                    reason: e.to_string(),
                });
            }
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;
            sample_buf = Some(SampleBuffer::new(duration, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    if samples.is_empty() {
        return Err(AssetLoadError::Empty(display));
    }

    log::debug!(
        "decode_file: {} -> {} frames, {} ch @ {} Hz",
        display,
        samples.len() / channels.max(1) as usize,
        channels,
        sample_rate
    );

    Ok(DecodedSound {
        path: display,
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sine_wav(path: &Path, frames: u32) {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            let s = ((i as f32 * 0.05).sin() * 8_000.0) as i16;
            writer.write_sample(s).unwrap();
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_sine_wav(&path, 2_205);

        let sound = decode_file(&path).unwrap();
        assert_eq!(sound.channels, 2);
        assert_eq!(sound.sample_rate, 22_050);
        assert_eq!(sound.frame_count(), 2_205);
        assert!((sound.duration_seconds() - 0.1).abs() < 1e-6);
        assert!(sound.samples.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SymphoniaDecoder.decode("/nonexistent/rain.mp3").unwrap_err();
        assert!(matches!(err, AssetLoadError::Io { .. }));
        assert!(err.to_string().contains("rain.mp3"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();

        let err = decode_file(&path).unwrap_err();
        assert!(matches!(err, AssetLoadError::Unsupported { .. }));
    }
}
