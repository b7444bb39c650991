//! Audio backend error types

use thiserror::Error;

use super::backend::ChannelId;

/// Errors that can occur during audio operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// Every playback channel is in use
    #[error("No free playback channel ({capacity} in use)")]
    ChannelExhausted { capacity: usize },

    /// Channel id was never allocated or already released
    #[error("Invalid playback channel: {0:?}")]
    InvalidChannel(ChannelId),

    /// Sound has no samples to play
    #[error("Sound '{0}' has no samples")]
    NoSound(String),

    /// No usable output device
    #[error("Audio device error: {0}")]
    Device(String),

    /// Failed to build audio stream
    #[error("Failed to build audio stream: {0}")]
    StreamBuild(String),

    /// Failed to start/play stream
    #[error("Failed to start audio stream: {0}")]
    StreamPlay(String),

    /// Command queue to the audio thread is full
    #[error("Audio command queue is full")]
    QueueFull,
}

/// Result type for audio operations
pub type AudioResult<T> = Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AudioError::ChannelExhausted { capacity: 32 };
        assert!(err.to_string().contains("32"));

        let err = AudioError::NoSound("wind.mp3".to_string());
        assert!(err.to_string().contains("wind.mp3"));
    }
}
