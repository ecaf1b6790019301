/// Audio-specific errors
use drumline_loudness::LoudnessError;
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Container could not be probed or holds no audio track
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Symphonia error
    #[error("Symphonia error: {0}")]
    Symphonia(String),

    /// Loudness measurement rejected the stream
    #[error(transparent)]
    Loudness(#[from] LoudnessError),
}

impl AudioError {
    /// Whether the file decoded but its layout cannot be measured
    pub fn is_unsupported_layout(&self) -> bool {
        matches!(
            self,
            Self::Loudness(
                LoudnessError::UnsupportedSampleRate(_) | LoudnessError::UnsupportedChannelLayout(_)
            )
        )
    }
}
