//! Error types for loudness measurement

use thiserror::Error;

/// Result type for loudness operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can occur during loudness measurement
///
/// Empty or unreadable streams are not errors: measurement reports the
/// silence sentinel ([`crate::SILENCE_LUFS`]) instead.
#[derive(Error, Debug)]
pub enum LoudnessError {
    /// No precomputed K-weighting coefficients exist for this rate
    #[error("Unsupported sample rate: {0} Hz (must be 44100 or 48000)")]
    UnsupportedSampleRate(u32),

    /// Channel weighting is only defined for up to 3 channels
    #[error("Unsupported channel layout: {0} channels (must be 1-3)")]
    UnsupportedChannelLayout(usize),

    /// The PCM source failed while producing samples
    #[error("Decode error: {0}")]
    Decode(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
