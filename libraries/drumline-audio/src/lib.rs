//! Drumline Audio
//!
//! Decoding and file-level loudness measurement for Drumline.
//!
//! This crate provides:
//! - A [`PcmSource`](drumline_loudness::PcmSource) over Symphonia (MP3, FLAC,
//!   OGG, WAV, AAC)
//! - [`file_lufs`]: decode a file and return its integrated loudness
//!
//! # Example
//!
//! ```rust,no_run
//! use drumline_audio::file_lufs;
//! use drumline_loudness::VolumeNormalizer;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let lufs = file_lufs(Path::new("/songs/groove.ogg"))?;
//! match VolumeNormalizer::default().linear_gain(lufs) {
//!     Some(gain) => println!("{:.1} LUFS, volume x{:.3}", lufs, gain),
//!     None => println!("Nothing to normalize"),
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod decoder;
mod error;

pub use decoder::SymphoniaSource;
pub use error::{AudioError, Result};

use drumline_loudness::LoudnessMeasurement;
use std::path::Path;

/// Decode a file and measure it
///
/// Every call opens its own decoder and builds its own meter, so files can be
/// measured concurrently from any number of threads.
pub fn file_loudness(path: &Path) -> Result<LoudnessMeasurement> {
    let mut source = SymphoniaSource::open(path)?;
    let measurement = drumline_loudness::measure_source(&mut source)?;

    tracing::debug!("{}: {}", path.display(), measurement);
    Ok(measurement)
}

/// Integrated loudness of a file in LUFS
///
/// Returns [`drumline_loudness::SILENCE_LUFS`] for files with no channels or
/// shorter than 400 ms.
pub fn file_lufs(path: &Path) -> Result<f64> {
    file_loudness(path).map(|m| m.integrated_lufs)
}
