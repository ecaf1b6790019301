//! Drumline LUFS - batch loudness measurement for the track library
//!
//! Measures integrated loudness (ITU-R BS.1770-4) for many audio files at
//! once and reports the playback gain each one needs. Files whose loudness
//! cannot be determined get no gain, so they play at default volume.

pub mod analysis;
pub mod config;
pub mod error;
pub mod report;

pub use analysis::{analyze_files, measure_file, TrackReport, TrackStatus};
pub use config::{CliConfig, OutputFormat};
pub use error::{CliError, Result};
