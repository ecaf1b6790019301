//! Integrated loudness for Drumline volume normalization
//!
//! This crate provides:
//! - ITU-R BS.1770-4 / EBU R128 integrated loudness (LUFS)
//! - K-weighting with precomputed coefficients for 44.1 and 48 kHz
//! - Two-stage (absolute + relative) block gating
//! - Mapping from measured loudness to playback gain
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │  PcmSource  │ ──► │ K-weighting │ ──► │ 100ms segment│
//! │  (decoder)  │     │ (per chan.) │     │  power sums  │
//! └─────────────┘     └─────────────┘     └──────────────┘
//!                                                │
//!                                                ▼
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ Integrated  │ ◄── │ Abs + rel.  │ ◄── │ 400ms blocks │
//! │    LUFS     │     │   gating    │     │ (75% overlap)│
//! └─────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! Every measurement owns its state; nothing is shared between calls, so
//! tracks can be measured on as many threads as needed.
//!
//! # Example
//!
//! ```ignore
//! use drumline_loudness::{measure, InterleavedBuffer, VolumeNormalizer};
//!
//! let mut source = InterleavedBuffer::new(samples, 48000, 2);
//! let lufs = measure(&mut source)?;
//!
//! let gain = VolumeNormalizer::default().linear_gain(lufs);
//! ```

#![deny(unsafe_code)]

pub mod coefficients;
mod error;
pub mod filter;
pub mod gating;
mod meter;
mod normalizer;
pub mod segment;
mod source;

pub use coefficients::{BiquadCoefficients, KWeightingCoefficients, SUPPORTED_SAMPLE_RATES};
pub use error::{LoudnessError, Result};
pub use filter::KWeightingFilter;
pub use gating::{integrated_loudness, GatedReducer, GatingResult, WindowTable};
pub use meter::{measure, measure_source, segment_frames, LoudnessMeasurement, LoudnessMeter};
pub use normalizer::{is_measurable, NormalizationTarget, VolumeNormalizer};
pub use segment::{SegmentAccumulator, SegmentSums};
pub use source::{InterleavedBuffer, PcmSource};

/// Loudness reported when there is nothing to measure
///
/// Streams with no channels or shorter than one 400 ms block.
pub const SILENCE_LUFS: f64 = 0.0;

/// Highest channel count with defined weighting
pub const MAX_CHANNELS: usize = 3;

/// ReplayGain 2.0 reference loudness level (-18 LUFS)
pub const REPLAYGAIN_REFERENCE_LUFS: f64 = -18.0;

/// EBU R128 broadcast reference level (-23 LUFS)
pub const EBU_R128_BROADCAST_LUFS: f64 = -23.0;

/// Common streaming platform level (-14 LUFS)
pub const EBU_R128_STREAMING_LUFS: f64 = -14.0;

/// Maximum pre-amp gain in dB
pub const MAX_PREAMP_DB: f64 = 12.0;

/// Minimum pre-amp gain in dB
pub const MIN_PREAMP_DB: f64 = -12.0;
