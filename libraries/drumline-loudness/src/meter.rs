//! Integrated loudness measurement
//!
//! A [`LoudnessMeter`] is the whole state of one measurement: coefficients,
//! filter delay lines and segment sums. It is built fresh for every stream
//! and consumed by [`LoudnessMeter::finalize`], so concurrent measurements
//! never share intermediate state.

use crate::coefficients::KWeightingCoefficients;
use crate::error::{LoudnessError, Result};
use crate::gating::{GatedReducer, WindowTable};
use crate::segment::{SegmentAccumulator, SEGMENTS_PER_SECOND};
use crate::source::PcmSource;
use crate::{MAX_CHANNELS, SILENCE_LUFS};
use std::fmt;

/// Outcome of one loudness measurement
#[derive(Debug, Clone, PartialEq)]
pub struct LoudnessMeasurement {
    /// Integrated loudness in LUFS
    ///
    /// [`SILENCE_LUFS`] when the stream was shorter than one block or had no
    /// channels; negative infinity when no block passed the gates.
    pub integrated_lufs: f64,

    /// Loudness of the blocks above the absolute gate
    pub absolute_gated_lufs: f64,

    /// Threshold of the second gating pass
    pub relative_gate_lufs: f64,

    /// Complete 100 ms segments analysed
    pub segments: usize,

    /// 400 ms blocks built from the segments
    pub blocks: usize,

    /// Blocks that contributed to the integrated loudness
    pub blocks_counted: usize,

    /// Duration of the frames received, in seconds
    pub duration_seconds: f64,

    pub sample_rate: u32,

    pub channels: usize,
}

impl LoudnessMeasurement {
    fn silent(sample_rate: u32, channels: usize, segments: usize, duration_seconds: f64) -> Self {
        Self {
            integrated_lufs: SILENCE_LUFS,
            absolute_gated_lufs: SILENCE_LUFS,
            relative_gate_lufs: SILENCE_LUFS,
            segments,
            blocks: 0,
            blocks_counted: 0,
            duration_seconds,
            sample_rate,
            channels,
        }
    }

    /// Whether the stream held nothing measurable
    pub fn is_silent(&self) -> bool {
        self.blocks == 0
    }
}

impl fmt::Display for LoudnessMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Integrated: {:.2} LUFS, Gate: {:.2} LUFS, Blocks: {}/{}, Duration: {:.1}s",
            self.integrated_lufs,
            self.relative_gate_lufs,
            self.blocks_counted,
            self.blocks,
            self.duration_seconds
        )
    }
}

/// Streaming loudness meter (ITU-R BS.1770-4)
///
/// # Example
///
/// ```ignore
/// use drumline_loudness::LoudnessMeter;
///
/// let mut meter = LoudnessMeter::new(48000, 2)?;
/// meter.add_frames(&interleaved);
/// let measurement = meter.finalize();
/// println!("{:.1} LUFS", measurement.integrated_lufs);
/// ```
#[derive(Debug, Clone)]
pub struct LoudnessMeter {
    accumulator: SegmentAccumulator,
    sample_rate: u32,
    channels: usize,
}

impl LoudnessMeter {
    /// Create a meter for one stream
    ///
    /// # Errors
    /// [`LoudnessError::UnsupportedChannelLayout`] above 3 channels,
    /// [`LoudnessError::UnsupportedSampleRate`] for rates other than
    /// 44100/48000 Hz.
    pub fn new(sample_rate: u32, channels: usize) -> Result<Self> {
        if channels > MAX_CHANNELS {
            return Err(LoudnessError::UnsupportedChannelLayout(channels));
        }
        let coeffs = KWeightingCoefficients::for_sample_rate(sample_rate)?;

        Ok(Self {
            accumulator: SegmentAccumulator::new(coeffs, sample_rate, channels),
            sample_rate,
            channels,
        })
    }

    /// Feed interleaved samples; chunk boundaries are irrelevant
    pub fn add_frames(&mut self, samples: &[f32]) {
        self.accumulator.push_interleaved(samples);
    }

    /// Complete 100 ms segments so far
    pub fn segments(&self) -> usize {
        self.accumulator.segment_count()
    }

    /// Reduce everything received to integrated loudness
    pub fn finalize(self) -> LoudnessMeasurement {
        let duration_seconds = self.accumulator.frames_total() as f64 / f64::from(self.sample_rate);
        let sums = self.accumulator.finish();
        let segments = sums.segment_count();

        let table = WindowTable::from_segments(&sums);
        if table.is_empty() {
            tracing::debug!(
                "Only {} segments ({:.2}s), reporting silence",
                segments,
                duration_seconds
            );
            return LoudnessMeasurement::silent(
                self.sample_rate,
                self.channels,
                segments,
                duration_seconds,
            );
        }

        let gating = GatedReducer::new(&table).reduce();

        tracing::debug!(
            "Measured {:.2} LUFS over {} blocks ({} counted, relative gate {:.2})",
            gating.integrated_lufs,
            table.window_count(),
            gating.blocks_counted,
            gating.relative_gate_lufs
        );

        LoudnessMeasurement {
            integrated_lufs: gating.integrated_lufs,
            absolute_gated_lufs: gating.absolute_gated_lufs,
            relative_gate_lufs: gating.relative_gate_lufs,
            segments,
            blocks: table.window_count(),
            blocks_counted: gating.blocks_counted,
            duration_seconds,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

/// Measure a whole source and return the full report
///
/// A source with zero channels is reported as silence without being read.
pub fn measure_source<S: PcmSource + ?Sized>(source: &mut S) -> Result<LoudnessMeasurement> {
    let sample_rate = source.sample_rate();
    let channels = source.channels();

    if channels == 0 {
        tracing::debug!("Source has no channels, nothing to measure");
        return Ok(LoudnessMeasurement::silent(sample_rate, 0, 0, 0.0));
    }

    let mut meter = LoudnessMeter::new(sample_rate, channels)?;
    while let Some(chunk) = source.next_chunk()? {
        meter.add_frames(chunk);
        tracing::trace!("{} segments after chunk of {}", meter.segments(), chunk.len());
    }

    Ok(meter.finalize())
}

/// Integrated loudness of a source in LUFS
pub fn measure<S: PcmSource + ?Sized>(source: &mut S) -> Result<f64> {
    measure_source(source).map(|m| m.integrated_lufs)
}

/// Frames in one 100 ms segment at `sample_rate`
pub const fn segment_frames(sample_rate: u32) -> usize {
    (sample_rate / SEGMENTS_PER_SECOND) as usize
}
