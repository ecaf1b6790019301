//! 100 ms segment power accumulation
//!
//! Decoder chunks arrive in arbitrary sizes, possibly splitting a frame.
//! The accumulator tracks its position in the interleaved stream itself so
//! segment boundaries (and filter state) are independent of chunking.

use crate::coefficients::KWeightingCoefficients;
use crate::filter::KWeightingFilter;

/// Segments per second (100 ms segments)
pub const SEGMENTS_PER_SECOND: u32 = 10;

/// Per-channel sums of squared K-weighted samples, one entry per segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentSums {
    channels: Vec<Vec<f64>>,
    frames_per_segment: usize,
}

impl SegmentSums {
    /// Build from precomputed per-channel sums
    ///
    /// All channels must hold the same number of segments.
    pub fn from_channels(channels: Vec<Vec<f64>>, frames_per_segment: usize) -> Self {
        debug_assert!(channels.windows(2).all(|w| w[0].len() == w[1].len()));
        Self {
            channels,
            frames_per_segment,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of complete segments (identical for every channel)
    pub fn segment_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn frames_per_segment(&self) -> usize {
        self.frames_per_segment
    }

    /// Segment sums of one channel
    pub fn channel(&self, index: usize) -> &[f64] {
        &self.channels[index]
    }
}

/// Filters interleaved samples and sums their power per segment and channel
#[derive(Debug, Clone)]
pub struct SegmentAccumulator {
    filters: Vec<KWeightingFilter>,
    running: Vec<f64>,
    sums: Vec<Vec<f64>>,
    frames_per_segment: usize,
    /// Channel the next incoming sample belongs to
    channel_cursor: usize,
    /// Complete frames seen in the current segment
    frame_cursor: usize,
    frames_total: u64,
}

impl SegmentAccumulator {
    /// Create an accumulator with fresh filter state for every channel
    pub fn new(coeffs: KWeightingCoefficients, sample_rate: u32, channels: usize) -> Self {
        Self {
            filters: vec![KWeightingFilter::new(coeffs); channels],
            running: vec![0.0; channels],
            sums: vec![Vec::new(); channels],
            frames_per_segment: (sample_rate / SEGMENTS_PER_SECOND) as usize,
            channel_cursor: 0,
            frame_cursor: 0,
            frames_total: 0,
        }
    }

    /// Feed a chunk of interleaved samples
    pub fn push_interleaved(&mut self, samples: &[f32]) {
        let channels = self.filters.len();
        if channels == 0 {
            return;
        }

        for &sample in samples {
            let ch = self.channel_cursor;
            let filtered = self.filters[ch].process(f64::from(sample));
            self.running[ch] += filtered * filtered;

            self.channel_cursor += 1;
            if self.channel_cursor == channels {
                self.channel_cursor = 0;
                self.frames_total += 1;
                self.frame_cursor += 1;

                if self.frame_cursor == self.frames_per_segment {
                    self.close_segment();
                }
            }
        }
    }

    fn close_segment(&mut self) {
        for (sums, running) in self.sums.iter_mut().zip(self.running.iter_mut()) {
            sums.push(*running);
            *running = 0.0;
        }
        self.frame_cursor = 0;
    }

    /// Complete segments collected so far
    pub fn segment_count(&self) -> usize {
        self.sums.first().map_or(0, Vec::len)
    }

    /// Complete frames pushed so far, including the pending partial segment
    pub fn frames_total(&self) -> u64 {
        self.frames_total
    }

    /// Stop accumulating; the trailing partial segment is dropped
    pub fn finish(self) -> SegmentSums {
        if self.frame_cursor > 0 || self.channel_cursor > 0 {
            tracing::trace!(
                "Discarding partial segment of {} frames",
                self.frame_cursor
            );
        }

        SegmentSums {
            channels: self.sums,
            frames_per_segment: self.frames_per_segment,
        }
    }
}
