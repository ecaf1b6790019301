//! Block loudness and two-stage gating (ITU-R BS.1770-4)
//!
//! Four consecutive 100 ms segments form one 400 ms block; blocks advance by
//! one segment (75% overlap). Integrated loudness averages block power over
//! the blocks that survive an absolute gate at -70 LUFS and then a relative
//! gate 10 LU below the absolute-gated result.

use crate::segment::SegmentSums;

/// Calibration offset of the loudness formula
pub const LOUDNESS_OFFSET: f64 = -0.691;

/// Absolute gate in LUFS
pub const ABSOLUTE_GATE_LUFS: f64 = -70.0;

/// Relative gate in LU below the absolute-gated loudness
pub const RELATIVE_GATE_LU: f64 = -10.0;

/// Segments that make up one block
pub const SEGMENTS_PER_BLOCK: usize = 4;

/// Convert channel-summed mean square power to LUFS
///
/// Zero power maps to negative infinity.
#[inline]
pub fn power_to_lufs(power: f64) -> f64 {
    LOUDNESS_OFFSET + 10.0 * power.log10()
}

/// Mean square power per channel and per 400 ms block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowTable {
    /// `mean_square[channel][window]`
    mean_square: Vec<Vec<f64>>,
}

impl WindowTable {
    /// Build the block table from segment sums
    ///
    /// Fewer than four segments produce an empty table.
    pub fn from_segments(sums: &SegmentSums) -> Self {
        let segments = sums.segment_count();
        if segments < SEGMENTS_PER_BLOCK {
            return Self::default();
        }

        let frames_per_window = (sums.frames_per_segment() * SEGMENTS_PER_BLOCK) as f64;
        let mean_square = (0..sums.channel_count())
            .map(|ch| {
                sums.channel(ch)
                    .windows(SEGMENTS_PER_BLOCK)
                    .map(|w| (w[0] + w[1] + w[2] + w[3]) / frames_per_window)
                    .collect()
            })
            .collect();

        Self { mean_square }
    }

    /// Build a table directly from `[channel][window]` mean squares
    pub fn from_mean_squares(mean_square: Vec<Vec<f64>>) -> Self {
        debug_assert!(mean_square.windows(2).all(|w| w[0].len() == w[1].len()));
        Self { mean_square }
    }

    pub fn window_count(&self) -> usize {
        self.mean_square.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.window_count() == 0
    }

    /// Mean square of one channel in one window
    pub fn mean_square(&self, channel: usize, window: usize) -> f64 {
        self.mean_square[channel][window]
    }

    /// Mean square of a window summed over all channels
    fn window_power(&self, window: usize) -> f64 {
        self.mean_square.iter().map(|ch| ch[window]).sum()
    }

    /// Loudness of every block in LUFS
    pub fn block_loudness(&self) -> Vec<f64> {
        (0..self.window_count())
            .map(|i| power_to_lufs(self.window_power(i)))
            .collect()
    }
}

/// Result of the gating reduction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatingResult {
    /// Loudness of the blocks above the absolute gate
    pub absolute_gated_lufs: f64,
    /// Threshold used by the second pass
    pub relative_gate_lufs: f64,
    /// Final integrated loudness
    pub integrated_lufs: f64,
    /// Number of blocks that passed the relative gate
    pub blocks_counted: usize,
}

/// Two-pass gating over a block table
#[derive(Debug)]
pub struct GatedReducer<'a> {
    table: &'a WindowTable,
    block_loudness: Vec<f64>,
}

impl<'a> GatedReducer<'a> {
    pub fn new(table: &'a WindowTable) -> Self {
        Self {
            table,
            block_loudness: table.block_loudness(),
        }
    }

    /// Block loudness values in window order
    pub fn block_loudness(&self) -> &[f64] {
        &self.block_loudness
    }

    /// Loudness of the blocks strictly louder than `threshold`
    ///
    /// Returns negative infinity when no block passes.
    pub fn gated_loudness(&self, threshold: f64) -> f64 {
        self.gated_power(threshold).0
    }

    fn gated_power(&self, threshold: f64) -> (f64, usize) {
        let (sum, count) = self
            .block_loudness
            .iter()
            .enumerate()
            .filter(|(_, loudness)| **loudness > threshold)
            .fold((0.0, 0_usize), |(sum, count), (i, _)| {
                (sum + self.table.window_power(i), count + 1)
            });

        if count == 0 {
            return (f64::NEG_INFINITY, 0);
        }
        (power_to_lufs(sum / count as f64), count)
    }

    /// Run both gating passes
    pub fn reduce(&self) -> GatingResult {
        let absolute_gated_lufs = self.gated_loudness(ABSOLUTE_GATE_LUFS);
        let relative_gate_lufs = (absolute_gated_lufs + RELATIVE_GATE_LU).max(ABSOLUTE_GATE_LUFS);
        let (integrated_lufs, blocks_counted) = self.gated_power(relative_gate_lufs);

        GatingResult {
            absolute_gated_lufs,
            relative_gate_lufs,
            integrated_lufs,
            blocks_counted,
        }
    }
}

/// Integrated loudness of a block table
pub fn integrated_loudness(table: &WindowTable) -> f64 {
    GatedReducer::new(table).reduce().integrated_lufs
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mean square that maps to `lufs` for a single channel
    fn power_for(lufs: f64) -> f64 {
        10.0_f64.powf((lufs - LOUDNESS_OFFSET) / 10.0)
    }

    #[test]
    fn test_power_to_lufs() {
        assert!((power_to_lufs(1.0) - LOUDNESS_OFFSET).abs() < 1e-12);
        assert!((power_to_lufs(0.1) - (LOUDNESS_OFFSET - 10.0)).abs() < 1e-12);
        assert_eq!(power_to_lufs(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_window_count_is_segments_minus_three() {
        for segments in 4..12 {
            let sums = SegmentSums::from_channels(vec![vec![1.0; segments]; 2], 4800);
            let table = WindowTable::from_segments(&sums);
            assert_eq!(table.window_count(), segments - 3);
        }
    }

    #[test]
    fn test_short_input_gives_empty_table() {
        for segments in 0..4 {
            let sums = SegmentSums::from_channels(vec![vec![1.0; segments]], 4800);
            assert!(WindowTable::from_segments(&sums).is_empty());
        }
    }

    #[test]
    fn test_mean_square_formula() {
        let sums = SegmentSums::from_channels(vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]], 100);
        let table = WindowTable::from_segments(&sums);
        assert_eq!(table.mean_square(0, 0), 10.0 / 400.0);
        assert_eq!(table.mean_square(0, 1), 14.0 / 400.0);
    }

    #[test]
    fn test_block_loudness_sums_channels() {
        let table = WindowTable::from_mean_squares(vec![vec![0.25], vec![0.25]]);
        let blocks = table.block_loudness();
        assert!((blocks[0] - power_to_lufs(0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_constant_signal_is_its_own_loudness() {
        let p = power_for(-20.0);
        let table = WindowTable::from_mean_squares(vec![vec![p; 25]]);
        let result = GatedReducer::new(&table).reduce();
        assert!((result.integrated_lufs - -20.0).abs() < 1e-9);
        assert!((result.relative_gate_lufs - -30.0).abs() < 1e-9);
        assert_eq!(result.blocks_counted, 25);
    }

    #[test]
    fn test_relative_gate_drops_quiet_blocks() {
        // 10 blocks at -20, 10 blocks at -40 (below the relative gate)
        let mut ms = vec![power_for(-20.0); 10];
        ms.extend(vec![power_for(-40.0); 10]);
        let table = WindowTable::from_mean_squares(vec![ms]);

        let result = GatedReducer::new(&table).reduce();
        // Absolute-gated result is pulled down by the quiet half
        assert!(result.absolute_gated_lufs < -20.0);
        assert!((result.integrated_lufs - -20.0).abs() < 1e-9);
        assert_eq!(result.blocks_counted, 10);
    }

    #[test]
    fn test_relative_gate_never_below_absolute() {
        let table = WindowTable::from_mean_squares(vec![vec![power_for(-65.0); 8]]);
        let result = GatedReducer::new(&table).reduce();
        assert_eq!(result.relative_gate_lufs, ABSOLUTE_GATE_LUFS);
        assert!((result.integrated_lufs - -65.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_block_passes_gate() {
        let table = WindowTable::from_mean_squares(vec![vec![0.0; 10]]);
        let result = GatedReducer::new(&table).reduce();
        assert_eq!(result.absolute_gated_lufs, f64::NEG_INFINITY);
        assert_eq!(result.relative_gate_lufs, ABSOLUTE_GATE_LUFS);
        assert_eq!(result.integrated_lufs, f64::NEG_INFINITY);
        assert_eq!(result.blocks_counted, 0);
    }

    #[test]
    fn test_gate_is_strict() {
        let table = WindowTable::from_mean_squares(vec![vec![power_for(-70.0); 4]]);
        let reducer = GatedReducer::new(&table);
        // Blocks exactly at the threshold do not pass
        let at = reducer.block_loudness()[0];
        assert_eq!(reducer.gated_loudness(at), f64::NEG_INFINITY);
    }
}
