//! ITU-R BS.1770-4 / EBU R128 compliance tests
//!
//! Key reference points:
//! - 997 Hz sine at 0 dBFS in one channel = -3.01 LKFS
//! - Gating thresholds: -70 LKFS absolute, -10 LU relative
//! - 400 ms blocks with 75% overlap

use drumline_loudness::{
    measure, measure_source, InterleavedBuffer, LoudnessError, SILENCE_LUFS,
};
use std::f64::consts::PI;

// ============================================================================
// Test Signal Generators
// ============================================================================

/// Sine wave at the IEC 61606 reference frequency, same signal on every channel
fn generate_sine_wave(
    sample_rate: u32,
    channels: usize,
    frequency_hz: f64,
    amplitude_linear: f64,
    duration_secs: f64,
) -> Vec<f32> {
    let num_frames = (f64::from(sample_rate) * duration_secs) as usize;
    let mut samples = Vec::with_capacity(num_frames * channels);

    for i in 0..num_frames {
        let t = i as f64 / f64::from(sample_rate);
        let sample = (amplitude_linear * (2.0 * PI * frequency_hz * t).sin()) as f32;
        for _ in 0..channels {
            samples.push(sample);
        }
    }

    samples
}

fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

fn lufs_of(samples: Vec<f32>, sample_rate: u32, channels: usize) -> f64 {
    let mut source = InterleavedBuffer::new(samples, sample_rate, channels);
    measure(&mut source).unwrap()
}

// ============================================================================
// Reference Levels
// ============================================================================

#[test]
fn test_reference_tone_48k_mono() {
    // -20 dBFS 997 Hz in one channel reads -23.01 LUFS
    let samples = generate_sine_wave(48000, 1, 997.0, db_to_linear(-20.0), 3.0);
    let lufs = lufs_of(samples, 48000, 1);
    assert!(
        (lufs - -23.01).abs() < 0.1,
        "Expected -23.01 LUFS, got {:.3}",
        lufs
    );
}

#[test]
fn test_full_scale_tone_48k() {
    let samples = generate_sine_wave(48000, 1, 997.0, 1.0, 2.0);
    let lufs = lufs_of(samples, 48000, 1);
    assert!(
        (lufs - -3.01).abs() < 0.1,
        "Expected -3.01 LUFS, got {:.3}",
        lufs
    );
}

#[test]
fn test_reference_tone_44k() {
    let samples = generate_sine_wave(44100, 1, 997.0, db_to_linear(-20.0), 3.0);
    let lufs = lufs_of(samples, 44100, 1);
    assert!(
        (lufs - -23.01).abs() < 0.1,
        "Expected -23.01 LUFS, got {:.3}",
        lufs
    );
}

#[test]
fn test_rates_agree() {
    let at_48k = lufs_of(generate_sine_wave(48000, 2, 997.0, 0.25, 3.0), 48000, 2);
    let at_44k = lufs_of(generate_sine_wave(44100, 2, 997.0, 0.25, 3.0), 44100, 2);
    assert!(
        (at_48k - at_44k).abs() < 0.1,
        "48k {:.3} vs 44.1k {:.3}",
        at_48k,
        at_44k
    );
}

#[test]
fn test_level_linearity() {
    // 10 dB less signal is 10 LU less loudness
    let loud = lufs_of(generate_sine_wave(48000, 1, 997.0, db_to_linear(-10.0), 2.0), 48000, 1);
    let quiet = lufs_of(generate_sine_wave(48000, 1, 997.0, db_to_linear(-20.0), 2.0), 48000, 1);
    assert!(
        ((loud - quiet) - 10.0).abs() < 0.01,
        "loud {:.3}, quiet {:.3}",
        loud,
        quiet
    );
}

#[test]
fn test_low_frequencies_are_attenuated() {
    // RLB high-pass rolls off below ~100 Hz
    let mid = lufs_of(generate_sine_wave(48000, 1, 1000.0, 0.5, 2.0), 48000, 1);
    let low = lufs_of(generate_sine_wave(48000, 1, 30.0, 0.5, 2.0), 48000, 1);
    assert!(low < mid - 5.0, "30 Hz {:.2} vs 1 kHz {:.2}", low, mid);
}

#[test]
fn test_high_frequencies_are_boosted() {
    // The head shelf lifts high frequencies by several dB
    let mid = lufs_of(generate_sine_wave(48000, 1, 1000.0, 0.5, 2.0), 48000, 1);
    let high = lufs_of(generate_sine_wave(48000, 1, 8000.0, 0.5, 2.0), 48000, 1);
    assert!(high > mid + 2.5, "8 kHz {:.2} vs 1 kHz {:.2}", high, mid);
}

#[test]
fn test_three_channels_sum_power() {
    let mono = lufs_of(generate_sine_wave(48000, 1, 997.0, 0.1, 2.0), 48000, 1);
    let three = lufs_of(generate_sine_wave(48000, 3, 997.0, 0.1, 2.0), 48000, 3);
    let expected = 10.0 * 3.0_f64.log10();
    assert!(((three - mono) - expected).abs() < 0.01);
}

// ============================================================================
// Silence and Short Input
// ============================================================================

#[test]
fn test_silence_is_below_absolute_gate() {
    let lufs = lufs_of(vec![0.0; 48000 * 2 * 2], 48000, 2);
    assert!(lufs == SILENCE_LUFS || lufs <= -70.0, "got {}", lufs);
    assert_eq!(lufs, f64::NEG_INFINITY);
}

#[test]
fn test_very_quiet_audio_is_gated_out() {
    // -90 dBFS is below the -70 LUFS absolute gate
    let lufs = lufs_of(generate_sine_wave(48000, 1, 997.0, db_to_linear(-90.0), 2.0), 48000, 1);
    assert_eq!(lufs, f64::NEG_INFINITY);
}

#[test]
fn test_shorter_than_one_block_is_sentinel() {
    for duration in [0.0, 0.05, 0.1, 0.2, 0.35] {
        let samples = generate_sine_wave(48000, 2, 997.0, 0.5, duration);
        assert_eq!(
            lufs_of(samples, 48000, 2),
            SILENCE_LUFS,
            "{}s should be too short to measure",
            duration
        );
    }
}

#[test]
fn test_empty_stream_is_sentinel() {
    let report = measure_source(&mut InterleavedBuffer::new(Vec::new(), 44100, 2)).unwrap();
    assert_eq!(report.integrated_lufs, SILENCE_LUFS);
    assert_eq!(report.segments, 0);
    assert!(report.is_silent());
}

// ============================================================================
// Format Validation
// ============================================================================

#[test]
fn test_unsupported_sample_rates() {
    for rate in [8000, 22050, 32000, 88200, 96000] {
        let mut source = InterleavedBuffer::new(vec![0.1; 1000], rate, 2);
        assert!(matches!(
            measure(&mut source),
            Err(LoudnessError::UnsupportedSampleRate(r)) if r == rate
        ));
    }
}

#[test]
fn test_unsupported_channel_layouts() {
    for channels in [4, 6, 8] {
        let mut source = InterleavedBuffer::new(vec![0.1; 4800 * channels], 48000, channels);
        assert!(matches!(
            measure(&mut source),
            Err(LoudnessError::UnsupportedChannelLayout(c)) if c == channels
        ));
    }
}

#[test]
fn test_zero_channels_is_sentinel_even_at_odd_rate() {
    let mut source = InterleavedBuffer::new(Vec::new(), 96000, 0);
    assert_eq!(measure(&mut source).unwrap(), SILENCE_LUFS);
}

// ============================================================================
// Gating
// ============================================================================

#[test]
fn test_quiet_passage_is_relative_gated() {
    // 4 s at -20 dBFS then 4 s at -50 dBFS: the quiet part sits far below
    // the relative gate and barely moves the result
    let mut samples = generate_sine_wave(48000, 1, 997.0, db_to_linear(-20.0), 4.0);
    samples.extend(generate_sine_wave(48000, 1, 997.0, db_to_linear(-50.0), 4.0));

    let report = measure_source(&mut InterleavedBuffer::new(samples, 48000, 1)).unwrap();
    assert!(
        (report.integrated_lufs - -23.01).abs() < 0.3,
        "got {:.3}",
        report.integrated_lufs
    );
    assert!(report.blocks_counted < report.blocks);
    assert!(report.absolute_gated_lufs < report.integrated_lufs);
}

#[test]
fn test_report_counts() {
    let samples = generate_sine_wave(48000, 2, 997.0, 0.1, 2.0);
    let report = measure_source(&mut InterleavedBuffer::new(samples, 48000, 2)).unwrap();
    assert_eq!(report.segments, 20);
    assert_eq!(report.blocks, 17);
    assert_eq!(report.blocks_counted, 17);
    assert_eq!(report.sample_rate, 48000);
    assert_eq!(report.channels, 2);
    assert!((report.duration_seconds - 2.0).abs() < 1e-9);
}
