//! Precomputed K-weighting filter coefficients
//!
//! Only 44.1 kHz and 48 kHz are supported. The 48 kHz values are the table
//! values of ITU-R BS.1770-4; the 44.1 kHz values are the bilinear-transform
//! results published with libebur128. No filter design happens at runtime.

use crate::error::{LoudnessError, Result};

/// Sample rates with a coefficient table
pub const SUPPORTED_SAMPLE_RATES: [u32; 2] = [44100, 48000];

/// Coefficients of one 2nd-order IIR stage
///
/// `b` holds the feed-forward taps for `x[n]`, `x[n-1]`, `x[n-2]`.
/// `a` holds the feedback taps for `y[n-1]`, `y[n-2]`; they are subtracted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b: [f64; 3],
    pub a: [f64; 2],
}

/// Both stages of the K-weighting curve for one sample rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KWeightingCoefficients {
    /// Stage 1: high-shelf modelling the acoustic effect of the head
    pub head: BiquadCoefficients,
    /// Stage 2: RLB high-pass
    pub high_pass: BiquadCoefficients,
}

const HEAD_48000: BiquadCoefficients = BiquadCoefficients {
    b: [1.53512485958697, -2.69169618940638, 1.19839281085285],
    a: [-1.69065929318241, 0.73248077421585],
};

const HIGH_PASS_48000: BiquadCoefficients = BiquadCoefficients {
    b: [1.0, -2.0, 1.0],
    a: [-1.99004745483398, 0.99007225036621],
};

const HEAD_44100: BiquadCoefficients = BiquadCoefficients {
    b: [1.5308412300503478, -2.6509799951547297, 1.1690790799215869],
    a: [-1.6636551132560204, 0.7125954280732254],
};

const HIGH_PASS_44100: BiquadCoefficients = BiquadCoefficients {
    b: [1.0, -2.0, 1.0],
    a: [-1.9891696736297957, 0.9891990357870394],
};

impl KWeightingCoefficients {
    /// Select the coefficient set for a sample rate
    ///
    /// # Errors
    /// Returns [`LoudnessError::UnsupportedSampleRate`] for any rate other
    /// than 44100 or 48000 Hz.
    pub fn for_sample_rate(sample_rate: u32) -> Result<Self> {
        match sample_rate {
            48000 => Ok(Self {
                head: HEAD_48000,
                high_pass: HIGH_PASS_48000,
            }),
            44100 => Ok(Self {
                head: HEAD_44100,
                high_pass: HIGH_PASS_44100,
            }),
            other => Err(LoudnessError::UnsupportedSampleRate(other)),
        }
    }
}
