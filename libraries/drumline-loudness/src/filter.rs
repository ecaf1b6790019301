//! Cascaded K-weighting filter
//!
//! Direct-form IIR recurrence, one instance per channel:
//!
//! ```text
//! y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a0*y[n-1] - a1*y[n-2]
//! ```
//!
//! The head stage runs first and its output feeds the high-pass stage.
//! State is continuous for the whole channel and is never reset mid-stream.

use crate::coefficients::{BiquadCoefficients, KWeightingCoefficients};

/// Delay line of one 2nd-order stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BiquadState {
    /// Run one sample through the stage and advance the delay line
    #[inline]
    pub fn process(&mut self, coeffs: &BiquadCoefficients, x: f64) -> f64 {
        let y = coeffs.b[0] * x + coeffs.b[1] * self.x1 + coeffs.b[2] * self.x2
            - coeffs.a[0] * self.y1
            - coeffs.a[1] * self.y2;

        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;

        y
    }
}

/// K-weighting filter for a single channel
#[derive(Debug, Clone)]
pub struct KWeightingFilter {
    coeffs: KWeightingCoefficients,
    head: BiquadState,
    high_pass: BiquadState,
}

impl KWeightingFilter {
    pub fn new(coeffs: KWeightingCoefficients) -> Self {
        Self {
            coeffs,
            head: BiquadState::default(),
            high_pass: BiquadState::default(),
        }
    }

    /// Filter one raw sample
    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        let shelved = self.head.process(&self.coeffs.head, x);
        self.high_pass.process(&self.coeffs.high_pass, shelved)
    }
}
