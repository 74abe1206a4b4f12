//! Direct-form-I biquad (2nd-order IIR) section.
//!
//! `y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] − a1·y[n-1] − a2·y[n-2]`
//!
//! Coefficients are plain data supplied through [`NodeConfig`](crate::config::NodeConfig)
//! rather than hardcoded in the algorithm, so the band split can be retuned
//! per deployment without touching DSP code.

use serde::{Deserialize, Serialize};

/// The five coefficients of a normalised (a0 = 1) biquad section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

/// One biquad filter instance: coefficients plus 2 samples of input/output
/// history. Each band of the feature extractor owns its own instance.
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let c = &self.coeffs;
        let y = c.b0 * x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }

    /// Zero the filter history (coefficients are kept).
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Identity section: b0 = 1, everything else 0.
    const PASSTHROUGH: BiquadCoeffs = BiquadCoeffs {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    #[test]
    fn passthrough_is_identity() {
        let mut f = Biquad::new(PASSTHROUGH);
        for x in [0.0, 0.5, -1.0, 0.25] {
            assert!((f.process(x) - x).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_input_yields_zero_output() {
        let mut f = Biquad::new(crate::config::NodeConfig::default().band_low);
        for _ in 0..64 {
            assert_eq!(f.process(0.0), 0.0);
        }
    }

    #[test]
    fn lowpass_passes_dc() {
        // A unit step through the 300 Hz lowpass must settle near 1.0.
        let mut f = Biquad::new(crate::config::NodeConfig::default().band_low);
        let mut y = 0.0;
        for _ in 0..4000 {
            y = f.process(1.0);
        }
        assert!((y - 1.0).abs() < 0.01, "DC gain should be ~1, got {y}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut f = Biquad::new(crate::config::NodeConfig::default().band_high);
        let mut y = 1.0;
        for _ in 0..4000 {
            y = f.process(1.0);
        }
        assert!(y.abs() < 0.01, "DC should be rejected, got {y}");
    }

    #[test]
    fn reset_clears_history() {
        let mut f = Biquad::new(crate::config::NodeConfig::default().band_low);
        for _ in 0..16 {
            f.process(1.0);
        }
        f.reset();
        assert_eq!(f.process(0.0), 0.0);
    }
}
