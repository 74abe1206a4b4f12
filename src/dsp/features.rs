//! Audio feature extraction over captured I2S blocks.
//!
//! The mic delivers 24-bit left-justified PCM in signed 32-bit containers
//! at 16 kHz.  Per block this module computes loudness (RMS), zero-crossing
//! ratio, and three band energies through independent biquad sections, then
//! folds each instant value into a one-pole smoothed running feature:
//!
//! `smoothed = 0.85·smoothed + 0.15·instant`
//!
//! RMS accumulation uses f64 so long blocks don't drift; everything exposed
//! is f32.  A failed or empty acquisition returns the previous smoothed
//! features unchanged — a flaky mic must never disturb the render loop.

use log::debug;

use crate::dsp::biquad::{Biquad, BiquadCoeffs};
use crate::error::SensorError;

/// Smoothing factor: weight of the previous smoothed value.
const SMOOTHING: f32 = 0.85;

/// Normalisation divisor for 24-bit samples.
const FULL_SCALE_24BIT: f32 = 8_388_608.0; // 2^23

/// Exponentially smoothed per-block audio features, all roughly in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioFeatures {
    /// Overall loudness.
    pub rms: f32,
    /// Zero-crossing ratio: crossings / sample count.
    pub zcr: f32,
    /// ~300 Hz lowpass band energy.
    pub low: f32,
    /// Band-limited mid energy.
    pub mid: f32,
    /// ~3 kHz highpass band energy.
    pub high: f32,
}

/// Owns the smoothing state and the three per-band filter histories.
pub struct AudioFeatureExtractor {
    band_low: Biquad,
    band_mid: Biquad,
    band_high: Biquad,
    smoothed: AudioFeatures,
}

impl AudioFeatureExtractor {
    pub fn new(low: BiquadCoeffs, mid: BiquadCoeffs, high: BiquadCoeffs) -> Self {
        Self {
            band_low: Biquad::new(low),
            band_mid: Biquad::new(mid),
            band_high: Biquad::new(high),
            smoothed: AudioFeatures::default(),
        }
    }

    /// Process one captured block and return the updated smoothed features.
    ///
    /// An empty block is treated as a short read: the previous features are
    /// returned untouched and no smoothing step happens.
    pub fn process(&mut self, block: &[i32]) -> AudioFeatures {
        if block.is_empty() {
            return self.smoothed;
        }

        let n = block.len();
        let mut sum_sq = 0.0f64;
        let mut sum_sq_low = 0.0f64;
        let mut sum_sq_mid = 0.0f64;
        let mut sum_sq_high = 0.0f64;
        let mut crossings = 0usize;
        let mut prev_positive = false;
        let mut have_prev = false;

        for &raw in block {
            // 24-bit left-justified in a 32-bit container.
            let sample = (raw >> 8) as f32 / FULL_SCALE_24BIT;

            sum_sq += f64::from(sample) * f64::from(sample);

            let positive = sample >= 0.0;
            if have_prev && positive != prev_positive {
                crossings += 1;
            }
            prev_positive = positive;
            have_prev = true;

            let lo = self.band_low.process(sample);
            let mi = self.band_mid.process(sample);
            let hi = self.band_high.process(sample);
            sum_sq_low += f64::from(lo) * f64::from(lo);
            sum_sq_mid += f64::from(mi) * f64::from(mi);
            sum_sq_high += f64::from(hi) * f64::from(hi);
        }

        let inv_n = 1.0 / n as f64;
        let instant = AudioFeatures {
            rms: (sum_sq * inv_n).sqrt() as f32,
            zcr: crossings as f32 / n as f32,
            low: (sum_sq_low * inv_n).sqrt() as f32,
            mid: (sum_sq_mid * inv_n).sqrt() as f32,
            high: (sum_sq_high * inv_n).sqrt() as f32,
        };

        self.smoothed = AudioFeatures {
            rms: SMOOTHING * self.smoothed.rms + (1.0 - SMOOTHING) * instant.rms,
            zcr: SMOOTHING * self.smoothed.zcr + (1.0 - SMOOTHING) * instant.zcr,
            low: SMOOTHING * self.smoothed.low + (1.0 - SMOOTHING) * instant.low,
            mid: SMOOTHING * self.smoothed.mid + (1.0 - SMOOTHING) * instant.mid,
            high: SMOOTHING * self.smoothed.high + (1.0 - SMOOTHING) * instant.high,
        };
        self.smoothed
    }

    /// Fold an acquisition result into the feature stream.  On any error the
    /// previous smoothed features are returned unchanged (fail-soft).
    pub fn process_acquisition(
        &mut self,
        acquired: Result<&[i32], SensorError>,
    ) -> AudioFeatures {
        match acquired {
            Ok(block) => self.process(block),
            Err(e) => {
                debug!("audio acquisition failed ({e}), keeping previous features");
                self.smoothed
            }
        }
    }

    /// The current smoothed features without processing anything.
    pub fn features(&self) -> AudioFeatures {
        self.smoothed
    }
}
