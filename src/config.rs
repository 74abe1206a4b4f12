//! System configuration parameters
//!
//! All tunable parameters for a ringnode: identity, LED geometry, audio
//! capture, PIR windowing, debounce and the fixed task periods of the
//! cooperative loop.  Supplied once at construction time — nothing in the
//! core mutates configuration at runtime.

use serde::{Deserialize, Serialize};

use crate::dsp::biquad::BiquadCoeffs;

/// Upper bound on the physical LED count — sizes the pixel buffer capacity.
pub const MAX_PIXELS: usize = 64;

/// Upper bound on the PIR activity window — sizes the history capacity.
pub const MAX_WINDOW: usize = 256;

/// Upper bound on the audio block length — sizes the acquisition buffer.
pub const MAX_AUDIO_BLOCK: usize = 1024;

/// Core node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Identity (topic namespace) ---
    /// House identifier (first topic segment after the fixed prefix).
    pub house_id: heapless::String<16>,
    /// Node identifier within the house.
    pub node_id: heapless::String<16>,

    // --- Ring ---
    /// Number of physical LEDs on the ring.
    pub led_count: usize,

    // --- Audio ---
    /// I2S capture rate in Hz.
    pub sample_rate_hz: u32,
    /// Samples per captured block (32-bit containers, 24-bit left-justified).
    pub audio_block_len: usize,
    /// Low band (~300 Hz lowpass) biquad coefficients.
    pub band_low: BiquadCoeffs,
    /// Mid band (band-limited pass around 1 kHz) biquad coefficients.
    pub band_mid: BiquadCoeffs,
    /// High band (~3 kHz highpass) biquad coefficients.
    pub band_high: BiquadCoeffs,

    // --- Occupancy ---
    /// PIR activity window size in samples (window duration = W × tick period).
    pub pir_window: usize,

    // --- Input ---
    /// Encoder push-switch debounce interval (milliseconds).
    pub button_debounce_ms: u32,

    // --- Timing (task periods, milliseconds) ---
    /// Audio feature extraction period.
    pub audio_period_ms: u32,
    /// Occupancy tick period.
    pub occupancy_period_ms: u32,
    /// Animation render period (20 ms = 50 Hz).
    pub render_period_ms: u32,
    /// Ring-state telemetry publish period.
    pub ring_publish_period_ms: u32,
    /// Heartbeat period.
    pub heartbeat_period_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            house_id: heapless::String::try_from("houseA").unwrap_or_default(),
            node_id: heapless::String::try_from("node").unwrap_or_default(),

            led_count: 24,

            sample_rate_hz: 16_000,
            audio_block_len: 1024,
            // Butterworth-style 2nd-order sections designed for fs = 16 kHz.
            band_low: BiquadCoeffs {
                b0: 3.199_829e-3,
                b1: 6.399_658e-3,
                b2: 3.199_829e-3,
                a1: -1.833_732_7,
                a2: 0.846_532,
            },
            band_mid: BiquadCoeffs {
                b0: 0.212_994_36,
                b1: 0.0,
                b2: -0.212_994_36,
                a1: -1.454_196_8,
                a2: 0.574_011_3,
            },
            band_high: BiquadCoeffs {
                b0: 0.418_163_35,
                b1: -0.836_326_7,
                b2: 0.418_163_35,
                a1: -0.462_938_03,
                a2: 0.209_715_36,
            },

            pir_window: 100,

            button_debounce_ms: 25,

            audio_period_ms: 100,
            occupancy_period_ms: 100,
            render_period_ms: 20,
            ring_publish_period_ms: 200,
            heartbeat_period_ms: 5000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = NodeConfig::default();
        assert!(c.led_count > 0 && c.led_count <= MAX_PIXELS);
        assert!(c.pir_window > 0 && c.pir_window <= MAX_WINDOW);
        assert!(c.audio_block_len > 0 && c.audio_block_len <= MAX_AUDIO_BLOCK);
        assert_eq!(c.sample_rate_hz, 16_000);
        assert!(c.render_period_ms < c.ring_publish_period_ms);
        assert!(c.ring_publish_period_ms < c.heartbeat_period_ms);
    }

    #[test]
    fn serde_roundtrip() {
        let c = NodeConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: NodeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.led_count, c2.led_count);
        assert_eq!(c.pir_window, c2.pir_window);
        assert!((c.band_low.b0 - c2.band_low.b0).abs() < 1e-9);
        assert_eq!(c.house_id, c2.house_id);
    }

    #[test]
    fn band_filters_are_stable() {
        // Poles inside the unit circle: |a2| < 1 and |a1| < 1 + a2.
        for coeffs in [
            NodeConfig::default().band_low,
            NodeConfig::default().band_mid,
            NodeConfig::default().band_high,
        ] {
            assert!(coeffs.a2.abs() < 1.0);
            assert!(coeffs.a1.abs() < 1.0 + coeffs.a2);
        }
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = NodeConfig::default();
        assert!(
            c.render_period_ms <= c.audio_period_ms,
            "render should tick at least as fast as feature extraction"
        );
        let block_ms = c.audio_block_len as u32 * 1000 / c.sample_rate_hz;
        assert!(
            block_ms <= c.audio_period_ms,
            "one audio block must fit inside the audio task period"
        );
    }
}
