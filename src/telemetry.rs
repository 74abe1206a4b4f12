//! Telemetry payload shapes.
//!
//! Field names and types are the wire contract consumed by the aggregator —
//! do not rename fields without bumping the other side.  Everything carries
//! `ts_ms`, the node-local monotonic millisecond timestamp.

use serde::Serialize;

use crate::config::MAX_PIXELS;
use crate::dsp::features::AudioFeatures;
use crate::occupancy::OccupancyStatus;
use crate::ring::RingState;

/// Coalesced encoder position/delta.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EncoderPayload {
    pub pos: i32,
    /// Delta since the last publish (incremental, not cumulative).
    pub delta: i32,
    pub ts_ms: u64,
}

/// Debounced button edge.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ButtonPayload {
    pub pressed: bool,
    /// `"press"` or `"release"`.
    pub event: &'static str,
    pub ts_ms: u64,
}

/// Smoothed audio features.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AudioPayload {
    pub rms: f32,
    pub zcr: f32,
    pub low: f32,
    pub mid: f32,
    pub high: f32,
    pub ts_ms: u64,
}

impl AudioPayload {
    pub fn new(f: AudioFeatures, ts_ms: u64) -> Self {
        Self {
            rms: f.rms,
            zcr: f.zcr,
            low: f.low,
            mid: f.mid,
            high: f.high,
            ts_ms,
        }
    }
}

/// Occupancy status.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OccupancyPayload {
    pub occupied: bool,
    pub transitions: u32,
    pub activity: f32,
    pub ts_ms: u64,
}

impl OccupancyPayload {
    pub fn new(s: OccupancyStatus, ts_ms: u64) -> Self {
        Self {
            occupied: s.occupied,
            transitions: s.transitions_last_second,
            activity: s.activity_ratio,
            ts_ms,
        }
    }
}

/// Full ring state snapshot for the debug UI.
#[derive(Debug, Clone, Serialize)]
pub struct RingStatePayload {
    pub mode: u8,
    pub brightness: f32,
    pub speed: f32,
    /// Primary colour packed as `0xRRGGBB`.
    pub color: u32,
    pub pixel_count: u8,
    /// Per-pixel colours packed as `0xRRGGBB`.
    pub pixels: heapless::Vec<u32, MAX_PIXELS>,
    pub ts_ms: u64,
}

impl RingStatePayload {
    pub fn new(state: &RingState, ts_ms: u64) -> Self {
        let mut pixels = heapless::Vec::new();
        for p in &state.pixels {
            let _ = pixels.push(p.packed());
        }
        Self {
            mode: state.mode as u8,
            brightness: state.brightness,
            speed: state.speed,
            color: state.color_primary.packed(),
            pixel_count: state.pixels.len() as u8,
            pixels,
            ts_ms,
        }
    }
}

/// Liveness heartbeat.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeartbeatPayload {
    pub ts_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::AnimationEngine;

    #[test]
    fn encoder_payload_shape() {
        let json = serde_json::to_string(&EncoderPayload {
            pos: -3,
            delta: 2,
            ts_ms: 1234,
        })
        .unwrap();
        assert_eq!(json, r#"{"pos":-3,"delta":2,"ts_ms":1234}"#);
    }

    #[test]
    fn button_payload_shape() {
        let json = serde_json::to_string(&ButtonPayload {
            pressed: true,
            event: "press",
            ts_ms: 42,
        })
        .unwrap();
        assert_eq!(json, r#"{"pressed":true,"event":"press","ts_ms":42}"#);
    }

    #[test]
    fn audio_payload_has_all_five_features() {
        let json = serde_json::to_string(&AudioPayload::new(AudioFeatures::default(), 7)).unwrap();
        for key in ["rms", "zcr", "low", "mid", "high", "ts_ms"] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn ring_payload_matches_engine_state() {
        let engine = AnimationEngine::new(8);
        let p = RingStatePayload::new(engine.state(), 99);
        assert_eq!(p.pixel_count, 8);
        assert_eq!(p.pixels.len(), 8);
        assert_eq!(p.mode, 1, "Breathing on the wire is 1");
        assert_eq!(p.ts_ms, 99);
    }

    #[test]
    fn occupancy_payload_field_names() {
        let s = OccupancyStatus {
            occupied: true,
            transitions_last_second: 3,
            activity_ratio: 0.25,
        };
        let json = serde_json::to_string(&OccupancyPayload::new(s, 5)).unwrap();
        assert_eq!(
            json,
            r#"{"occupied":true,"transitions":3,"activity":0.25,"ts_ms":5}"#
        );
    }
}
