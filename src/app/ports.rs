//! Port traits — the hexagonal boundary between the signal/animation core
//! and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (the I2S mic, PIR GPIO, NeoPixel strip, MQTT bus, board
//! clock) implement these traits; the service consumes them via generics
//! and never touches hardware directly.  Every port is non-blocking: slow
//! acquisitions must use bounded waits and fail soft, and `publish` is
//! contractually best-effort.

use crate::error::SensorError;
use crate::ring::hsv::Rgb;

// ───────────────────────────────────────────────────────────────
// Bus (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

/// Outbound telemetry.  `publish` must not block; it returns `false` when
/// the payload was dropped (not connected, queue full).  Delivery is
/// best-effort by contract — callers never retry.
pub trait BusPort {
    fn publish(&mut self, topic: &str, payload: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Sensors (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Audio block acquisition.  Implementations wait at most a few
/// milliseconds for DMA data; on timeout or driver error they return `Err`
/// and the feature extractor keeps its previous output.
pub trait AudioSourcePort {
    /// Fill `buf` with captured samples; returns the number delivered,
    /// which may be less than `buf.len()`.
    fn read_block(&mut self, buf: &mut [i32]) -> Result<usize, SensorError>;
}

/// Raw PIR motion level.
pub trait MotionSensePort {
    fn motion(&mut self) -> bool;
}

/// Raw encoder push-switch level (HIGH = released, pull-up idle).
pub trait SwitchSensePort {
    fn switch_high(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// LED strip (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Pushes a rendered frame to the physical ring.
pub trait LedStripPort {
    fn show(&mut self, pixels: &[Rgb]);
}
