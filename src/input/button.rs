//! Debounced encoder push-switch edge detection.
//!
//! The switch is active-low with a pull-up: raw LOW = pressed.  The main
//! loop polls the raw level every iteration; a level change is accepted
//! only if at least the debounce interval has elapsed since the last
//! accepted transition, so mechanical chatter inside that window collapses
//! into a single event.
//!
//! Millisecond arithmetic is wrapping u32, good for 49-day uptimes.

/// Classified switch events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Input transitioned to active-low.
    Press,
    /// Input returned to the released (pulled-up) level.
    Release,
}

impl ButtonEvent {
    /// The wire name used in the button telemetry payload.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Press => "press",
            Self::Release => "release",
        }
    }
}

/// Poll-driven debouncer for a single active-low switch.
pub struct ButtonDebouncer {
    /// Minimum interval between accepted transitions.
    debounce_ms: u32,
    /// Last accepted raw level (true = released, matching the pull-up idle).
    last_level: bool,
    /// Timestamp of the last accepted transition.
    last_change_ms: u32,
}

impl ButtonDebouncer {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            last_level: true,
            last_change_ms: 0,
        }
    }

    /// Feed one raw level sample.  `raw_high` is the undebounced pin level
    /// (HIGH = released).  Returns an event on each accepted edge; exactly
    /// one event fires per qualifying level change.
    pub fn poll(&mut self, raw_high: bool, now_ms: u32) -> Option<ButtonEvent> {
        if raw_high == self.last_level {
            return None;
        }
        if now_ms.wrapping_sub(self.last_change_ms) < self.debounce_ms {
            return None;
        }
        self.last_level = raw_high;
        self.last_change_ms = now_ms;
        Some(if raw_high {
            ButtonEvent::Release
        } else {
            ButtonEvent::Press
        })
    }

    /// Whether the switch is currently held (debounced view).
    pub fn is_pressed(&self) -> bool {
        !self.last_level
    }
}
