//! PIR occupancy tracking.
//!
//! The PIR gives a bare motion level; this module turns it into something a
//! renderer and an aggregator can actually use: a trailing-window activity
//! ratio and a transition counter with a 1-second quiescence reset.
//!
//! Ticked at a fixed rate by the scheduler, independent of the sensor's own
//! retrigger time.  The window is a circular buffer of the last `W` samples,
//! so window duration = `W` × tick period (100 samples at 100 ms = 10 s).

use heapless::Vec;

use crate::config::MAX_WINDOW;

/// Quiet time after which the transition counter resets to zero.
/// A full reset, not a sliding window: the count only ever grows or zeroes.
const TRANSITION_QUIET_MS: u32 = 1000;

/// Point-in-time occupancy status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyStatus {
    /// Raw motion level from the most recent tick.
    pub occupied: bool,
    /// Motion-level transitions since the last quiescence reset.
    pub transitions_last_second: u32,
    /// Fraction of true samples in the window, always in [0, 1].
    pub activity_ratio: f32,
}

/// Windowed occupancy estimator.  Owns its full history; nothing else
/// touches the buffer.
pub struct OccupancyTracker {
    /// Circular sample history.  Pre-filled with `false` at construction so
    /// the ratio is `true_count / W` from the very first tick.
    history: Vec<bool, MAX_WINDOW>,
    /// Next circular write index.
    write_idx: usize,
    last_state: bool,
    last_transition_ms: u32,
    transitions: u32,
}

impl OccupancyTracker {
    /// `window` is clamped to `1..=MAX_WINDOW`.
    pub fn new(window: usize) -> Self {
        let window = window.clamp(1, MAX_WINDOW);
        let mut history = Vec::new();
        for _ in 0..window {
            // Capacity is MAX_WINDOW and window <= MAX_WINDOW.
            let _ = history.push(false);
        }
        Self {
            history,
            write_idx: 0,
            last_state: false,
            last_transition_ms: 0,
            transitions: 0,
        }
    }

    /// Record one fixed-rate sample and return the derived status.
    pub fn tick(&mut self, raw_motion: bool, now_ms: u32) -> OccupancyStatus {
        if raw_motion != self.last_state {
            self.transitions = self.transitions.wrapping_add(1);
            self.last_transition_ms = now_ms;
            self.last_state = raw_motion;
        } else if now_ms.wrapping_sub(self.last_transition_ms) > TRANSITION_QUIET_MS {
            self.transitions = 0;
        }

        self.history[self.write_idx] = raw_motion;
        self.write_idx = (self.write_idx + 1) % self.history.len();

        // Full rescan — W is small, clarity beats a running count here.
        let true_count = self.history.iter().filter(|&&s| s).count();
        let activity_ratio = true_count as f32 / self.history.len() as f32;

        OccupancyStatus {
            occupied: raw_motion,
            transitions_last_second: self.transitions,
            activity_ratio,
        }
    }

    /// Configured window length.
    pub fn window(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_one_after_full_window_of_motion() {
        let mut t = OccupancyTracker::new(100);
        let mut status = t.tick(true, 0);
        for i in 1..100u32 {
            status = t.tick(true, i * 100);
        }
        assert!((status.activity_ratio - 1.0).abs() < f32::EPSILON);
        assert!(status.occupied);
    }

    #[test]
    fn ratio_counts_unwritten_slots_as_false() {
        let mut t = OccupancyTracker::new(100);
        // A single true sample into a fresh window of 100.
        let status = t.tick(true, 0);
        assert!((status.activity_ratio - 0.01).abs() < 1e-6);
    }

    #[test]
    fn ratio_stays_in_unit_interval() {
        let mut t = OccupancyTracker::new(10);
        for i in 0..1000u32 {
            let status = t.tick(i % 3 == 0, i * 37);
            assert!((0.0..=1.0).contains(&status.activity_ratio));
        }
    }

    #[test]
    fn old_samples_fall_out_of_the_window() {
        let mut t = OccupancyTracker::new(4);
        for i in 0..4u32 {
            t.tick(true, i * 100);
        }
        // Four false samples push every true one out.
        let mut status = t.tick(false, 400);
        for i in 5..8u32 {
            status = t.tick(false, i * 100);
        }
        assert_eq!(status.activity_ratio, 0.0);
    }

    #[test]
    fn transitions_accumulate_within_a_second() {
        let mut t = OccupancyTracker::new(16);
        let s1 = t.tick(true, 0); // false -> true
        let s2 = t.tick(false, 300); // true -> false
        let s3 = t.tick(true, 600); // false -> true
        assert_eq!(s1.transitions_last_second, 1);
        assert_eq!(s2.transitions_last_second, 2);
        assert_eq!(s3.transitions_last_second, 3);
    }

    #[test]
    fn counter_resets_after_a_quiet_second() {
        let mut t = OccupancyTracker::new(16);
        t.tick(true, 0);
        t.tick(false, 100);
        // Quiet: same level, 1001 ms after the last transition.
        let status = t.tick(false, 1101);
        assert_eq!(status.transitions_last_second, 0);
    }

    #[test]
    fn counter_never_decreases_between_close_transitions() {
        let mut t = OccupancyTracker::new(16);
        let mut prev = 0;
        // A transition every 400 ms — always within the quiet window.
        for i in 0..10u32 {
            let status = t.tick(i % 2 == 0, i * 400);
            assert!(status.transitions_last_second >= prev);
            prev = status.transitions_last_second;
        }
    }

    #[test]
    fn quiet_at_exactly_one_second_does_not_reset() {
        let mut t = OccupancyTracker::new(16);
        t.tick(true, 0);
        // 1000 ms is not "more than 1000 ms".
        let status = t.tick(true, 1000);
        assert_eq!(status.transitions_last_second, 1);
    }

    #[test]
    fn window_is_clamped_to_capacity() {
        let t = OccupancyTracker::new(100_000);
        assert_eq!(t.window(), MAX_WINDOW);
        let t = OccupancyTracker::new(0);
        assert_eq!(t.window(), 1);
    }
}
