//! Cooperative task timing for the single-threaded main loop.
//!
//! No preemption and no queues: each loop iteration asks which fixed-rate
//! tasks are due at the current monotonic time, runs them inline, and moves
//! on.  The scheduler owns nothing but per-task "last fired" timestamps —
//! all domain state lives in the components themselves.
//!
//! | Task          | Period  | Drives                              |
//! |---------------|---------|-------------------------------------|
//! | EncoderDrain  | 200 ms  | encoder drain + coalesced telemetry |
//! | Audio         | 100 ms  | feature extraction + telemetry      |
//! | Occupancy     | 100 ms  | PIR tick + telemetry                |
//! | Render        | 20 ms   | animation frame + strip output      |
//! | RingPublish   | 200 ms  | ring state telemetry                |
//! | Heartbeat     | 5000 ms | liveness telemetry                  |
//!
//! (The button is polled every iteration; its 25 ms debounce lives in the
//! debouncer itself.)

use crate::config::NodeConfig;

/// Fixed-rate tasks of the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Task {
    EncoderDrain = 0,
    Audio = 1,
    Occupancy = 2,
    Render = 3,
    RingPublish = 4,
    Heartbeat = 5,
}

const TASK_COUNT: usize = 6;

pub struct Scheduler {
    periods_ms: [u32; TASK_COUNT],
    last_fired_ms: [u32; TASK_COUNT],
}

impl Scheduler {
    /// Build from config with every task's clock starting at `now_ms`, so
    /// nothing fires in a burst on the first iteration.
    pub fn new(config: &NodeConfig, now_ms: u32) -> Self {
        let mut periods_ms = [0u32; TASK_COUNT];
        periods_ms[Task::EncoderDrain as usize] = config.ring_publish_period_ms;
        periods_ms[Task::Audio as usize] = config.audio_period_ms;
        periods_ms[Task::Occupancy as usize] = config.occupancy_period_ms;
        periods_ms[Task::Render as usize] = config.render_period_ms;
        periods_ms[Task::RingPublish as usize] = config.ring_publish_period_ms;
        periods_ms[Task::Heartbeat as usize] = config.heartbeat_period_ms;
        Self {
            periods_ms,
            last_fired_ms: [now_ms; TASK_COUNT],
        }
    }

    /// If `task` is due at `now_ms`, mark it fired and return the elapsed
    /// milliseconds since its previous firing.  Wrapping u32 arithmetic.
    pub fn fire(&mut self, task: Task, now_ms: u32) -> Option<u32> {
        let idx = task as usize;
        let elapsed = now_ms.wrapping_sub(self.last_fired_ms[idx]);
        if elapsed >= self.periods_ms[idx] {
            self.last_fired_ms[idx] = now_ms;
            Some(elapsed)
        } else {
            None
        }
    }

    /// Configured period of `task` in milliseconds.
    pub fn period_ms(&self, task: Task) -> u32 {
        self.periods_ms[task as usize]
    }
}
