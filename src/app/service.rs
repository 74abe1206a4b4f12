//! Node service — one cooperative iteration of the whole node.
//!
//! ```text
//!  AudioSourcePort ──▶ ┌──────────────────────────────┐ ──▶ BusPort
//!  MotionSensePort ──▶ │         NodeService          │
//!  SwitchSensePort ──▶ │ decode · dsp · occupancy ·   │ ──▶ LedStripPort
//!  CommandMailbox  ──▶ │ animate · schedule           │
//!                      └──────────────────────────────┘
//! ```
//!
//! [`NodeService::service`] is called from the main loop as fast as it can
//! spin.  It drains the command mailbox, polls the button, and runs
//! whichever fixed-rate tasks are due, publishing telemetry as it goes.
//! Nothing in here blocks: acquisition failures keep previous values and a
//! refused publish is simply dropped.

use log::{debug, info};

use crate::config::{MAX_AUDIO_BLOCK, NodeConfig};
use crate::dsp::features::{AudioFeatureExtractor, AudioFeatures};
use crate::input::button::{ButtonDebouncer, ButtonEvent};
use crate::input::encoder::Encoder;
use crate::occupancy::{OccupancyStatus, OccupancyTracker};
use crate::ring::hsv::Rgb;
use crate::ring::AnimationEngine;
use crate::scheduler::{Scheduler, Task};
use crate::telemetry::{
    AudioPayload, ButtonPayload, EncoderPayload, HeartbeatPayload, OccupancyPayload,
    RingStatePayload,
};
use crate::topics::Topics;

use super::commands::CommandMailbox;
use super::ports::{AudioSourcePort, BusPort, LedStripPort, MotionSensePort, SwitchSensePort};

/// Local-feedback twinkle colours (dim, so they read as blips).
const TWINKLE_CW: Rgb = Rgb::new(0, 32, 0);
const TWINKLE_CCW: Rgb = Rgb::new(32, 0, 0);
const TWINKLE_PRESS: Rgb = Rgb::new(0, 0, 40);
const TWINKLE_HEARTBEAT: Rgb = Rgb::new(120, 20, 20);

/// Encoder keepalive: publish even with `delta == 0` at least this often,
/// so the debug UI can tell "idle" from "dead".
const ENCODER_KEEPALIVE_MS: u32 = 1000;

pub struct NodeService {
    topics: Topics,
    sched: Scheduler,
    encoder: Encoder,
    button: ButtonDebouncer,
    audio: AudioFeatureExtractor,
    occupancy: OccupancyTracker,
    ring: AnimationEngine,
    /// Acquisition buffer, sized to the configured block length.
    audio_block: heapless::Vec<i32, MAX_AUDIO_BLOCK>,
    /// Latest smoothed features, fed into every render.
    features: AudioFeatures,
    /// Latest occupancy status, fed into every render.
    occ_status: OccupancyStatus,
    /// Wrapping ms timestamp of the last encoder publish.
    last_encoder_pub_ms: u32,
}

impl NodeService {
    pub fn new(config: &NodeConfig, now_ms: u64) -> Self {
        let now = now_ms as u32;
        let block_len = config.audio_block_len.clamp(1, MAX_AUDIO_BLOCK);
        let mut audio_block = heapless::Vec::new();
        audio_block.resize(block_len, 0).ok();

        info!(
            "node up: {} leds, {} Hz audio, PIR window {}",
            config.led_count, config.sample_rate_hz, config.pir_window
        );

        Self {
            topics: Topics::new(&config.house_id, &config.node_id),
            sched: Scheduler::new(config, now),
            encoder: Encoder::new(crate::pins::ENCODER_A_GPIO, crate::pins::ENCODER_B_GPIO),
            button: ButtonDebouncer::new(config.button_debounce_ms),
            audio: AudioFeatureExtractor::new(config.band_low, config.band_mid, config.band_high),
            occupancy: OccupancyTracker::new(config.pir_window),
            ring: AnimationEngine::new(config.led_count),
            audio_block,
            features: AudioFeatures::default(),
            occ_status: OccupancyStatus {
                occupied: false,
                transitions_last_second: 0,
                activity_ratio: 0.0,
            },
            last_encoder_pub_ms: now,
        }
    }

    /// Run one cooperative iteration at monotonic time `now_ms`.
    pub fn service(
        &mut self,
        now_ms: u64,
        hw: &mut (impl AudioSourcePort + MotionSensePort + SwitchSensePort + LedStripPort),
        bus: &mut impl BusPort,
        mailbox: &CommandMailbox,
    ) {
        let now = now_ms as u32;

        // Remote command first, so this iteration renders the new state.
        if let Some(cmd) = mailbox.take() {
            info!("ring cmd: on={} b={:.2}", cmd.on, cmd.brightness);
            self.ring.set_power(cmd.on, cmd.brightness);
        }

        // Button: polled every iteration, debounce inside.
        if let Some(event) = self.button.poll(hw.switch_high(), now) {
            self.on_button(event, now_ms, bus);
        }

        // Encoder: drained on the coalescing cadence.
        if self.sched.fire(Task::EncoderDrain, now).is_some() {
            self.drain_encoder(now_ms, bus);
        }

        if self.sched.fire(Task::Audio, now).is_some() {
            let read = hw.read_block(&mut self.audio_block);
            self.features = match read {
                Ok(0) => self.audio.features(), // short read, keep previous
                Ok(n) => self.audio.process(&self.audio_block[..n.min(self.audio_block.len())]),
                Err(e) => self.audio.process_acquisition(Err(e)),
            };
            self.publish(bus, &self.topics.audio_features(), &AudioPayload::new(self.features, now_ms));
        }

        if self.sched.fire(Task::Occupancy, now).is_some() {
            self.occ_status = self.occupancy.tick(hw.motion(), now);
            self.publish(
                bus,
                &self.topics.occupancy(),
                &OccupancyPayload::new(self.occ_status, now_ms),
            );
        }

        if let Some(elapsed) = self.sched.fire(Task::Render, now) {
            let dt_secs = elapsed as f32 / 1000.0;
            let frame = self.ring.render(dt_secs, &self.features, &self.occ_status);
            hw.show(frame);
        }

        if self.sched.fire(Task::RingPublish, now).is_some() {
            self.publish(
                bus,
                &self.topics.ring_state(),
                &RingStatePayload::new(self.ring.state(), now_ms),
            );
        }

        if self.sched.fire(Task::Heartbeat, now).is_some() {
            self.publish(bus, &self.topics.heartbeat(), &HeartbeatPayload { ts_ms: now_ms });
            let n = self.ring.state().pixels.len();
            self.ring.twinkle((now_ms / 5000) as usize % n, TWINKLE_HEARTBEAT);
        }
    }

    /// Direct access to the animation engine (boot-time mode selection,
    /// diagnostics).
    pub fn ring(&mut self) -> &mut AnimationEngine {
        &mut self.ring
    }

    /// Latest smoothed audio features.
    pub fn features(&self) -> AudioFeatures {
        self.features
    }

    /// Latest occupancy status.
    pub fn occupancy_status(&self) -> OccupancyStatus {
        self.occ_status
    }

    // ── Internal ──────────────────────────────────────────────

    fn on_button(&mut self, event: ButtonEvent, now_ms: u64, bus: &mut impl BusPort) {
        if event == ButtonEvent::Press {
            self.ring.cycle_mode();
            self.ring.twinkle(1, TWINKLE_PRESS);
        }
        self.publish(
            bus,
            &self.topics.button(),
            &ButtonPayload {
                pressed: event == ButtonEvent::Press,
                event: event.as_str(),
                ts_ms: now_ms,
            },
        );
    }

    fn drain_encoder(&mut self, now_ms: u64, bus: &mut impl BusPort) {
        let now = now_ms as u32;
        let reading = self.encoder.read_and_drain();

        if reading.delta != 0 {
            self.ring.adjust_param(reading.delta);
            self.ring.twinkle(
                0,
                if reading.delta > 0 {
                    TWINKLE_CW
                } else {
                    TWINKLE_CCW
                },
            );
        }

        // Publish on change, with a slow keepalive when idle.
        let keepalive_due =
            now.wrapping_sub(self.last_encoder_pub_ms) >= ENCODER_KEEPALIVE_MS;
        if reading.delta != 0 || keepalive_due {
            self.publish(
                bus,
                &self.topics.encoder(),
                &EncoderPayload {
                    pos: reading.position,
                    delta: reading.delta,
                    ts_ms: now_ms,
                },
            );
            self.last_encoder_pub_ms = now;
        }
    }

    fn publish<T: serde::Serialize>(&self, bus: &mut impl BusPort, topic: &str, payload: &T) {
        match serde_json::to_string(payload) {
            Ok(json) => {
                if !bus.publish(topic, &json) {
                    debug!("publish dropped: {topic}");
                }
            }
            Err(e) => debug!("serialize failed for {topic}: {e}"),
        }
    }
}
