//! LED ring animation engine.
//!
//! A mode-keyed state machine over a continuously advancing phase
//! accumulator.  Every render tick the engine advances
//! `phase += dt × speed`, then hands off to the active mode's pure
//! rendering function, which fills the pixel buffer from phase plus the
//! latest audio features and occupancy status:
//!
//! | Mode           | Source signal            | Look                        |
//! |----------------|--------------------------|-----------------------------|
//! | Off            | —                        | all black                   |
//! | Breathing      | phase                    | warm sin² glow              |
//! | AudioReactive  | smoothed rms             | blue→red loudness ramp      |
//! | Rainbow        | phase + pixel index      | rotating hue wheel          |
//! | Aurora         | two phase-shifted sines  | drifting cyan–green waves   |
//! | OccupancyPulse | activity ratio × phase   | green pulse                 |
//!
//! Transitions happen only through [`set_mode`](AnimationEngine::set_mode) /
//! [`set_power`](AnimationEngine::set_power); each one resets phase to 0.
//! Phase otherwise wraps implicitly through the trig functions and is never
//! rewound.

pub mod hsv;

use heapless::Vec;
use log::info;

use crate::config::MAX_PIXELS;
use crate::dsp::features::AudioFeatures;
use crate::occupancy::OccupancyStatus;
use hsv::{Rgb, hsv_to_rgb};

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Animation modes, in button-cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    Off = 0,
    Breathing = 1,
    AudioReactive = 2,
    Rainbow = 3,
    Aurora = 4,
    OccupancyPulse = 5,
}

impl Mode {
    pub const COUNT: usize = 6;

    /// Convert a wire `u8` back to a mode.  Out-of-range falls back to
    /// `Off` (safe default — a garbled command turns the ring dark, not
    /// strobing).
    pub fn from_index(idx: u8) -> Self {
        match idx {
            1 => Self::Breathing,
            2 => Self::AudioReactive,
            3 => Self::Rainbow,
            4 => Self::Aurora,
            5 => Self::OccupancyPulse,
            _ => Self::Off,
        }
    }

    /// Next mode in the button-press cycle.
    pub fn next(self) -> Self {
        Self::from_index((self as u8 + 1) % Self::COUNT as u8)
    }
}

// ---------------------------------------------------------------------------
// Ring state
// ---------------------------------------------------------------------------

/// Speed clamp range for the encoder knob.
const SPEED_MIN: f32 = 0.1;
const SPEED_MAX: f32 = 5.0;
/// Speed nudge per encoder count.
const SPEED_STEP: f32 = 0.1;

/// Rainbow rotation: degrees of hue advance per unit of phase.
const RAINBOW_DEG_PER_PHASE: f32 = 60.0;

/// How long a twinkle overlay stays on top of the animation.
const TWINKLE_HOLD_SECS: f32 = 0.15;

/// Complete animation state, owned exclusively by [`AnimationEngine`].
#[derive(Debug, Clone)]
pub struct RingState {
    pub mode: Mode,
    /// Master brightness, clamped to [0, 1].
    pub brightness: f32,
    /// Phase advance rate, clamped to [0.1, 5.0].
    pub speed: f32,
    /// Base colour for single-hue modes (Breathing).
    pub color_primary: Rgb,
    /// Monotonically advancing animation time.  Reset only on mode change.
    pub phase: f32,
    /// Rendered pixel colours, length = physical LED count.
    pub pixels: Vec<Rgb, MAX_PIXELS>,
}

/// A transient single-pixel overlay (local feedback for encoder turns,
/// button presses and heartbeats).
#[derive(Debug, Clone, Copy)]
struct Twinkle {
    index: usize,
    color: Rgb,
    remaining_secs: f32,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct AnimationEngine {
    state: RingState,
    twinkle: Option<Twinkle>,
}

impl AnimationEngine {
    /// `led_count` is clamped to `1..=MAX_PIXELS`.  Initial mode is
    /// Breathing at a dim warm default.
    pub fn new(led_count: usize) -> Self {
        let led_count = led_count.clamp(1, MAX_PIXELS);
        let mut pixels = Vec::new();
        for _ in 0..led_count {
            let _ = pixels.push(Rgb::BLACK);
        }
        Self {
            state: RingState {
                mode: Mode::Breathing,
                brightness: 0.3,
                speed: 1.0,
                color_primary: Rgb::new(0xff, 0x93, 0x29), // warm white
                phase: 0.0,
                pixels,
            },
            twinkle: None,
        }
    }

    // ── Transitions ───────────────────────────────────────────

    /// Switch modes.  Always resets phase, even for a same-mode set.
    pub fn set_mode(&mut self, mode: Mode) {
        info!("ring mode: {:?} -> {:?}", self.state.mode, mode);
        self.state.mode = mode;
        self.state.phase = 0.0;
    }

    /// Cycle to the next mode (button press).
    pub fn cycle_mode(&mut self) {
        self.set_mode(self.state.mode.next());
    }

    /// Legacy remote power control: `on = false` forces Off; `on = true`
    /// from Off restores Breathing.  Brightness is clamped to [0, 1].
    pub fn set_power(&mut self, on: bool, brightness: f32) {
        self.state.brightness = brightness.clamp(0.0, 1.0);
        if !on {
            self.set_mode(Mode::Off);
        } else if self.state.mode == Mode::Off {
            self.set_mode(Mode::Breathing);
        }
    }

    /// Nudge speed by `delta × 0.1`, clamped — driven by encoder rotation.
    pub fn adjust_param(&mut self, delta: i32) {
        self.state.speed =
            (self.state.speed + delta as f32 * SPEED_STEP).clamp(SPEED_MIN, SPEED_MAX);
    }

    /// Briefly override one pixel with a fixed colour, on top of whatever
    /// the active mode renders.
    pub fn twinkle(&mut self, index: usize, color: Rgb) {
        self.twinkle = Some(Twinkle {
            index: index.min(self.state.pixels.len() - 1),
            color,
            remaining_secs: TWINKLE_HOLD_SECS,
        });
    }

    // ── Rendering ─────────────────────────────────────────────

    /// Advance phase and render one frame into the pixel buffer.
    pub fn render(
        &mut self,
        dt_secs: f32,
        audio: &AudioFeatures,
        occupancy: &OccupancyStatus,
    ) -> &[Rgb] {
        self.state.phase += dt_secs * self.state.speed;

        let n = self.state.pixels.len();
        let brightness = self.state.brightness.clamp(0.0, 1.0);
        let phase = self.state.phase;

        match self.state.mode {
            Mode::Off => {
                self.state.pixels.iter_mut().for_each(|p| *p = Rgb::BLACK);
            }
            Mode::Breathing => {
                let wave = (phase.sin() + 1.0) / 2.0;
                let intensity = wave * wave * brightness;
                let color = self.state.color_primary.scaled(intensity);
                self.state.pixels.iter_mut().for_each(|p| *p = color);
            }
            Mode::AudioReactive => {
                let color = audio_reactive_color(audio.rms, brightness);
                self.state.pixels.iter_mut().for_each(|p| *p = color);
            }
            Mode::Rainbow => {
                for (i, p) in self.state.pixels.iter_mut().enumerate() {
                    let hue = phase * RAINBOW_DEG_PER_PHASE + i as f32 * (360.0 / n as f32);
                    *p = hsv_to_rgb(hue, 1.0, brightness);
                }
            }
            Mode::Aurora => {
                for (i, p) in self.state.pixels.iter_mut().enumerate() {
                    *p = aurora_pixel(phase, i, brightness);
                }
            }
            Mode::OccupancyPulse => {
                let pulse = ((phase * 3.0).sin() + 1.0) / 2.0;
                let intensity = occupancy.activity_ratio * pulse;
                let color = hsv_to_rgb(130.0, 0.85, intensity * brightness);
                self.state.pixels.iter_mut().for_each(|p| *p = color);
            }
        }

        if let Some(tw) = &mut self.twinkle {
            tw.remaining_secs -= dt_secs;
            if tw.remaining_secs > 0.0 {
                self.state.pixels[tw.index] = tw.color;
            } else {
                self.twinkle = None;
            }
        }

        &self.state.pixels
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot of the full animation state (for telemetry).
    pub fn state(&self) -> &RingState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }
}

// ---------------------------------------------------------------------------
// Per-mode pure helpers
// ---------------------------------------------------------------------------

/// Loudness → colour: five bands from blue (quiet) through cyan, green and
/// yellow to red (loud).  The smoothed rms of ambient audio is tiny, hence
/// the aggressive scale factor.
fn audio_reactive_color(rms: f32, brightness: f32) -> Rgb {
    let level = (rms * 50_000.0).clamp(0.0, 1.0);
    let hue = if level < 0.2 {
        240.0 // blue
    } else if level < 0.4 {
        180.0 // cyan
    } else if level < 0.6 {
        120.0 // green
    } else if level < 0.8 {
        60.0 // yellow
    } else {
        0.0 // red
    };
    hsv_to_rgb(hue, 1.0, level * brightness)
}

/// One aurora pixel: the average of two sine waves running at different
/// rates with per-pixel offsets, mapped into a cyan–green hue band.
fn aurora_pixel(phase: f32, index: usize, brightness: f32) -> Rgb {
    let i = index as f32;
    let w1 = (phase + i * 0.6).sin();
    let w2 = (phase * 1.7 + i * 0.35).sin();
    let intensity = ((w1 + w2) / 2.0 + 1.0) / 2.0;
    let hue = 120.0 + intensity * 60.0;
    hsv_to_rgb(hue, 1.0, intensity * brightness)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> (AudioFeatures, OccupancyStatus) {
        (
            AudioFeatures::default(),
            OccupancyStatus {
                occupied: false,
                transitions_last_second: 0,
                activity_ratio: 0.0,
            },
        )
    }

    #[test]
    fn initial_mode_is_breathing() {
        let engine = AnimationEngine::new(24);
        assert_eq!(engine.mode(), Mode::Breathing);
        assert_eq!(engine.state().pixels.len(), 24);
    }

    #[test]
    fn set_mode_always_resets_phase() {
        let (audio, occ) = quiet();
        let mut engine = AnimationEngine::new(8);
        for _ in 0..50 {
            engine.render(0.02, &audio, &occ);
        }
        assert!(engine.state().phase > 0.5);

        engine.set_mode(Mode::Rainbow);
        assert_eq!(engine.state().phase, 0.0);

        // Same-mode set still resets.
        engine.render(0.02, &audio, &occ);
        engine.set_mode(Mode::Rainbow);
        assert_eq!(engine.state().phase, 0.0);
    }

    #[test]
    fn off_renders_all_black() {
        let (audio, occ) = quiet();
        let mut engine = AnimationEngine::new(8);
        engine.set_mode(Mode::Off);
        let pixels = engine.render(0.02, &audio, &occ);
        assert!(pixels.iter().all(|&p| p == Rgb::BLACK));
    }

    #[test]
    fn set_power_off_forces_off_and_on_restores_breathing() {
        let mut engine = AnimationEngine::new(8);
        engine.set_mode(Mode::Rainbow);

        engine.set_power(false, 0.5);
        assert_eq!(engine.mode(), Mode::Off);
        assert!((engine.state().brightness - 0.5).abs() < f32::EPSILON);

        engine.set_power(true, 0.2);
        assert_eq!(engine.mode(), Mode::Breathing);
    }

    #[test]
    fn set_power_on_keeps_a_non_off_mode() {
        let mut engine = AnimationEngine::new(8);
        engine.set_mode(Mode::Aurora);
        engine.set_power(true, 0.8);
        assert_eq!(engine.mode(), Mode::Aurora);
    }

    #[test]
    fn brightness_is_clamped() {
        let mut engine = AnimationEngine::new(8);
        engine.set_power(true, 7.5);
        assert!((engine.state().brightness - 1.0).abs() < f32::EPSILON);
        engine.set_power(true, -2.0);
        assert_eq!(engine.state().brightness, 0.0);
    }

    #[test]
    fn speed_is_clamped_under_any_adjustment() {
        let mut engine = AnimationEngine::new(8);
        for _ in 0..200 {
            engine.adjust_param(3);
        }
        assert!((engine.state().speed - 5.0).abs() < 1e-5);
        for _ in 0..500 {
            engine.adjust_param(-2);
        }
        assert!((engine.state().speed - 0.1).abs() < 1e-5);
    }

    #[test]
    fn phase_advances_by_dt_times_speed() {
        let (audio, occ) = quiet();
        let mut engine = AnimationEngine::new(8);
        engine.adjust_param(10); // speed 1.0 -> 2.0
        engine.render(0.5, &audio, &occ);
        assert!((engine.state().phase - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rainbow_spreads_hues_across_the_ring() {
        let (audio, occ) = quiet();
        let mut engine = AnimationEngine::new(12);
        engine.set_mode(Mode::Rainbow);
        let pixels = engine.render(0.02, &audio, &occ);
        // Opposite sides of the wheel should differ.
        assert_ne!(pixels[0], pixels[6]);
    }

    #[test]
    fn occupancy_pulse_is_dark_with_zero_activity() {
        let (audio, occ) = quiet();
        let mut engine = AnimationEngine::new(8);
        engine.set_mode(Mode::OccupancyPulse);
        let pixels = engine.render(0.1, &audio, &occ);
        assert!(pixels.iter().all(|&p| p == Rgb::BLACK));
    }

    #[test]
    fn occupancy_pulse_lights_with_full_activity() {
        let audio = AudioFeatures::default();
        let occ = OccupancyStatus {
            occupied: true,
            transitions_last_second: 2,
            activity_ratio: 1.0,
        };
        let mut engine = AnimationEngine::new(8);
        engine.set_mode(Mode::OccupancyPulse);
        // Advance to a phase where sin(3φ) is near its peak.
        let mut lit = false;
        for _ in 0..40 {
            let pixels = engine.render(0.05, &audio, &occ);
            lit |= pixels.iter().any(|&p| p != Rgb::BLACK);
        }
        assert!(lit);
    }

    #[test]
    fn audio_reactive_hue_ramps_with_loudness() {
        let quiet_color = audio_reactive_color(0.2 / 50_000.0, 1.0);
        let loud_color = audio_reactive_color(1.0, 1.0);
        assert!(quiet_color.b > quiet_color.r, "quiet should be blueish");
        assert!(loud_color.r > loud_color.b, "loud should be reddish");
    }

    #[test]
    fn twinkle_overrides_then_expires() {
        let (audio, occ) = quiet();
        let mut engine = AnimationEngine::new(8);
        engine.set_mode(Mode::Off);
        engine.twinkle(3, Rgb::new(0, 32, 0));

        let pixels = engine.render(0.02, &audio, &occ);
        assert_eq!(pixels[3], Rgb::new(0, 32, 0));

        // Past the hold time the overlay is gone.
        let pixels = engine.render(0.2, &audio, &occ);
        assert_eq!(pixels[3], Rgb::BLACK);
    }

    #[test]
    fn mode_cycle_visits_every_mode_once() {
        let mut mode = Mode::Off;
        let mut seen = [false; Mode::COUNT];
        for _ in 0..Mode::COUNT {
            seen[mode as usize] = true;
            mode = mode.next();
        }
        assert_eq!(mode, Mode::Off);
        assert!(seen.iter().all(|&s| s));
    }
}
