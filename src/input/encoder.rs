//! Quadrature rotary encoder decoder.
//!
//! The GPIO ISR fires on every logic change of either phase pin and runs
//! [`encoder_isr_handler`], which folds the 2-bit pin state through a
//! 16-entry transition table and accumulates direction into two static
//! atomics.  The main loop samples them through [`Encoder::read_and_drain`].
//!
//! Because the ISR and the main loop are separate writers, the counters are
//! `AtomicI32`s and the drain happens inside a `critical_section` so that
//! `(position, delta)` is observed as a consistent pair — no torn reads, and
//! `delta` drains to zero exactly once per sample.
//!
//! Position arithmetic is **wrapping** i32.  At four counts per detent a
//! wrap takes ~500 million detents of continuous rotation, and downstream
//! consumers only ever look at deltas.

use core::sync::atomic::{AtomicI32, AtomicU8, Ordering};

/// Signed direction per `(prev_state << 2) | curr_state` transition.
/// Invalid and no-change transitions are 0; the two "diagonal" double-step
/// transitions (both pins flipping at once) are deliberately 0 as well,
/// since inferring two steps from an ambiguous edge is worse than losing one.
const TRANSITION_TABLE: [i8; 16] = [
    0, -1, 1, 0, //
    1, 0, 0, -1, //
    -1, 0, 0, 1, //
    0, 1, -1, 0,
];

/// Cumulative position, written by the ISR, read by the main loop.
static ENC_POSITION: AtomicI32 = AtomicI32::new(0);
/// Un-published change since the last drain.  Swapped to 0 on each drain.
static ENC_DELTA: AtomicI32 = AtomicI32::new(0);
/// Previous 2-bit `(a << 1) | b` pin state.
static ENC_PREV_STATE: AtomicU8 = AtomicU8::new(0);

/// Decode one phase-pin edge.  Safe to call from ISR context: lock-free,
/// allocation-free, branch-light.
pub fn encoder_isr_handler(pin_a: bool, pin_b: bool) {
    let curr = (u8::from(pin_a) << 1) | u8::from(pin_b);
    let prev = ENC_PREV_STATE.load(Ordering::Relaxed);
    let dir = i32::from(TRANSITION_TABLE[usize::from((prev << 2) | curr)]);
    if dir != 0 {
        ENC_POSITION.fetch_add(dir, Ordering::Relaxed);
        ENC_DELTA.fetch_add(dir, Ordering::Relaxed);
    }
    ENC_PREV_STATE.store(curr, Ordering::Relaxed);
}

/// Seed the previous pin state from a boot-time GPIO read, before the ISR
/// is attached.  Avoids a phantom first step.
pub fn seed_encoder_state(pin_a: bool, pin_b: bool) {
    ENC_PREV_STATE.store((u8::from(pin_a) << 1) | u8::from(pin_b), Ordering::Relaxed);
}

/// A consistent `(position, delta)` snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderReading {
    /// Cumulative signed position (wrapping i32).
    pub position: i32,
    /// Counts accumulated since the previous drain.
    pub delta: i32,
}

/// Main-loop handle over the ISR-maintained counters.
///
/// The raw atomics are private to this module; everything outside the
/// decoder goes through [`read_and_drain`](Self::read_and_drain).
pub struct Encoder {
    /// Phase pin numbers, kept for diagnostics / re-init.
    _gpio_a: i32,
    _gpio_b: i32,
}

impl Encoder {
    pub fn new(gpio_a: i32, gpio_b: i32) -> Self {
        Self {
            _gpio_a: gpio_a,
            _gpio_b: gpio_b,
        }
    }

    /// Sample `(position, delta)` and reset `delta` to 0.
    ///
    /// Runs inside a critical section so an encoder edge cannot land
    /// between the two reads: a second immediate call with no intervening
    /// edges always returns `delta == 0`.
    pub fn read_and_drain(&mut self) -> EncoderReading {
        critical_section::with(|_| EncoderReading {
            position: ENC_POSITION.load(Ordering::Relaxed),
            delta: ENC_DELTA.swap(0, Ordering::Relaxed),
        })
    }
}

/// Reset all decoder state.  Test-only: production code never rewinds the
/// position counter.
#[cfg(test)]
pub(crate) fn reset_for_test() {
    ENC_POSITION.store(0, Ordering::SeqCst);
    ENC_DELTA.store(0, Ordering::SeqCst);
    ENC_PREV_STATE.store(0, Ordering::SeqCst);
}
