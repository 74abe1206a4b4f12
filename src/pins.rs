//! GPIO / peripheral pin assignments for the ringnode board.
//!
//! Single source of truth — every adapter references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// NeoPixel ring (WS2812B, single data line)
// ---------------------------------------------------------------------------

/// Data line for the WS2812B ring.
pub const NEOPIXEL_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// PIR occupancy sensor (HC-SR501 style, digital output)
// ---------------------------------------------------------------------------

/// Digital input: HIGH = motion detected.
pub const PIR_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Rotary encoder (quadrature, with push switch)
// ---------------------------------------------------------------------------

/// Encoder phase A — interrupt on CHANGE.
pub const ENCODER_A_GPIO: i32 = 14;
/// Encoder phase B — interrupt on CHANGE.
pub const ENCODER_B_GPIO: i32 = 12;
/// Encoder push switch — active-low with internal pull-up.
pub const ENCODER_SW_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// I2S microphone (INMP441 style, 24-bit left-justified in 32-bit frames)
// ---------------------------------------------------------------------------

/// I2S bit clock.
pub const I2S_BCLK_GPIO: i32 = 26;
/// I2S word select (LR clock).
pub const I2S_LRCL_GPIO: i32 = 25;
/// I2S data in (mic DOUT).
pub const I2S_DIN_GPIO: i32 = 22;
