//! Audio DSP subsystem — biquad band filters and per-block feature
//! extraction feeding the animation engine and telemetry.

pub mod biquad;
pub mod features;
