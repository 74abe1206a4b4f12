//! Ringnode firmware library.
//!
//! A reactive lighting node: a quadrature encoder, an I2S microphone and a
//! PIR sensor fused into an LED-ring animation, with JSON telemetry over a
//! pluggable Bus.  Exposes the pure-logic modules for integration testing
//! and external inspection; ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module and by the `espidf`
//! cargo feature for the binary.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod dsp;
pub mod input;
pub mod occupancy;
pub mod ring;
pub mod scheduler;
pub mod telemetry;
pub mod topics;

mod error;
pub mod pins;

pub mod adapters;

pub use error::{CommsError, Error, Result, SensorError};
