//! Driven adapters — implementations of the port traits in
//! [`crate::app::ports`] for concrete backends.
//!
//! ESP-IDF peripheral wiring (I2S driver install, GPIO ISR registration,
//! RMT NeoPixel output, MQTT client) lives in the `espidf`-gated binary;
//! the adapters here are the platform-portable ones.

pub mod log_bus;
pub mod pir;
pub mod time;
