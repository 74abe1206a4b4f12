//! Application core — pure domain logic, zero I/O.
//!
//! The business rules of a lighting node: command interpretation, input
//! decoding, feature fusion and animation, orchestrated per-iteration by
//! [`service::NodeService`].  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod ports;
pub mod service;
