//! Log-backed Bus adapter.
//!
//! Implements [`BusPort`] by writing every payload to the logger (UART /
//! USB-CDC in production, stderr on the host).  Used for bench bring-up
//! and host simulation; the MQTT adapter implements the same trait.

use log::info;

use crate::app::ports::BusPort;

pub struct LogBus;

impl LogBus {
    pub fn new() -> Self {
        Self
    }
}

impl BusPort for LogBus {
    fn publish(&mut self, topic: &str, payload: &str) -> bool {
        info!("PUB {topic} {payload}");
        true
    }
}
