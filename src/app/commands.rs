//! Inbound ring commands and the single-slot mailbox.
//!
//! The legacy wire format is `{"on": bool, "b": f32}` with both fields
//! optional (`on` defaults true, `b` to 0.2).  Malformed payloads are
//! ignored outright — a garbled command must leave the ring exactly as it
//! was.
//!
//! Delivery is decoupled from the bus callback: the transport parses and
//! [`post`](CommandMailbox::post)s into a mailbox, and the service
//! [`take`](CommandMailbox::take)s it once per loop iteration.  The slot
//! holds one command; a newer command simply replaces an unconsumed older
//! one (last-writer-wins, which is the right semantics for absolute
//! power/brightness settings).

use core::cell::RefCell;

use critical_section::Mutex;
use log::debug;
use serde::Deserialize;

/// Default brightness when the command omits `b`.
const DEFAULT_BRIGHTNESS: f32 = 0.2;

/// A parsed power/brightness command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingCommand {
    pub on: bool,
    pub brightness: f32,
}

/// Wire shape: both fields optional, unknown fields ignored.
#[derive(Deserialize)]
struct RingCommandWire {
    on: Option<bool>,
    b: Option<f32>,
}

impl RingCommand {
    /// Parse a JSON payload.  `None` means "ignore this command".
    pub fn parse(payload: &str) -> Option<Self> {
        match serde_json::from_str::<RingCommandWire>(payload) {
            Ok(wire) => Some(Self {
                on: wire.on.unwrap_or(true),
                brightness: wire.b.unwrap_or(DEFAULT_BRIGHTNESS),
            }),
            Err(e) => {
                debug!("ignoring malformed ring command: {e}");
                None
            }
        }
    }
}

/// Single-slot command mailbox, safe to share between the bus callback
/// context and the main loop.
pub struct CommandMailbox {
    slot: Mutex<RefCell<Option<RingCommand>>>,
}

impl CommandMailbox {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Deposit a command, replacing any unconsumed one.
    pub fn post(&self, cmd: RingCommand) {
        critical_section::with(|cs| {
            self.slot.borrow_ref_mut(cs).replace(cmd);
        });
    }

    /// Parse-and-post helper for bus subscription callbacks.
    pub fn post_json(&self, payload: &str) {
        if let Some(cmd) = RingCommand::parse(payload) {
            self.post(cmd);
        }
    }

    /// Remove and return the pending command, if any.
    pub fn take(&self) -> Option<RingCommand> {
        critical_section::with(|cs| self.slot.borrow_ref_mut(cs).take())
    }
}

impl Default for CommandMailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_command_parses() {
        let cmd = RingCommand::parse(r#"{"on":false,"b":0.7}"#).unwrap();
        assert!(!cmd.on);
        assert!((cmd.brightness - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let cmd = RingCommand::parse("{}").unwrap();
        assert!(cmd.on);
        assert!((cmd.brightness - 0.2).abs() < f32::EPSILON);

        let cmd = RingCommand::parse(r#"{"on":false}"#).unwrap();
        assert!(!cmd.on);
        assert!((cmd.brightness - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cmd = RingCommand::parse(r#"{"on":true,"b":0.5,"extra":1}"#).unwrap();
        assert!(cmd.on);
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert_eq!(RingCommand::parse("not json"), None);
        assert_eq!(RingCommand::parse(r#"{"on":"maybe"}"#), None);
        assert_eq!(RingCommand::parse(""), None);
    }

    #[test]
    fn mailbox_is_take_once() {
        let mbox = CommandMailbox::new();
        mbox.post(RingCommand {
            on: true,
            brightness: 0.4,
        });
        assert!(mbox.take().is_some());
        assert!(mbox.take().is_none(), "slot drains on take");
    }

    #[test]
    fn newest_command_wins() {
        let mbox = CommandMailbox::new();
        mbox.post_json(r#"{"b":0.1}"#);
        mbox.post_json(r#"{"b":0.9}"#);
        let cmd = mbox.take().unwrap();
        assert!((cmd.brightness - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn malformed_post_json_leaves_slot_empty() {
        let mbox = CommandMailbox::new();
        mbox.post_json("{{{");
        assert!(mbox.take().is_none());
    }
}
