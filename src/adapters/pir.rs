//! PIR motion input over an `embedded-hal` digital pin.
//!
//! Generic over [`InputPin`] so the same adapter serves the ESP-IDF GPIO
//! driver on target and a scripted pin in tests.  A read error fails soft
//! to the last known level, per the sensor-port contract.

use embedded_hal::digital::InputPin;
use log::debug;

use crate::app::ports::MotionSensePort;

pub struct PirSensor<P: InputPin> {
    pin: P,
    last_level: bool,
}

impl<P: InputPin> PirSensor<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            last_level: false,
        }
    }
}

impl<P: InputPin> MotionSensePort for PirSensor<P> {
    fn motion(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => {
                self.last_level = level;
                level
            }
            Err(_) => {
                debug!("PIR read failed, keeping previous level");
                self.last_level
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{Error, ErrorKind, ErrorType};

    #[derive(Debug)]
    struct PinError;

    impl Error for PinError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Scripted pin: yields levels from a list, then errors.
    struct ScriptedPin {
        levels: Vec<bool>,
        idx: usize,
    }

    impl ErrorType for ScriptedPin {
        type Error = PinError;
    }

    impl InputPin for ScriptedPin {
        fn is_high(&mut self) -> Result<bool, PinError> {
            let i = self.idx;
            self.idx += 1;
            self.levels.get(i).copied().ok_or(PinError)
        }

        fn is_low(&mut self) -> Result<bool, PinError> {
            self.is_high().map(|h| !h)
        }
    }

    #[test]
    fn reads_pin_level() {
        let mut pir = PirSensor::new(ScriptedPin {
            levels: vec![true, false],
            idx: 0,
        });
        assert!(pir.motion());
        assert!(!pir.motion());
    }

    #[test]
    fn read_error_keeps_last_level() {
        let mut pir = PirSensor::new(ScriptedPin {
            levels: vec![true],
            idx: 0,
        });
        assert!(pir.motion());
        // Script exhausted — the pin now errors.
        assert!(pir.motion(), "fails soft to the last known level");
    }
}
