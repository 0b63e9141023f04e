//! Digital coil outputs.

use embedded_hal::digital::OutputPin;

use crate::error::MotorError;

use super::{CoilKind, Coils, Energization, COIL_COUNT};

/// Four on/off coil outputs in `A1 A2 B1 B2` order.
pub struct DigitalCoils<P: OutputPin> {
    pins: [P; COIL_COUNT],
}

impl<P: OutputPin> DigitalCoils<P> {
    /// Create a coil set from its four pins.
    pub fn new(a1: P, a2: P, b1: P, b2: P) -> Self {
        Self {
            pins: [a1, a2, b1, b2],
        }
    }

    /// Give the pins back in `A1 A2 B1 B2` order.
    pub fn into_pins(self) -> [P; COIL_COUNT] {
        self.pins
    }

    fn write(&mut self, index: usize, on: bool) -> Result<(), MotorError> {
        let pin = &mut self.pins[index];
        if on {
            pin.set_high().map_err(|_| MotorError::PinError)
        } else {
            pin.set_low().map_err(|_| MotorError::PinError)
        }
    }
}

impl<P: OutputPin> Coils for DigitalCoils<P> {
    fn kind(&self) -> CoilKind {
        CoilKind::Digital
    }

    fn energize(&mut self, energization: &Energization) -> Result<(), MotorError> {
        for i in 0..COIL_COUNT {
            self.write(i, energization.is_energized(i))?;
        }
        Ok(())
    }
}
