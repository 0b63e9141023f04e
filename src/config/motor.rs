//! Motor configuration from TOML.

use heapless::String;
use serde::Deserialize;

use crate::coils::DutyResolution;
use crate::motor::CurveScaling;

use super::units::Microsteps;

/// Pin identifiers of the four coil outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoilPins {
    /// Coil A1 pin.
    pub a1: u8,
    /// Coil A2 pin.
    pub a2: u8,
    /// Coil B1 pin.
    pub b1: u8,
    /// Coil B2 pin.
    pub b2: u8,
}

impl CoilPins {
    /// Pins in the order the coils are driven.
    ///
    /// Digital coils run `A1 A2 B1 B2`; microstepping coils run `A2 B1 A1 B2`.
    pub fn drive_order(&self, microstepping: bool) -> [u8; 4] {
        if microstepping {
            [self.a2, self.b1, self.a1, self.b2]
        } else {
            [self.a1, self.a2, self.b1, self.b2]
        }
    }

    /// First pin used by more than one coil, if any.
    pub fn duplicate(&self) -> Option<u8> {
        let pins = [self.a1, self.a2, self.b1, self.b2];
        pins.iter()
            .enumerate()
            .find(|&(i, &p)| pins[i + 1..].contains(&p))
            .map(|(_, &p)| p)
    }
}

/// Complete motor configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Coil pin assignment.
    pub pins: CoilPins,

    /// Full steps per revolution (200 for 1.8° motors).
    #[serde(default = "default_steps_per_revolution")]
    pub steps_per_revolution: u16,

    /// Microsteps per full step; absent for digital coils.
    #[serde(default)]
    pub microsteps: Option<Microsteps>,

    /// PWM duty resolution of the coil channels.
    #[serde(default)]
    pub duty_resolution: DutyResolution,

    /// Peak the microstep curve is built against.
    #[serde(default)]
    pub curve_scaling: CurveScaling,
}

fn default_steps_per_revolution() -> u16 {
    200
}

impl MotorConfig {
    /// Whether the motor drives PWM coils.
    #[inline]
    pub fn is_microstepping(&self) -> bool {
        self.microsteps.is_some()
    }

    /// Pins in the order the coils are driven for this motor.
    #[inline]
    pub fn drive_order(&self) -> [u8; 4] {
        self.pins.drive_order(self.is_microstepping())
    }

    /// Microstep positions per output revolution.
    pub fn microsteps_per_revolution(&self) -> u32 {
        let divisor = self.microsteps.map(Microsteps::value).unwrap_or(1);
        self.steps_per_revolution as u32 * divisor as u32
    }
}
