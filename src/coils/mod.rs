//! Coil output layer.
//!
//! A stepper has four coil outputs. They are either plain digital outputs
//! ([`DigitalCoils`]) or PWM channels ([`PwmCoils`]); the choice is made once,
//! when the coil set is built, and fixes the motor's drive mode.

mod digital;
mod pwm;

pub use digital::DigitalCoils;
pub use pwm::{DutyResolution, FixedFrequency, PwmCoils, PwmFrequency, MIN_PWM_FREQUENCY_HZ};

use crate::error::MotorError;

/// Number of coil outputs on a four-wire stepper.
pub const COIL_COUNT: usize = 4;

/// What a coil set can output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoilKind {
    /// On/off outputs.
    Digital,
    /// Duty-cycle outputs with a fixed maximum.
    Pwm {
        /// Duty value for a fully energized coil.
        duty_max: u16,
    },
}

/// Energization of all four coils, in drive order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Energization {
    /// Bit `i` switches coil `i` on.
    Pattern(u8),
    /// Duty cycle of each coil.
    Duties([u16; COIL_COUNT]),
}

impl Energization {
    /// Every coil off.
    pub const OFF: Energization = Energization::Pattern(0);

    /// Whether coil `index` carries any current.
    pub fn is_energized(&self, index: usize) -> bool {
        match self {
            Energization::Pattern(bits) => (bits >> index) & 0x01 != 0,
            Energization::Duties(duties) => duties.get(index).is_some_and(|d| *d > 0),
        }
    }
}

/// A set of four coil outputs.
pub trait Coils {
    /// Output capability, fixed for the lifetime of the set.
    fn kind(&self) -> CoilKind;

    /// Drive every coil to match `energization`.
    fn energize(&mut self, energization: &Energization) -> Result<(), MotorError>;

    /// Switch every coil off.
    fn release(&mut self) -> Result<(), MotorError> {
        self.energize(&Energization::OFF)
    }
}
