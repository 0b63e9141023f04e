//! Step engine: position tracking and coil energization.
//!
//! The engine is a pure state machine. Given the current microstep position,
//! a direction and a style it computes the next position and the energization
//! of each coil; it never touches hardware.

use crate::coils::{Energization, COIL_COUNT};
use crate::config::units::Microsteps;
use crate::error::MotorError;
use crate::motion::{Direction, StepStyle};

use super::curve::CurveTable;

/// Single coil sequence.
const SINGLE_STEPS: [u8; 4] = [0b0010, 0b0100, 0b0001, 0b1000];

/// Double coil sequence.
const DOUBLE_STEPS: [u8; 4] = [0b1010, 0b0110, 0b0101, 0b1001];

/// Alternating double/single half-step sequence.
const INTERLEAVE_STEPS: [u8; 8] = [
    0b1010, 0b0010, 0b0110, 0b0100, 0b0101, 0b0001, 0b1001, 0b1000,
];

/// Digital coil sequence of a style.
///
/// Returns `None` for styles that need PWM coils.
pub fn pattern_table(style: StepStyle) -> Option<&'static [u8]> {
    match style {
        StepStyle::Single => Some(&SINGLE_STEPS),
        StepStyle::Double => Some(&DOUBLE_STEPS),
        StepStyle::Interleave => Some(&INTERLEAVE_STEPS),
        StepStyle::Microstep => None,
    }
}

#[derive(Debug, Clone)]
enum DriveMode {
    Digital,
    Microstepping {
        microsteps: Microsteps,
        curve: CurveTable,
        duty_max: u16,
    },
}

/// Microstep position state machine.
#[derive(Debug, Clone)]
pub struct StepEngine {
    current_microstep: i64,
    mode: DriveMode,
    /// Style of the last step, selects the digital table and the
    /// full-step quantization.
    last_style: Option<StepStyle>,
}

impl StepEngine {
    /// Engine for on/off coils.
    pub fn digital() -> Self {
        Self {
            current_microstep: 0,
            mode: DriveMode::Digital,
            last_style: None,
        }
    }

    /// Engine for PWM coils.
    ///
    /// `duty_max` is written at full-step positions.
    pub fn microstepping(microsteps: Microsteps, curve: CurveTable, duty_max: u16) -> Self {
        Self {
            current_microstep: 0,
            mode: DriveMode::Microstepping {
                microsteps,
                curve,
                duty_max,
            },
            last_style: None,
        }
    }

    /// Current position in microsteps.
    #[inline]
    pub fn position(&self) -> i64 {
        self.current_microstep
    }

    /// Microsteps per full step, `None` for digital coils.
    #[inline]
    pub fn microsteps(&self) -> Option<Microsteps> {
        match &self.mode {
            DriveMode::Digital => None,
            DriveMode::Microstepping { microsteps, .. } => Some(*microsteps),
        }
    }

    /// Style of the most recent step.
    #[inline]
    pub fn last_style(&self) -> Option<StepStyle> {
        self.last_style
    }

    /// Check that `style` can run in this drive mode.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnsupportedStyle` for `Microstep` on digital coils.
    pub fn check_style(&self, style: StepStyle) -> Result<(), MotorError> {
        match self.mode {
            DriveMode::Digital if !style.is_digital() => Err(MotorError::UnsupportedStyle(style)),
            _ => Ok(()),
        }
    }

    /// Take one step and return the new position.
    ///
    /// In microstepping mode a non-`Microstep` style first snaps an unaligned
    /// position to the nearest half-step boundary in the direction of travel;
    /// that snap is the whole step.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::UnsupportedStyle` without moving if the style
    /// cannot run in this drive mode.
    pub fn advance(&mut self, direction: Direction, style: StepStyle) -> Result<i64, MotorError> {
        self.check_style(style)?;

        let position = self.current_microstep;
        let next = match &self.mode {
            DriveMode::Digital => position + direction.sign(),
            DriveMode::Microstepping { microsteps, .. } => {
                Self::next_microstep(position, *microsteps, direction, style)
            }
        };

        self.current_microstep = next;
        self.last_style = Some(style);
        Ok(next)
    }

    fn next_microstep(position: i64, microsteps: Microsteps, direction: Direction, style: StepStyle) -> i64 {
        if style == StepStyle::Microstep {
            return position + direction.sign();
        }

        let half = microsteps.half() as i64;
        let full = microsteps.value() as i64;

        let misalignment = position.rem_euclid(half);
        if misalignment != 0 {
            return match direction {
                Direction::Forward => position + (half - misalignment),
                Direction::Backward => position - misalignment,
            };
        }

        let interleave_odd = position.div_euclid(half).rem_euclid(4) % 2 == 1;
        let step_size = match style {
            StepStyle::Interleave => half,
            StepStyle::Single if interleave_odd => half,
            StepStyle::Double if !interleave_odd => half,
            _ => full,
        };

        position + direction.sign() * step_size
    }

    /// Coil energization at the current position.
    pub fn energization(&self) -> Energization {
        match &self.mode {
            DriveMode::Digital => {
                let bits = self
                    .last_style
                    .and_then(pattern_table)
                    .map(|table| table[self.current_microstep.rem_euclid(table.len() as i64) as usize])
                    .unwrap_or(0);
                Energization::Pattern(bits)
            }
            DriveMode::Microstepping {
                microsteps,
                curve,
                duty_max,
            } => {
                let quantize = self.last_style != Some(StepStyle::Microstep);
                Energization::Duties(Self::duties(
                    self.current_microstep,
                    *microsteps,
                    curve,
                    *duty_max,
                    quantize,
                ))
            }
        }
    }

    fn duties(
        position: i64,
        microsteps: Microsteps,
        curve: &CurveTable,
        duty_max: u16,
        quantize: bool,
    ) -> [u16; COIL_COUNT] {
        let n = microsteps.value() as i64;
        let trailing = position.div_euclid(n).rem_euclid(COIL_COUNT as i64) as usize;
        let leading = (trailing + 1) % COIL_COUNT;
        let offset = position.rem_euclid(n) as usize;

        let mut duties = [0u16; COIL_COUNT];
        duties[leading] = curve.at(offset);
        duties[trailing] = curve.at(n as usize - offset);

        // Full and half step positions get full torque
        if quantize && duties[leading] == duties[trailing] && duties[leading] > 0 {
            duties[leading] = duty_max;
            duties[trailing] = duty_max;
        }

        duties
    }
}
