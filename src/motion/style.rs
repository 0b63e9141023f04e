//! Step styles and direction of travel.

use serde::Deserialize;

use crate::error::MotorError;

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Increasing microstep position.
    #[default]
    Forward,
    /// Decreasing microstep position.
    Backward,
}

impl Direction {
    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Coil energization pattern family.
///
/// Trades torque against resolution:
/// - `Single`: one coil at a time.
/// - `Double`: two coils at a time, more torque.
/// - `Interleave`: alternates single and double, half steps.
/// - `Microstep`: partial energization of two neighboring coils (PWM only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum StepStyle {
    /// One coil energized per step.
    #[default]
    Single,
    /// Two coils energized per step.
    Double,
    /// Alternating single and double coil half steps.
    Interleave,
    /// Fractional steps via proportional PWM duty.
    Microstep,
}

impl StepStyle {
    /// All styles in numeric order.
    pub const ALL: [StepStyle; 4] = [
        StepStyle::Single,
        StepStyle::Double,
        StepStyle::Interleave,
        StepStyle::Microstep,
    ];

    /// Whether the style can run on digital coils.
    #[inline]
    pub fn is_digital(self) -> bool {
        !matches!(self, StepStyle::Microstep)
    }
}

impl TryFrom<u8> for StepStyle {
    type Error = MotorError;

    /// Numeric style codes: 1 single, 2 double, 3 interleave, 4 microstep.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(StepStyle::Single),
            2 => Ok(StepStyle::Double),
            3 => Ok(StepStyle::Interleave),
            4 => Ok(StepStyle::Microstep),
            other => Err(MotorError::InvalidStyle(other)),
        }
    }
}

impl From<StepStyle> for u8 {
    fn from(style: StepStyle) -> Self {
        match style {
            StepStyle::Single => 1,
            StepStyle::Double => 2,
            StepStyle::Interleave => 3,
            StepStyle::Microstep => 4,
        }
    }
}
