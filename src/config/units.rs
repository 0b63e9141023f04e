//! Unit types for motor configuration.
//!
//! Provides type-safe representations of angles and microstep divisors so
//! invalid values are rejected where they enter the system.

use serde::Deserialize;

use crate::error::ConfigError;

/// Angular displacement in degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Degrees(pub f32);

impl Degrees {
    /// Create a new Degrees value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Whole motor steps covering this angle, rounded to nearest.
    ///
    /// Negative angles cover no steps.
    pub fn to_steps(self, steps_per_revolution: u16) -> u32 {
        let steps = libm::roundf(steps_per_revolution as f32 * self.0 / 360.0);
        if steps > 0.0 {
            steps as u32
        } else {
            0
        }
    }

    /// Angle covered by a signed microstep position.
    pub fn from_microsteps(position: i64, steps_per_revolution: u16, microsteps: u16) -> Self {
        let per_rev = steps_per_revolution as f32 * microsteps.max(1) as f32;
        Self(position as f32 * 360.0 / per_rev)
    }
}

/// Microsteps per full step for PWM driven coils.
///
/// Validated at construction to be even and at least 2. The curve table
/// holds at most 256 entries per quarter step, which caps the divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Microsteps(u16);

impl Microsteps {
    /// Half step.
    pub const HALF: Self = Self(2);
    /// Quarter step.
    pub const QUARTER: Self = Self(4);
    /// Eighth step.
    pub const EIGHTH: Self = Self(8);
    /// Sixteenth step.
    pub const SIXTEENTH: Self = Self(16);
    /// Thirty-second step.
    pub const THIRTY_SECOND: Self = Self(32);

    /// Smallest accepted divisor.
    pub const MIN: u16 = 2;
    /// Largest accepted divisor, bounded by the curve table capacity.
    pub const MAX: u16 = 256;

    /// Create a new Microsteps value with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMicrosteps` if the value is odd or out of range.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        if Self::is_valid(value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidMicrosteps(value))
        }
    }

    /// Get the raw divisor value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Microsteps in half a full step.
    #[inline]
    pub const fn half(self) -> u16 {
        self.0 / 2
    }

    /// Check if a value is valid.
    #[inline]
    pub fn is_valid(value: u16) -> bool {
        (Self::MIN..=Self::MAX).contains(&value) && value % 2 == 0
    }
}

impl TryFrom<u16> for Microsteps {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Microsteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        Microsteps::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}
