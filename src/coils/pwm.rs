//! PWM coil outputs for microstepping.

use embedded_hal::pwm::SetDutyCycle;
use serde::Deserialize;

use crate::error::{ConfigError, MotorError};

use super::{CoilKind, Coils, Energization, COIL_COUNT};

/// Lowest accepted coil PWM frequency.
pub const MIN_PWM_FREQUENCY_HZ: u32 = 1500;

/// Frequency requested from adjustable channels running too slow.
pub const FALLBACK_PWM_FREQUENCY_HZ: u32 = 2000;

/// Returned by channels whose frequency cannot be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixedFrequency;

/// Frequency control of a PWM channel.
pub trait PwmFrequency {
    /// Current output frequency.
    fn frequency_hz(&self) -> u32;

    /// Change the output frequency.
    ///
    /// Channels tied to a shared, fixed timer keep the default and refuse.
    fn set_frequency_hz(&mut self, _hz: u32) -> Result<(), FixedFrequency> {
        Err(FixedFrequency)
    }
}

/// Duty cycle resolution of the coil channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DutyResolution {
    /// 10-bit duty, 0..=1023.
    #[default]
    #[serde(rename = "10bit")]
    Bits10,
    /// 16-bit duty, 0..=65535.
    #[serde(rename = "16bit")]
    Bits16,
}

impl DutyResolution {
    /// Duty value of a fully energized coil.
    #[inline]
    pub const fn duty_max(self) -> u16 {
        match self {
            DutyResolution::Bits10 => 1023,
            DutyResolution::Bits16 => u16::MAX,
        }
    }
}

/// Four PWM coil outputs in `A2 B1 A1 B2` drive order.
///
/// The microstep energization walks the coils cyclically, and this order
/// puts the two phases in the sequence that walk expects.
pub struct PwmCoils<W>
where
    W: SetDutyCycle + PwmFrequency,
{
    channels: [W; COIL_COUNT],
    resolution: DutyResolution,
}

impl<W> PwmCoils<W>
where
    W: SetDutyCycle + PwmFrequency,
{
    /// Create a coil set from its four channels, named by coil.
    ///
    /// Channels below [`MIN_PWM_FREQUENCY_HZ`] are moved to
    /// [`FALLBACK_PWM_FREQUENCY_HZ`].
    ///
    /// # Errors
    ///
    /// - `ConfigError::PwmFrequencyTooLow` if a slow channel has a fixed frequency
    /// - `ConfigError::DutyResolutionMismatch` if a channel's duty range is
    ///   not exactly the resolution's maximum
    pub fn new(a1: W, a2: W, b1: W, b2: W, resolution: DutyResolution) -> Result<Self, ConfigError> {
        let mut channels = [a2, b1, a1, b2];

        for (coil, channel) in channels.iter_mut().enumerate() {
            let frequency_hz = channel.frequency_hz();
            if frequency_hz < MIN_PWM_FREQUENCY_HZ {
                channel
                    .set_frequency_hz(FALLBACK_PWM_FREQUENCY_HZ)
                    .map_err(|FixedFrequency| ConfigError::PwmFrequencyTooLow {
                        coil: coil as u8,
                        frequency_hz,
                    })?;
            }

            let available = channel.max_duty_cycle();
            if available != resolution.duty_max() {
                return Err(ConfigError::DutyResolutionMismatch {
                    coil: coil as u8,
                    required: resolution.duty_max(),
                    available,
                });
            }
        }

        Ok(Self {
            channels,
            resolution,
        })
    }

    /// Resolution the duties are written with.
    #[inline]
    pub fn resolution(&self) -> DutyResolution {
        self.resolution
    }

    /// Give the channels back in `A2 B1 A1 B2` drive order.
    pub fn into_channels(self) -> [W; COIL_COUNT] {
        self.channels
    }
}

impl<W> Coils for PwmCoils<W>
where
    W: SetDutyCycle + PwmFrequency,
{
    fn kind(&self) -> CoilKind {
        CoilKind::Pwm {
            duty_max: self.resolution.duty_max(),
        }
    }

    fn energize(&mut self, energization: &Energization) -> Result<(), MotorError> {
        let duty_max = self.resolution.duty_max();

        for (i, channel) in self.channels.iter_mut().enumerate() {
            let duty = match energization {
                Energization::Duties(duties) => duties[i].min(duty_max),
                Energization::Pattern(_) if energization.is_energized(i) => duty_max,
                Energization::Pattern(_) => 0,
            };
            channel
                .set_duty_cycle(duty)
                .map_err(|_| MotorError::PinError)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Debug, Default)]
    struct Channel {
        id: u8,
        frequency_hz: u32,
        adjustable: bool,
        max_duty: u16,
        duty: u16,
    }

    impl Channel {
        fn new(id: u8, frequency_hz: u32, adjustable: bool, resolution: DutyResolution) -> Self {
            Self {
                id,
                frequency_hz,
                adjustable,
                max_duty: resolution.duty_max(),
                duty: 0,
            }
        }
    }

    fn fixed(id: u8, resolution: DutyResolution) -> Channel {
        Channel::new(id, 5000, false, resolution)
    }

    impl embedded_hal::pwm::ErrorType for Channel {
        type Error = Infallible;
    }

    impl SetDutyCycle for Channel {
        fn max_duty_cycle(&self) -> u16 {
            self.max_duty
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    impl PwmFrequency for Channel {
        fn frequency_hz(&self) -> u32 {
            self.frequency_hz
        }

        fn set_frequency_hz(&mut self, hz: u32) -> Result<(), FixedFrequency> {
            if self.adjustable {
                self.frequency_hz = hz;
                Ok(())
            } else {
                Err(FixedFrequency)
            }
        }
    }

    fn duties(coils: &PwmCoils<Channel>) -> [u16; 4] {
        [0, 1, 2, 3].map(|i| coils.channels[i].duty)
    }

    #[test]
    fn test_drive_order() {
        let bits16 = DutyResolution::Bits16;
        let coils = PwmCoils::new(fixed(1, bits16), fixed(2, bits16), fixed(3, bits16), fixed(4, bits16), bits16)
            .unwrap();

        let ids: [u8; 4] = coils.into_channels().map(|c| c.id);
        // A2 B1 A1 B2
        assert_eq!(ids, [2, 3, 1, 4]);
    }

    #[test]
    fn test_slow_adjustable_channel_is_raised() {
        let bits10 = DutyResolution::Bits10;
        let coils = PwmCoils::new(
            Channel::new(1, 1000, true, bits10),
            fixed(2, bits10),
            fixed(3, bits10),
            fixed(4, bits10),
            bits10,
        )
        .unwrap();

        let channels = coils.into_channels();
        assert_eq!(channels[2].frequency_hz, FALLBACK_PWM_FREQUENCY_HZ);
    }

    #[test]
    fn test_slow_fixed_channel_is_rejected() {
        let bits10 = DutyResolution::Bits10;
        let result = PwmCoils::new(
            fixed(1, bits10),
            fixed(2, bits10),
            Channel::new(3, 1000, false, bits10),
            fixed(4, bits10),
            bits10,
        );

        // B1 sits in slot 1 of the drive order
        assert!(matches!(
            result,
            Err(ConfigError::PwmFrequencyTooLow {
                coil: 1,
                frequency_hz: 1000
            })
        ));
    }

    #[test]
    fn test_resolution_beyond_channel() {
        let bits16 = DutyResolution::Bits16;
        let result = PwmCoils::new(
            fixed(1, bits16),
            fixed(2, bits16),
            fixed(3, bits16),
            fixed(4, DutyResolution::Bits10),
            bits16,
        );

        assert!(matches!(
            result,
            Err(ConfigError::DutyResolutionMismatch {
                coil: 3,
                required: 65535,
                available: 1023
            })
        ));
    }

    #[test]
    fn test_wider_channel_rejected() {
        // 10-bit duties on a 16-bit channel would top out near 1.6 %
        let bits16 = DutyResolution::Bits16;
        let result = PwmCoils::new(
            fixed(1, bits16),
            fixed(2, bits16),
            fixed(3, bits16),
            fixed(4, bits16),
            DutyResolution::Bits10,
        );

        assert!(matches!(
            result,
            Err(ConfigError::DutyResolutionMismatch {
                coil: 0,
                required: 1023,
                available: 65535
            })
        ));
    }

    #[test]
    fn test_pattern_and_release() {
        let bits10 = DutyResolution::Bits10;
        let mut coils = PwmCoils::new(fixed(1, bits10), fixed(2, bits10), fixed(3, bits10), fixed(4, bits10), bits10)
            .unwrap();

        coils.energize(&Energization::Pattern(0b0101)).unwrap();
        assert_eq!(duties(&coils), [1023, 0, 1023, 0]);
        assert_eq!(coils.channels[0].max_duty_cycle(), 1023);

        coils.energize(&Energization::Duties([2000, 5, 0, 0])).unwrap();
        assert_eq!(duties(&coils), [1023, 5, 0, 0]);

        coils.release().unwrap();
        assert_eq!(duties(&coils), [0, 0, 0, 0]);
    }
}
