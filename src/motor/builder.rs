//! Builder pattern for StepperMotor.

use embedded_hal::delay::DelayNs;

use crate::coils::{CoilKind, Coils, DutyResolution};
use crate::config::units::Microsteps;
use crate::config::{MotorConfig, SystemConfig};
use crate::error::{ConfigError, Error, Result};
use crate::motion::StopToken;

use super::curve::{CurveScaling, CurveTable};
use super::driver::StepperMotor;
use super::engine::StepEngine;

/// Full steps per revolution of a 1.8° motor.
const DEFAULT_STEPS_PER_REVOLUTION: u16 = 200;

/// Builder for creating StepperMotor instances.
pub struct StepperMotorBuilder<C, D>
where
    C: Coils,
    D: DelayNs,
{
    coils: Option<C>,
    delay: Option<D>,
    name: Option<heapless::String<32>>,
    steps_per_revolution: u16,
    microsteps: Option<u16>,
    duty_resolution: Option<DutyResolution>,
    curve_scaling: CurveScaling,
    stop: Option<StopToken>,
}

impl<C, D> Default for StepperMotorBuilder<C, D>
where
    C: Coils,
    D: DelayNs,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, D> StepperMotorBuilder<C, D>
where
    C: Coils,
    D: DelayNs,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            coils: None,
            delay: None,
            name: None,
            steps_per_revolution: DEFAULT_STEPS_PER_REVOLUTION,
            microsteps: None,
            duty_resolution: None,
            curve_scaling: CurveScaling::default(),
            stop: None,
        }
    }

    /// Set the coil outputs.
    pub fn coils(mut self, coils: C) -> Self {
        self.coils = Some(coils);
        self
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the motor name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Set full steps per revolution (default 200).
    pub fn steps_per_revolution(mut self, steps: u16) -> Self {
        self.steps_per_revolution = steps;
        self
    }

    /// Set microsteps per full step; required for PWM coils.
    ///
    /// The value is validated by [`build`](Self::build).
    pub fn microsteps(mut self, microsteps: u16) -> Self {
        self.microsteps = Some(microsteps);
        self
    }

    /// Expect PWM coils with this duty resolution.
    ///
    /// Checked against the coils by [`build`](Self::build); ignored for
    /// digital coils.
    pub fn duty_resolution(mut self, resolution: DutyResolution) -> Self {
        self.duty_resolution = Some(resolution);
        self
    }

    /// Set the peak the microstep curve is built against.
    pub fn curve_scaling(mut self, scaling: CurveScaling) -> Self {
        self.curve_scaling = scaling;
        self
    }

    /// Use an existing stop token, e.g. one shared with an interrupt handler.
    ///
    /// Required without the `alloc` feature.
    pub fn stop_token(mut self, token: StopToken) -> Self {
        self.stop = Some(token);
        self
    }

    /// Configure from a MotorConfig.
    pub fn from_motor_config(mut self, config: &MotorConfig) -> Self {
        self.name = Some(config.name.clone());
        self.steps_per_revolution = config.steps_per_revolution;
        self.microsteps = config.microsteps.map(Microsteps::value);
        self.duty_resolution = Some(config.duty_resolution);
        self.curve_scaling = config.curve_scaling;
        self
    }

    /// Configure from SystemConfig by motor name.
    pub fn from_config(self, config: &SystemConfig, motor_name: &str) -> Result<Self> {
        let motor_config = config.motor(motor_name).ok_or_else(|| {
            Error::Config(ConfigError::MotorNotFound(
                heapless::String::try_from(motor_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.from_motor_config(motor_config))
    }

    /// Build the StepperMotor and energize its coils for position 0.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingField` if coils or delay are missing
    /// - `ConfigError::InvalidStepsPerRevolution` for zero steps
    /// - `ConfigError::InvalidMicrosteps` for an odd or out of range count
    /// - `ConfigError::MicrostepsRequirePwm` / `PwmRequiresMicrosteps` when
    ///   the microstep setting does not match the coils
    /// - `ConfigError::ResolutionMismatch` if an expected duty resolution
    ///   differs from the PWM coils'
    /// - `MotorError::PinError` if the initial coil write fails
    pub fn build(self) -> Result<StepperMotor<C, D>> {
        let stop = stop_or_default(self.stop)?;

        let coils = self
            .coils
            .ok_or(Error::Config(ConfigError::MissingField("coils")))?;
        let delay = self
            .delay
            .ok_or(Error::Config(ConfigError::MissingField("delay")))?;

        if self.steps_per_revolution == 0 {
            return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(0)));
        }

        let microsteps = self.microsteps.map(Microsteps::new).transpose()?;

        let engine = match (coils.kind(), microsteps) {
            (CoilKind::Digital, None) => StepEngine::digital(),
            (CoilKind::Digital, Some(_)) => {
                return Err(Error::Config(ConfigError::MicrostepsRequirePwm))
            }
            (CoilKind::Pwm { .. }, None) => {
                return Err(Error::Config(ConfigError::PwmRequiresMicrosteps))
            }
            (CoilKind::Pwm { duty_max }, Some(m)) => {
                if let Some(resolution) = self.duty_resolution {
                    if resolution.duty_max() != duty_max {
                        return Err(Error::Config(ConfigError::ResolutionMismatch {
                            configured: resolution.duty_max(),
                            coils: duty_max,
                        }));
                    }
                }
                let curve = match self.curve_scaling {
                    CurveScaling::Reference => CurveTable::new(m),
                    CurveScaling::Resolution => CurveTable::with_peak(m, duty_max),
                };
                StepEngine::microstepping(m, curve, duty_max)
            }
        };

        let name = self
            .name
            .unwrap_or_else(|| heapless::String::try_from("motor").unwrap_or_default());

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "stepper {}: {} steps/rev, microsteps {}",
            name.as_str(),
            self.steps_per_revolution,
            microsteps
        );

        StepperMotor::new(coils, delay, engine, self.steps_per_revolution, stop, name)
    }
}

#[cfg(feature = "alloc")]
fn stop_or_default(stop: Option<StopToken>) -> Result<StopToken> {
    Ok(stop.unwrap_or_default())
}

#[cfg(not(feature = "alloc"))]
fn stop_or_default(stop: Option<StopToken>) -> Result<StopToken> {
    stop.ok_or(Error::Config(ConfigError::MissingField("stop_token")))
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;

    use crate::coils::Energization;
    use crate::error::MotorError;

    struct FakeCoils(CoilKind);

    impl Coils for FakeCoils {
        fn kind(&self) -> CoilKind {
            self.0
        }

        fn energize(&mut self, _energization: &Energization) -> core::result::Result<(), MotorError> {
            Ok(())
        }
    }

    fn builder(kind: CoilKind) -> StepperMotorBuilder<FakeCoils, NoopDelay> {
        StepperMotorBuilder::new()
            .coils(FakeCoils(kind))
            .delay(NoopDelay::new())
    }

    #[test]
    fn test_missing_coils() {
        let result = StepperMotorBuilder::<FakeCoils, NoopDelay>::new()
            .delay(NoopDelay::new())
            .build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField("coils")))
        ));
    }

    #[test]
    fn test_microsteps_need_pwm() {
        let result = builder(CoilKind::Digital).microsteps(8).build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MicrostepsRequirePwm))
        ));
    }

    #[test]
    fn test_pwm_needs_microsteps() {
        let result = builder(CoilKind::Pwm { duty_max: 1023 }).build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::PwmRequiresMicrosteps))
        ));
    }

    #[test]
    fn test_invalid_microsteps() {
        for m in [0, 1, 7, 258, 512] {
            let result = builder(CoilKind::Pwm { duty_max: 1023 }).microsteps(m).build();
            assert!(matches!(
                result,
                Err(Error::Config(ConfigError::InvalidMicrosteps(v))) if v == m
            ));
        }
    }

    #[test]
    fn test_resolution_must_match_coils() {
        let result = builder(CoilKind::Pwm { duty_max: 1023 })
            .microsteps(8)
            .duty_resolution(DutyResolution::Bits16)
            .build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::ResolutionMismatch {
                configured: 65535,
                coils: 1023
            }))
        ));

        let motor = builder(CoilKind::Pwm { duty_max: 65535 })
            .microsteps(8)
            .duty_resolution(DutyResolution::Bits16)
            .build();
        assert!(motor.is_ok());
    }

    #[test]
    fn test_resolution_ignored_for_digital() {
        let motor = builder(CoilKind::Digital)
            .duty_resolution(DutyResolution::Bits16)
            .build();
        assert!(motor.is_ok());
    }

    #[test]
    fn test_zero_steps_per_revolution() {
        let result = builder(CoilKind::Digital).steps_per_revolution(0).build();
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidStepsPerRevolution(0)))
        ));
    }

    #[test]
    fn test_defaults() {
        let motor = builder(CoilKind::Pwm { duty_max: 1023 })
            .microsteps(16)
            .build()
            .unwrap();
        assert_eq!(motor.name(), "motor");
        assert_eq!(motor.steps_per_revolution(), 200);
        assert_eq!(motor.microsteps(), Some(Microsteps::SIXTEENTH));
        assert_eq!(motor.position(), 0);
    }

    #[test]
    fn test_from_config_unknown_motor() {
        let result = builder(CoilKind::Digital).from_config(&SystemConfig::default(), "tilt");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MotorNotFound(_)))
        ));
    }

    #[test]
    fn test_shared_stop_token() {
        let token = StopToken::new();
        let motor = builder(CoilKind::Digital)
            .stop_token(token.clone())
            .build()
            .unwrap();
        assert!(motor.stop_token().same_flag(&token));
    }
}
