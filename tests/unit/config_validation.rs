//! Unit tests for configuration validation and motor construction.

use embedded_hal_mock::eh1::delay::NoopDelay;

use stepper_coils::config::{validate_config, SystemConfig};
use stepper_coils::error::{ConfigError, Error, MotorError};
use stepper_coils::{CoilKind, Coils, Energization, StepperMotor};

/// Coils reporting a fixed kind.
struct Outputs(CoilKind);

impl Coils for Outputs {
    fn kind(&self) -> CoilKind {
        self.0
    }

    fn energize(&mut self, _energization: &Energization) -> Result<(), MotorError> {
        Ok(())
    }
}

fn motor_toml(extra: &str, b2: u8) -> String {
    format!(
        r#"
[motors.m1]
name = "Motor"
{extra}

[motors.m1.pins]
a1 = 0
a2 = 1
b1 = 2
b2 = {b2}
"#
    )
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let config: SystemConfig = toml::from_str(&motor_toml("microsteps = 16", 3)).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a pin shared by two coils.
#[test]
fn test_shared_pin_rejected() {
    let config: SystemConfig = toml::from_str(&motor_toml("", 1)).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(result, Err(Error::Config(ConfigError::DuplicatePin(1)))));
}

/// Test validation fails for zero steps per revolution.
#[test]
fn test_zero_steps_rejected() {
    let config: SystemConfig =
        toml::from_str(&motor_toml("steps_per_revolution = 0", 3)).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidStepsPerRevolution(0)))
    ));
}

/// Test building a motor from its configuration entry.
#[test]
fn test_build_from_config() {
    let config: SystemConfig = toml::from_str(&motor_toml("microsteps = 8\nsteps_per_revolution = 48", 3))
        .expect("Failed to parse TOML");

    let motor = StepperMotor::builder()
        .from_config(&config, "m1")
        .expect("Motor not found")
        .coils(Outputs(CoilKind::Pwm { duty_max: 1023 }))
        .delay(NoopDelay::new())
        .build()
        .expect("Failed to build motor");

    assert_eq!(motor.name(), "Motor");
    assert_eq!(motor.steps_per_revolution(), 48);
    assert_eq!(motor.microsteps().map(|m| m.value()), Some(8));
}

/// Test that a microstepping entry cannot drive digital outputs.
#[test]
fn test_microstepping_config_on_digital_outputs() {
    let config: SystemConfig = toml::from_str(&motor_toml("microsteps = 8", 3)).expect("Failed to parse TOML");

    let result = StepperMotor::builder()
        .from_config(&config, "m1")
        .expect("Motor not found")
        .coils(Outputs(CoilKind::Digital))
        .delay(NoopDelay::new())
        .build();

    assert!(matches!(result, Err(Error::Config(ConfigError::MicrostepsRequirePwm))));
}

/// Test that a configured duty resolution must match the PWM outputs.
#[test]
fn test_configured_resolution_must_match_outputs() {
    let config: SystemConfig = toml::from_str(&motor_toml("microsteps = 8\nduty_resolution = \"16bit\"", 3))
        .expect("Failed to parse TOML");

    let result = StepperMotor::builder()
        .from_config(&config, "m1")
        .expect("Motor not found")
        .coils(Outputs(CoilKind::Pwm { duty_max: 1023 }))
        .delay(NoopDelay::new())
        .build();

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ResolutionMismatch {
            configured: 65535,
            coils: 1023
        }))
    ));

    let motor = StepperMotor::builder()
        .from_config(&config, "m1")
        .expect("Motor not found")
        .coils(Outputs(CoilKind::Pwm { duty_max: 65535 }))
        .delay(NoopDelay::new())
        .build();
    assert!(motor.is_ok());
}
