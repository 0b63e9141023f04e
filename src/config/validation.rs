//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Steps per revolution are positive
/// - No pin drives two coils
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for motor in config.motors.values() {
        validate_motor(motor)?;
    }

    Ok(())
}

fn validate_motor(config: &super::MotorConfig) -> Result<()> {
    if config.steps_per_revolution == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(
            config.steps_per_revolution,
        )));
    }

    if let Some(pin) = config.pins.duplicate() {
        return Err(Error::Config(ConfigError::DuplicatePin(pin)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coils::DutyResolution;
    use crate::config::{CoilPins, MotorConfig};
    use crate::motor::CurveScaling;

    fn make_test_config() -> MotorConfig {
        MotorConfig {
            name: heapless::String::try_from("test").unwrap(),
            pins: CoilPins {
                a1: 0,
                a2: 1,
                b1: 2,
                b2: 3,
            },
            steps_per_revolution: 200,
            microsteps: None,
            duty_resolution: DutyResolution::Bits10,
            curve_scaling: CurveScaling::Reference,
        }
    }

    #[test]
    fn test_valid_motor() {
        assert!(validate_motor(&make_test_config()).is_ok());
    }

    #[test]
    fn test_zero_steps_per_revolution() {
        let config = MotorConfig {
            steps_per_revolution: 0,
            ..make_test_config()
        };

        let result = validate_motor(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidStepsPerRevolution(0)))
        ));
    }

    #[test]
    fn test_duplicate_pin() {
        let mut config = make_test_config();
        config.pins.b2 = config.pins.a1;

        let result = validate_motor(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::DuplicatePin(0)))
        ));
    }
}
