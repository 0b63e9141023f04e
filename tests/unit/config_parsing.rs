//! Unit tests for TOML configuration parsing.

use stepper_coils::config::{load_config, parse_config, SystemConfig};
use stepper_coils::error::{ConfigError, Error};
use stepper_coils::{CurveScaling, DutyResolution, Microsteps};

const BENCH_CONFIG: &str = r#"
[motors.feeder]
name = "Feeder"

[motors.feeder.pins]
a1 = 12
a2 = 13
b1 = 14
b2 = 15

[motors.pan]
name = "Pan"
steps_per_revolution = 400
microsteps = 32
duty_resolution = "16bit"

[motors.pan.pins]
a1 = 2
a2 = 3
b1 = 4
b2 = 5
"#;

/// Test parsing a digital and a microstepping motor side by side.
#[test]
fn test_parse_mixed_motors() {
    let config = parse_config(BENCH_CONFIG).expect("Failed to parse TOML");

    let names: Vec<_> = config.motor_names().collect();
    assert_eq!(names, ["feeder", "pan"]);

    let feeder = config.motor("feeder").expect("Motor not found");
    assert_eq!(feeder.name.as_str(), "Feeder");
    assert!(!feeder.is_microstepping());
    assert_eq!(feeder.microsteps_per_revolution(), 200);
    assert_eq!(feeder.drive_order(), [12, 13, 14, 15]);

    let pan = config.motor("pan").expect("Motor not found");
    assert_eq!(pan.microsteps, Some(Microsteps::THIRTY_SECOND));
    assert_eq!(pan.duty_resolution, DutyResolution::Bits16);
    assert_eq!(pan.curve_scaling, CurveScaling::Reference);
    assert_eq!(pan.microsteps_per_revolution(), 12_800);
}

/// Test that every accepted microstep divisor parses.
#[test]
fn test_parse_microstep_values() {
    for value in [2u16, 4, 8, 16, 32, 64, 128, 256] {
        let toml = format!(
            r#"
[motors.m1]
name = "Motor"
microsteps = {value}

[motors.m1.pins]
a1 = 0
a2 = 1
b1 = 2
b2 = 3
"#
        );

        let config = parse_config(&toml).unwrap_or_else(|e| panic!("microsteps {}: {}", value, e));
        let motor = config.motor("m1").unwrap();
        assert_eq!(motor.microsteps.map(|m| m.value()), Some(value));
    }
}

/// Test that a missing pin table is a parse error.
#[test]
fn test_missing_pins_rejected() {
    let toml_str = r#"
[motors.m1]
name = "Motor"
"#;

    let result = parse_config(toml_str);
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// Test that an unknown duty resolution is a parse error.
#[test]
fn test_unknown_duty_resolution_rejected() {
    let toml_str = r#"
[motors.m1]
name = "Motor"
microsteps = 8
duty_resolution = "12bit"

[motors.m1.pins]
a1 = 0
a2 = 1
b1 = 2
b2 = 3
"#;

    let result = parse_config(toml_str);
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// Test loading a configuration file from disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("stepper-coils-{}.toml", std::process::id()));
    std::fs::write(&path, BENCH_CONFIG).expect("Failed to write config");

    let config: SystemConfig = load_config(&path).expect("Failed to load config");
    let _ = std::fs::remove_file(&path);

    assert!(config.motor("pan").is_some());
    assert!(config.motor("tilt").is_none());
}
