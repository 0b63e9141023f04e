//! Basic motor control example.
//!
//! Drives a digital motor through each step style, then builds a
//! microstepping motor from a TOML description.
//!
//! Mock pins and channels stand in for real hardware.

use stepper_coils::{
    Degrees, Direction, DigitalCoils, DutyResolution, Energization, PwmCoils, PwmFrequency, StepStyle,
    StepperMotor,
};

/// Mock delay provider for demonstration.
struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        // In real code, this would use hardware timer
        std::thread::sleep(std::time::Duration::from_nanos(ns as u64));
    }
}

/// Mock output pin for demonstration.
struct MockPin {
    state: bool,
}

impl MockPin {
    fn new() -> Self {
        Self { state: false }
    }
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.state = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.state = false;
        Ok(())
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

/// Mock PWM channel on a 20 kHz timer.
struct MockChannel {
    duty: u16,
    max_duty: u16,
}

impl MockChannel {
    fn new(resolution: DutyResolution) -> Self {
        Self {
            duty: 0,
            max_duty: resolution.duty_max(),
        }
    }
}

impl embedded_hal::pwm::ErrorType for MockChannel {
    type Error = core::convert::Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for MockChannel {
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty;
        Ok(())
    }
}

impl PwmFrequency for MockChannel {
    fn frequency_hz(&self) -> u32 {
        20_000
    }
}

fn show(energization: Energization) -> String {
    match energization {
        Energization::Pattern(bits) => format!("pattern {:04b}", bits),
        Energization::Duties(duties) => format!("duties {:?}", duties),
    }
}

fn main() {
    println!("=== Basic Motor Control Example ===\n");

    let coils = DigitalCoils::new(MockPin::new(), MockPin::new(), MockPin::new(), MockPin::new());

    let mut motor = StepperMotor::builder()
        .name("demo_motor")
        .coils(coils)
        .delay(MockDelay)
        .steps_per_revolution(200)
        .build()
        .expect("Failed to build motor");

    println!("Motor created: {}", motor.name());

    for style in [StepStyle::Single, StepStyle::Double, StepStyle::Interleave] {
        let taken = motor
            .step(4, Direction::Forward, style, 5.0)
            .expect("Step failed");
        println!(
            "{:?}: {} steps, position {}, {}",
            style,
            taken,
            motor.position(),
            show(motor.energization())
        );
    }

    let taken = motor
        .angle(Degrees(45.0), Direction::Backward, StepStyle::Double, 5.0)
        .expect("Angle move failed");
    println!(
        "45 degrees back: {} steps, now at {:.1} degrees",
        taken,
        motor.position_degrees().value()
    );

    motor.release().expect("Release failed");
    println!("Released: {}", show(motor.energization()));

    println!("\n=== Configuration Loading ===");

    let toml_content = r#"
[motors.pan]
name = "pan"
steps_per_revolution = 200
microsteps = 8
duty_resolution = "10bit"

[motors.pan.pins]
a1 = 2
a2 = 3
b1 = 4
b2 = 5
"#;

    let config = stepper_coils::parse_config(toml_content).expect("Failed to parse config");
    stepper_coils::validate_config(&config).expect("Configuration validation failed");
    println!("Loaded configuration with {} motor(s)", config.motors.len());

    let resolution = DutyResolution::Bits10;
    let coils = PwmCoils::new(
        MockChannel::new(resolution),
        MockChannel::new(resolution),
        MockChannel::new(resolution),
        MockChannel::new(resolution),
        resolution,
    )
    .expect("Channels rejected");

    let mut pan = StepperMotor::builder()
        .from_config(&config, "pan")
        .expect("Motor not found")
        .coils(coils)
        .delay(MockDelay)
        .build()
        .expect("Failed to build motor");

    for _ in 0..4 {
        pan.onestep(Direction::Forward, StepStyle::Microstep)
            .expect("Microstep failed");
        println!("position {}: {}", pan.position(), show(pan.energization()));
    }

    pan.onestep(Direction::Forward, StepStyle::Double)
        .expect("Step failed");
    println!("double step to {}: {}", pan.position(), show(pan.energization()));

    println!("\n=== Example Complete ===");
}
