//! Motor module for stepper-coils.
//!
//! Provides the step engine that tracks position and energization, and the
//! stepper motor driver that applies it to coil outputs.

mod builder;
mod curve;
mod driver;
mod engine;

pub use builder::StepperMotorBuilder;
pub use curve::{CurveScaling, CurveTable, CURVE_REFERENCE_PEAK};
pub use driver::StepperMotor;
pub use engine::{pattern_table, StepEngine};
