//! # stepper-coils
//!
//! Four-coil stepper motor control with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Digital stepping**: single, double and interleaved coil sequences on
//!   plain `OutputPin`s
//! - **Microstepping**: quarter-sine duty curves on `SetDutyCycle` channels
//! - **Position tracking**: signed microstep position, kept across release
//! - **Cooperative stop**: lock-free stop token polled once per step
//! - **Background motion** (`std`): single active-motion slot per motor
//! - **no_std compatible**: core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_coils::{Direction, DigitalCoils, StepStyle, StepperMotor};
//!
//! let mut motor = StepperMotor::builder()
//!     .coils(DigitalCoils::new(a1, a2, b1, b2))
//!     .delay(delay)
//!     .build()?;
//!
//! // Half a revolution at 30 rpm
//! motor.step(100, Direction::Forward, StepStyle::Double, 30.0)?;
//! motor.release()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and background motion
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod coils;
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;

// Re-exports for ergonomic API
pub use coils::{CoilKind, Coils, DigitalCoils, DutyResolution, Energization, PwmCoils, PwmFrequency};
pub use config::{validate_config, CoilPins, MotorConfig, SystemConfig};
pub use error::{Error, Result};
pub use motion::{Direction, MotionPlan, StepStyle, StopToken};
pub use motor::{CurveScaling, CurveTable, StepEngine, StepperMotor, StepperMotorBuilder};

#[cfg(feature = "std")]
pub use motion::{Execution, MotionTask, MotorHandle};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Degrees, Microsteps};
