//! Motion module for stepper-coils.
//!
//! Provides step styles, the stop token and the fixed-delay sequencer that
//! runs a motor on the caller's context or on a worker thread.

mod cancel;
pub(crate) mod sequencer;
mod style;
#[cfg(feature = "std")]
mod task;

pub use cancel::StopToken;
pub use sequencer::{step_interval_ns, MotionPlan};
pub use style::{Direction, StepStyle};

#[cfg(feature = "std")]
pub use task::{Execution, MotionTask, MotorHandle};
