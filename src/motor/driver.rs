//! Stepper motor driver.
//!
//! Generic over the coil outputs and an embedded-hal 1.0 delay provider.

use embedded_hal::delay::DelayNs;

use crate::coils::{CoilKind, Coils, Energization};
use crate::config::units::{Degrees, Microsteps};
use crate::error::Result;
use crate::motion::sequencer::{self, MotionPlan, Stepping};
use crate::motion::{Direction, StepStyle, StopToken};

use super::builder::StepperMotorBuilder;
use super::engine::StepEngine;

/// Four-coil stepper motor.
///
/// Generic over:
/// - `C`: coil outputs (must implement [`Coils`])
/// - `D`: delay provider (must implement `DelayNs`)
///
/// Motion runs on the caller's context; [`stop`](Self::stop) or a clone of
/// [`stop_token`](Self::stop_token) ends a run at the next step boundary.
/// Dropping the motor releases the coils.
pub struct StepperMotor<C, D>
where
    C: Coils,
    D: DelayNs,
{
    /// Coil outputs.
    coils: C,

    /// Delay provider for step timing.
    delay: D,

    /// Position and energization state.
    engine: StepEngine,

    /// Full steps per revolution.
    steps_per_revolution: u16,

    /// Cooperative stop request.
    stop: StopToken,

    /// Motor name for logging/debugging.
    name: heapless::String<32>,
}

impl<C, D> StepperMotor<C, D>
where
    C: Coils,
    D: DelayNs,
{
    /// Start building a motor.
    pub fn builder() -> StepperMotorBuilder<C, D> {
        StepperMotorBuilder::new()
    }

    /// Create a motor and energize its coils for position 0.
    pub(crate) fn new(
        coils: C,
        delay: D,
        engine: StepEngine,
        steps_per_revolution: u16,
        stop: StopToken,
        name: heapless::String<32>,
    ) -> Result<Self> {
        let mut motor = Self {
            coils,
            delay,
            engine,
            steps_per_revolution,
            stop,
            name,
        };
        motor.apply()?;
        Ok(motor)
    }

    /// Get the motor name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Current position in microsteps (full steps on digital coils).
    #[inline]
    pub fn position(&self) -> i64 {
        self.engine.position()
    }

    /// Current position as an angle from the origin.
    pub fn position_degrees(&self) -> Degrees {
        let divisor = self.microsteps().map(Microsteps::value).unwrap_or(1);
        Degrees::from_microsteps(self.engine.position(), self.steps_per_revolution, divisor)
    }

    /// Full steps per revolution.
    #[inline]
    pub fn steps_per_revolution(&self) -> u16 {
        self.steps_per_revolution
    }

    /// Microsteps per full step, `None` on digital coils.
    #[inline]
    pub fn microsteps(&self) -> Option<Microsteps> {
        self.engine.microsteps()
    }

    /// Output capability of the coils.
    #[inline]
    pub fn coil_kind(&self) -> CoilKind {
        self.coils.kind()
    }

    /// Energization for the current position.
    #[inline]
    pub fn energization(&self) -> Energization {
        self.engine.energization()
    }

    /// A handle that stops this motor's runs from another context.
    #[inline]
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Whether a stop is pending.
    #[inline]
    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_requested()
    }

    /// Take one step of a particular style and return the new position.
    ///
    /// # Errors
    ///
    /// - `MotorError::UnsupportedStyle` if the style cannot run on these
    ///   coils; the motor does not move
    /// - `MotorError::PinError` if a coil write fails
    pub fn onestep(&mut self, direction: Direction, style: StepStyle) -> Result<i64> {
        let position = self.engine.advance(direction, style)?;
        self.apply()?;
        Ok(position)
    }

    /// Take `count` steps, pausing `1 / (rpm * steps_per_revolution)` seconds
    /// after each.
    ///
    /// Returns early if a stop is requested; the request is then cleared.
    /// Returns the number of steps taken.
    ///
    /// # Errors
    ///
    /// Style and speed are checked before the first step:
    /// `MotorError::UnsupportedStyle`, `MotorError::InvalidSpeed`.
    /// A failed coil write ends the run with `MotorError::PinError`.
    pub fn step(&mut self, count: u32, direction: Direction, style: StepStyle, rpm: f32) -> Result<u32> {
        let plan = self.plan(Some(count), direction, style, rpm)?;
        self.run(plan)
    }

    /// Turn through an angle, rounded to whole steps.
    ///
    /// Negative angles take no steps.
    ///
    /// # Errors
    ///
    /// Same as [`step`](Self::step).
    pub fn angle(&mut self, degrees: Degrees, direction: Direction, style: StepStyle, rpm: f32) -> Result<u32> {
        let count = degrees.to_steps(self.steps_per_revolution);
        self.step(count, direction, style, rpm)
    }

    /// Step until a stop is requested, then clear the request.
    ///
    /// Blocks the caller, so the stop must come from another context through
    /// a [`StopToken`].
    ///
    /// # Errors
    ///
    /// Same as [`step`](Self::step).
    pub fn continuous(&mut self, direction: Direction, style: StepStyle, rpm: f32) -> Result<u32> {
        let plan = self.plan(None, direction, style, rpm)?;
        self.run(plan)
    }

    /// Validate a run of `count` steps, or an endless one, without moving.
    pub(crate) fn plan(
        &self,
        count: Option<u32>,
        direction: Direction,
        style: StepStyle,
        rpm: f32,
    ) -> Result<MotionPlan> {
        self.engine.check_style(style)?;
        let plan = match count {
            Some(count) => MotionPlan::counted(count, direction, style, rpm, self.steps_per_revolution)?,
            None => MotionPlan::continuous(direction, style, rpm, self.steps_per_revolution)?,
        };
        Ok(plan)
    }

    /// Ask the current run to end at its next step boundary.
    pub fn stop(&self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("stepper {}: stop requested", self.name.as_str());

        self.stop.request();
    }

    /// Switch every coil off so the shaft spins freely.
    ///
    /// The position is kept; the next step energizes the coils again.
    pub fn release(&mut self) -> Result<()> {
        self.coils.release()?;
        Ok(())
    }

    fn run(&mut self, plan: MotionPlan) -> Result<u32> {
        #[cfg(feature = "defmt")]
        defmt::debug!("stepper {}: {}", self.name.as_str(), plan);

        let stop = self.stop.clone();
        sequencer::run(self, plan, &stop)
    }

    fn apply(&mut self) -> Result<()> {
        let energization = self.engine.energization();
        self.coils.energize(&energization)?;
        Ok(())
    }
}

impl<C, D> Stepping for StepperMotor<C, D>
where
    C: Coils,
    D: DelayNs,
{
    fn onestep(&mut self, direction: Direction, style: StepStyle) -> Result<i64> {
        StepperMotor::onestep(self, direction, style)
    }

    fn pause_ns(&mut self, ns: u64) {
        sequencer::pause(&mut self.delay, ns);
    }
}

impl<C, D> Drop for StepperMotor<C, D>
where
    C: Coils,
    D: DelayNs,
{
    fn drop(&mut self) {
        // Nothing left to report a failure to
        let _ = self.coils.release();
    }
}
