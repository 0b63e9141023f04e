//! Fixed-delay motion sequencing.
//!
//! A [`MotionPlan`] describes a run of identical steps. The same loop drives
//! a motor on the caller's context and on a background task; only the way a
//! step is taken and the way time passes differ.

use embedded_hal::delay::DelayNs;

use crate::error::{MotorError, Result};

use super::cancel::StopToken;
use super::style::{Direction, StepStyle};

/// A run of equally spaced steps.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionPlan {
    /// Direction of every step.
    pub direction: Direction,

    /// Style of every step.
    pub style: StepStyle,

    /// Pause after each step in nanoseconds.
    pub interval_ns: u64,

    /// Steps left to take; `None` runs until stopped.
    pub remaining: Option<u32>,
}

impl MotionPlan {
    /// Plan `count` steps at `rpm`.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::InvalidSpeed` if `rpm` is not finite and positive.
    pub fn counted(
        count: u32,
        direction: Direction,
        style: StepStyle,
        rpm: f32,
        steps_per_revolution: u16,
    ) -> core::result::Result<Self, MotorError> {
        Ok(Self {
            direction,
            style,
            interval_ns: step_interval_ns(rpm, steps_per_revolution)?,
            remaining: Some(count),
        })
    }

    /// Plan steps at `rpm` until a stop is requested.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::InvalidSpeed` if `rpm` is not finite and positive.
    pub fn continuous(
        direction: Direction,
        style: StepStyle,
        rpm: f32,
        steps_per_revolution: u16,
    ) -> core::result::Result<Self, MotorError> {
        Ok(Self {
            direction,
            style,
            interval_ns: step_interval_ns(rpm, steps_per_revolution)?,
            remaining: None,
        })
    }

    /// Whether every counted step has been taken.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Record one step taken.
    #[inline]
    fn advance(&mut self) {
        if let Some(n) = self.remaining.as_mut() {
            *n = n.saturating_sub(1);
        }
    }
}

/// Pause between steps: `1 / (rpm * steps_per_revolution)` seconds.
///
/// # Errors
///
/// Returns `MotorError::InvalidSpeed` if `rpm` is not finite and positive.
pub fn step_interval_ns(rpm: f32, steps_per_revolution: u16) -> core::result::Result<u64, MotorError> {
    if !(rpm.is_finite() && rpm > 0.0) {
        return Err(MotorError::InvalidSpeed(rpm));
    }
    let steps_per_sec = rpm as f64 * steps_per_revolution.max(1) as f64;
    Ok((1_000_000_000.0 / steps_per_sec) as u64)
}

/// Something that can take a step and let time pass.
pub(crate) trait Stepping {
    /// Take one step, returning the new position.
    fn onestep(&mut self, direction: Direction, style: StepStyle) -> Result<i64>;

    /// Wait between two steps.
    fn pause_ns(&mut self, ns: u64);
}

/// Drive `stepper` through `plan` until done or stopped.
///
/// Stop is polled before every step, so a request issued during a pause
/// prevents the next step. The flag is cleared on every exit.
/// Returns the number of steps taken.
pub(crate) fn run<S: Stepping>(stepper: &mut S, mut plan: MotionPlan, stop: &StopToken) -> Result<u32> {
    let mut taken = 0u32;

    let result = loop {
        if plan.is_complete() || stop.is_requested() {
            break Ok(());
        }
        if let Err(e) = stepper.onestep(plan.direction, plan.style) {
            break Err(e);
        }
        taken = taken.saturating_add(1);
        plan.advance();
        stepper.pause_ns(plan.interval_ns);
    };

    stop.clear();

    #[cfg(feature = "defmt")]
    defmt::trace!("motion ended after {} steps", taken);

    result.map(|_| taken)
}

/// Block on `delay` for `ns` nanoseconds, falling back to microseconds for
/// pauses longer than `u32::MAX` nanoseconds.
pub(crate) fn pause<D: DelayNs>(delay: &mut D, ns: u64) {
    match u32::try_from(ns) {
        Ok(ns) => delay.delay_ns(ns),
        Err(_) => {
            let us = ns / 1_000;
            delay.delay_us(u32::try_from(us).unwrap_or(u32::MAX));
        }
    }
}
