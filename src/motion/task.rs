//! Background motion on a worker thread (std only).
//!
//! A [`MotorHandle`] owns a motor behind a mutex and at most one running
//! [`MotionTask`]. Starting any motion cancels and joins the previous task
//! first, so two workers never drive the same coils.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::coils::Coils;
use crate::config::units::Degrees;
use crate::error::Result;
use crate::motor::StepperMotor;

use super::cancel::StopToken;
use super::sequencer::{self, MotionPlan, Stepping};
use super::style::{Direction, StepStyle};

/// Where a motion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// On the caller's thread, returning when done or stopped.
    #[default]
    Blocking,
    /// On a worker thread, returning once the motion has started.
    Background,
}

/// A motion running on a worker thread.
#[derive(Debug)]
pub struct MotionTask {
    handle: JoinHandle<Result<u32>>,
    cancel: StopToken,
}

impl MotionTask {
    /// Ask the motion to end at its next step boundary.
    pub fn cancel(&self) {
        self.cancel.request();
    }

    /// Whether the worker has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and return the number of steps it took.
    ///
    /// A panic on the worker is resumed on the caller.
    pub fn join(self) -> Result<u32> {
        self.handle
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    }
}

/// Thread-safe owner of a motor with a single active-motion slot.
///
/// [`stop`](Self::stop) and [`release`](Self::release) take `&self` and never
/// wait on a running motion: the worker holds the motor lock only while it
/// writes one step.
pub struct MotorHandle<C, D>
where
    C: Coils + Send + 'static,
    D: DelayNs + Send + 'static,
{
    motor: Arc<Mutex<StepperMotor<C, D>>>,
    stop: StopToken,
    active: Option<MotionTask>,
}

impl<C, D> MotorHandle<C, D>
where
    C: Coils + Send + 'static,
    D: DelayNs + Send + 'static,
{
    /// Take ownership of a motor.
    pub fn new(motor: StepperMotor<C, D>) -> Self {
        let stop = motor.stop_token();
        Self {
            motor: Arc::new(Mutex::new(motor)),
            stop,
            active: None,
        }
    }

    /// Take one step after ending any running motion.
    pub fn onestep(&mut self, direction: Direction, style: StepStyle) -> Result<i64> {
        self.finish_active();
        lock(&self.motor).onestep(direction, style)
    }

    /// Take `count` steps at `rpm`.
    ///
    /// Returns the steps taken for [`Execution::Blocking`] and `None` once a
    /// background motion has started.
    ///
    /// # Errors
    ///
    /// Style and speed are checked on the caller before anything moves.
    pub fn step(
        &mut self,
        count: u32,
        direction: Direction,
        style: StepStyle,
        rpm: f32,
        execution: Execution,
    ) -> Result<Option<u32>> {
        self.start(Some(count), direction, style, rpm, execution)
    }

    /// Turn through an angle, rounded to whole steps.
    pub fn angle(
        &mut self,
        degrees: Degrees,
        direction: Direction,
        style: StepStyle,
        rpm: f32,
        execution: Execution,
    ) -> Result<Option<u32>> {
        let count = degrees.to_steps(lock(&self.motor).steps_per_revolution());
        self.start(Some(count), direction, style, rpm, execution)
    }

    /// Step until [`stop`](Self::stop) is called.
    ///
    /// With [`Execution::Blocking`] the stop must come from another thread
    /// through [`stop_token`](Self::stop_token).
    pub fn continuous(
        &mut self,
        direction: Direction,
        style: StepStyle,
        rpm: f32,
        execution: Execution,
    ) -> Result<Option<u32>> {
        self.start(None, direction, style, rpm, execution)
    }

    /// Ask the running motion to end at its next step boundary.
    pub fn stop(&self) {
        self.stop.request();
    }

    /// Switch every coil off.
    ///
    /// A motion still running energizes the coils again on its next step.
    pub fn release(&self) -> Result<()> {
        lock(&self.motor).release()
    }

    /// Current position in microsteps.
    pub fn position(&self) -> i64 {
        lock(&self.motor).position()
    }

    /// A handle that stops motions from another thread.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Whether a background motion is still running.
    pub fn is_running(&self) -> bool {
        self.active.as_ref().map_or(false, |task| !task.is_finished())
    }

    /// Wait for the background motion, if any, and return its step count.
    pub fn wait(&mut self) -> Result<u32> {
        match self.active.take() {
            Some(task) => task.join(),
            None => Ok(0),
        }
    }

    fn start(
        &mut self,
        count: Option<u32>,
        direction: Direction,
        style: StepStyle,
        rpm: f32,
        execution: Execution,
    ) -> Result<Option<u32>> {
        self.finish_active();

        let plan = lock(&self.motor).plan(count, direction, style, rpm)?;
        let mut worker = SharedStepper {
            motor: Arc::clone(&self.motor),
        };

        match execution {
            Execution::Blocking => sequencer::run(&mut worker, plan, &self.stop).map(Some),
            Execution::Background => {
                self.active = Some(spawn(worker, plan, self.stop.clone()));
                Ok(None)
            }
        }
    }

    /// Cancel and join the running task, leaving the stop flag clear.
    fn finish_active(&mut self) {
        if let Some(task) = self.active.take() {
            task.cancel();
            // The old motion's outcome has no caller left
            let _ = task.handle.join();
            self.stop.clear();
        }
    }
}

impl<C, D> Drop for MotorHandle<C, D>
where
    C: Coils + Send + 'static,
    D: DelayNs + Send + 'static,
{
    fn drop(&mut self) {
        self.finish_active();
    }
}

fn spawn<C, D>(mut worker: SharedStepper<C, D>, plan: MotionPlan, stop: StopToken) -> MotionTask
where
    C: Coils + Send + 'static,
    D: DelayNs + Send + 'static,
{
    let cancel = stop.clone();
    let handle = thread::spawn(move || {
        let result = sequencer::run(&mut worker, plan, &stop);

        #[cfg(feature = "defmt")]
        if let Err(e) = &result {
            defmt::warn!("background motion failed: {}", e);
        }

        result
    });

    MotionTask { handle, cancel }
}

/// Steps a shared motor, locking it for each step only.
struct SharedStepper<C, D>
where
    C: Coils,
    D: DelayNs,
{
    motor: Arc<Mutex<StepperMotor<C, D>>>,
}

impl<C, D> Stepping for SharedStepper<C, D>
where
    C: Coils,
    D: DelayNs,
{
    fn onestep(&mut self, direction: Direction, style: StepStyle) -> Result<i64> {
        lock(&self.motor).onestep(direction, style)
    }

    fn pause_ns(&mut self, ns: u64) {
        thread::sleep(Duration::from_nanos(ns));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
