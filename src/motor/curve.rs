//! Quarter-sine duty curve for microstepping.

use core::f64::consts::PI;

use serde::Deserialize;

use crate::config::units::Microsteps;

/// Peak of the reference curve.
pub const CURVE_REFERENCE_PEAK: u16 = 1023;

/// Maximum number of curve entries (`Microsteps::MAX + 1`).
const CURVE_CAPACITY: usize = Microsteps::MAX as usize + 1;

/// Peak the microstep curve is built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum CurveScaling {
    /// Fixed 0..=1023 curve whatever the duty resolution.
    #[default]
    Reference,
    /// Curve spans the full duty resolution.
    Resolution,
}

/// Duty ramp over a quarter sine period.
///
/// Entry `i` is the duty of a coil `i` microsteps into its rise, so the table
/// has `microsteps + 1` entries running from 0 to the peak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveTable {
    values: heapless::Vec<u16, CURVE_CAPACITY>,
}

impl CurveTable {
    /// Build the reference curve, peaking at [`CURVE_REFERENCE_PEAK`].
    pub fn new(microsteps: Microsteps) -> Self {
        Self::with_peak(microsteps, CURVE_REFERENCE_PEAK)
    }

    /// Build a curve peaking at `peak`.
    pub fn with_peak(microsteps: Microsteps, peak: u16) -> Self {
        let n = microsteps.value();
        let step = PI / (2.0 * n as f64);

        let values = (0..=n)
            .map(|i| libm::round(peak as f64 * libm::sin(step * i as f64)) as u16)
            .collect();

        Self { values }
    }

    /// Duty `offset` microsteps into the rise.
    ///
    /// Offsets past the end read the peak.
    #[inline]
    pub fn at(&self, offset: usize) -> u16 {
        self.values
            .get(offset)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0)
    }

    /// Number of entries (`microsteps + 1`).
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a built curve.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All entries in order.
    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.values
    }
}
