//! Cooperative stop flag shared between a running motion and its callers.

use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "alloc")]
use alloc::sync::Arc;

/// Lock-free stop request flag.
///
/// Clones observe the same flag. A motion loop polls it once per step, so a
/// request takes effect at the next step boundary.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

/// Lock-free stop request flag.
///
/// Without an allocator the flag lives in a `static` owned by the firmware.
#[cfg(not(feature = "alloc"))]
#[derive(Debug, Clone, Copy)]
pub struct StopToken(&'static AtomicBool);

impl StopToken {
    /// Create a fresh, unset token.
    #[cfg(feature = "alloc")]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a statically allocated flag.
    #[cfg(not(feature = "alloc"))]
    pub const fn from_static(flag: &'static AtomicBool) -> Self {
        Self(flag)
    }

    /// Ask the running motion to stop.
    #[inline]
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested and not yet cleared.
    #[inline]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Reset the flag once a motion has ended.
    #[inline]
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Whether both tokens observe the same flag.
    #[cfg(feature = "alloc")]
    pub fn same_flag(&self, other: &StopToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whether both tokens observe the same flag.
    #[cfg(not(feature = "alloc"))]
    pub fn same_flag(&self, other: &StopToken) -> bool {
        core::ptr::eq(self.0, other.0)
    }
}
