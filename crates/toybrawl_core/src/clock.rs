//! # Clock
//!
//! Source of "now" in milliseconds. Tween requests capture their start time
//! from the clock at creation, so hosts that drive frames from their own
//! timeline (tests, fixed-step loops) hand in a `ManualClock` they advance.

use std::cell::Cell;
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// A monotonic millisecond time source.
pub trait Clock: Clone {
    /// Current time in milliseconds.
    fn now_ms(&self) -> f64;
}

/// Wall clock measured from the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose zero is "now".
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Host-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Creates a clock reading `start_ms`.
    #[must_use]
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    /// Sets the current time.
    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    /// Moves the current time forward and returns the new value.
    pub fn advance(&self, delta_ms: f64) -> f64 {
        let next = self.now.get() + delta_ms;
        self.now.set(next);
        next
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
