//! # Toybrawl Core
//!
//! Leaf types shared by the tween scheduler and the particle pool:
//! - `Clock` - where "now" comes from (wall clock or host-driven)
//! - `Vec3` / `Rgb` - plain data passed into the pool, never references into it
//! - `LoopState` - the self-terminating frame loop contract
//! - `FxError` - configuration and strict-parse failures
//!
//! ## Architecture Rules
//!
//! 1. **No blocking in a frame** - every per-frame call returns synchronously
//! 2. **Plain data in, callbacks out** - callers never hold references into internal buffers
//! 3. **Misuse is not an error** - bad durations, unknown names and stale handles degrade quietly

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod error;
pub mod frame;
pub mod math;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{FxError, FxResult};
pub use frame::{clamp_delta, LoopState, MAX_FRAME_DELTA_MS, TARGET_FRAME_MS};
pub use math::{Rgb, Vec3};
