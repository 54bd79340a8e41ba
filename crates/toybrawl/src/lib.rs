//! # TOYBRAWL Effects
//!
//! Game-feel layer for card battles: tweens and particles behind one frame
//! driver.
//!
//! ## Crate Structure
//!
//! - `toybrawl_core`: Clock, math, loop contract, errors
//! - `toybrawl_tween`: Tween scheduler, easing, springs, element transforms
//! - `toybrawl_particles`: Particle pool, presets, render surface seam
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = EffectsConfig::load("fx.toml")?;
//! let mut fx = EffectsRuntime::new(SystemClock::new(), surface, &config);
//!
//! fx.particles_mut().create_hit(Vec3::new(10.0, 0.0, 0.0), None);
//! while fx.frame().is_running() {
//!     // wait for the next display refresh
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod frame_loop;
pub mod runtime;

pub use config::{EffectsConfig, FrameBudget};
pub use frame_loop::{FrameContext, FrameDriver, FrameStats, FrameStatsAccumulator};
pub use runtime::EffectsRuntime;

// Re-export the component crates
pub use toybrawl_core as core;
pub use toybrawl_particles as particles;
pub use toybrawl_tween as tween;
