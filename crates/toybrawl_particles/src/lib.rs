//! # Toybrawl Particles
//!
//! Fixed-capacity particle pool for combat and reward effects.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     PARTICLE PIPELINE                      │
//! ├───────────────────────────────────────────────────────────┤
//! │  Preset / Burst → Category slots (SoA) → Vertex pack → Draw│
//! │        ↓                  ↓                  ↓          ↓  │
//! │   lazy create       first-fit alloc     dirty-only   1/cat │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. Category buffers are sized at creation and never grow
//! 2. Overflowing bursts are truncated, never queued
//! 3. Capacity adapts to the device once, at construction

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod category;
pub mod config;
pub mod device;
pub mod pool;
pub mod presets;
pub mod surface;
pub mod vertex;
pub mod viewport;

pub use category::{CategoryConfig, ParticleBurst};
pub use config::PoolConfig;
pub use device::DeviceProfile;
pub use pool::{ParticlePool, PoolStats, PoolTick};
pub use presets::{Preset, PresetBundle, PresetTable};
pub use surface::{
    BlendFactor, BlendMode, BlendState, BufferId, DrawCall, HeadlessSurface, RecordedDraw,
    RenderSurface,
};
pub use vertex::ParticleVertex;
pub use viewport::{Projection, Viewport};
