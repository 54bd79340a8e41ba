//! GPU vertex layout for one particle slot.

use bytemuck::{Pod, Zeroable};

/// One slot, packed for upload. Dead slots have `alpha == 0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ParticleVertex {
    /// Position (xyz).
    pub position: [f32; 3],
    /// Point size.
    pub size: f32,
    /// Color (rgb).
    pub color: [f32; 3],
    /// Opacity.
    pub alpha: f32,
}

impl ParticleVertex {
    /// Size of a vertex in bytes
    pub const SIZE: usize = std::mem::size_of::<Self>();
}
