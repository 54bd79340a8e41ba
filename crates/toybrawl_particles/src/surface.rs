//! Render surface seam.
//!
//! The pool never talks to a graphics API directly. It owns one
//! `RenderSurface` and asks it for vertex buffers, uploads packed vertices
//! into them and submits one draw per category. A GPU backend implements the
//! trait over its own device; `HeadlessSurface` records everything in memory
//! for tests, benchmarks and the soak binary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::vertex::ParticleVertex;
use crate::viewport::Projection;

/// Blend factor for the blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    /// 1
    One,
    /// Source alpha.
    SrcAlpha,
    /// 1 - source alpha.
    OneMinusSrcAlpha,
}

/// Source and destination factors, combined with `Add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    /// Factor applied to the incoming fragment.
    pub src: BlendFactor,
    /// Factor applied to what is already in the target.
    pub dst: BlendFactor,
}

/// How a category's particles combine with what is behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// ONE + ONE. Glows: fire, sparks, magic. Order independent.
    #[default]
    Additive,
    /// `SRC_ALPHA` + `ONE_MINUS_SRC_ALPHA`. Occludes: blood, debris, smoke.
    Normal,
}

impl BlendMode {
    /// Blend factors for this mode.
    #[must_use]
    pub const fn blend_state(self) -> BlendState {
        match self {
            Self::Additive => BlendState {
                src: BlendFactor::One,
                dst: BlendFactor::One,
            },
            Self::Normal => BlendState {
                src: BlendFactor::SrcAlpha,
                dst: BlendFactor::OneMinusSrcAlpha,
            },
        }
    }

    /// Whether overlapping particles look different depending on draw order.
    ///
    /// The pool does not sort; a backend may.
    #[must_use]
    pub const fn requires_sorting(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Opaque id of a surface-owned vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// One category's draw submission.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    /// Vertex buffer holding every slot of the category.
    pub buffer: BufferId,
    /// Vertices to draw: the category's full capacity.
    pub vertex_count: u32,
    /// Blend mode.
    pub blend: BlendMode,
    /// Optional sprite texture path.
    pub texture: Option<&'a str>,
    /// Camera projection for this frame.
    pub projection: &'a Projection,
}

/// A place particles are drawn into.
pub trait RenderSurface {
    /// Allocates a vertex buffer for `vertex_capacity` vertices.
    fn create_buffer(&mut self, label: &str, vertex_capacity: usize) -> BufferId;

    /// Replaces a buffer's contents with `bytes` (packed `ParticleVertex`).
    fn upload(&mut self, buffer: BufferId, bytes: &[u8]);

    /// Submits a draw.
    fn draw(&mut self, call: &DrawCall<'_>);

    /// Frees a buffer. Unknown ids are ignored.
    fn release_buffer(&mut self, buffer: BufferId);

    /// Detaches from the host. No calls follow.
    fn detach(&mut self);
}

/// A draw as seen by `HeadlessSurface`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    /// Buffer drawn.
    pub buffer: BufferId,
    /// Vertex count.
    pub vertex_count: u32,
    /// Blend mode.
    pub blend: BlendMode,
    /// Texture path, if any.
    pub texture: Option<String>,
    /// Projection matrix, column-major.
    pub projection: [[f32; 4]; 4],
}

#[derive(Debug, Clone, Default)]
struct HeadlessBuffer {
    label: String,
    capacity: usize,
    bytes: Vec<u8>,
}

/// In-memory surface that records buffers and draws.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    buffers: HashMap<BufferId, HeadlessBuffer>,
    next_id: u32,
    draws: Vec<RecordedDraw>,
    uploads: u64,
    bytes_uploaded: u64,
    released: u64,
    detached: bool,
}

impl HeadlessSurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers currently allocated.
    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Number of buffers released so far.
    #[must_use]
    pub fn released_buffers(&self) -> u64 {
        self.released
    }

    /// Capacity a buffer was created with.
    #[must_use]
    pub fn buffer_capacity(&self, buffer: BufferId) -> Option<usize> {
        self.buffers.get(&buffer).map(|b| b.capacity)
    }

    /// Label a buffer was created with.
    #[must_use]
    pub fn buffer_label(&self, buffer: BufferId) -> Option<&str> {
        self.buffers.get(&buffer).map(|b| b.label.as_str())
    }

    /// Decodes the last upload into `buffer`.
    #[must_use]
    pub fn vertices(&self, buffer: BufferId) -> Vec<ParticleVertex> {
        self.buffers
            .get(&buffer)
            .map(|b| {
                b.bytes
                    .chunks_exact(ParticleVertex::SIZE)
                    .map(bytemuck::pod_read_unaligned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Draws recorded since the last call.
    pub fn take_draws(&mut self) -> Vec<RecordedDraw> {
        std::mem::take(&mut self.draws)
    }

    /// Number of uploads received.
    #[must_use]
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Total bytes uploaded.
    #[must_use]
    pub fn bytes_uploaded(&self) -> u64 {
        self.bytes_uploaded
    }

    /// Whether `detach` was called.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

impl RenderSurface for HeadlessSurface {
    fn create_buffer(&mut self, label: &str, vertex_capacity: usize) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(
            id,
            HeadlessBuffer {
                label: label.to_owned(),
                capacity: vertex_capacity,
                bytes: Vec::with_capacity(vertex_capacity * ParticleVertex::SIZE),
            },
        );
        id
    }

    fn upload(&mut self, buffer: BufferId, bytes: &[u8]) {
        if let Some(target) = self.buffers.get_mut(&buffer) {
            target.bytes.clear();
            target.bytes.extend_from_slice(bytes);
            self.uploads += 1;
            self.bytes_uploaded += bytes.len() as u64;
        }
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        self.draws.push(RecordedDraw {
            buffer: call.buffer,
            vertex_count: call.vertex_count,
            blend: call.blend,
            texture: call.texture.map(str::to_owned),
            projection: call.projection.matrix(),
        });
    }

    fn release_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_some() {
            self.released += 1;
        }
    }

    fn detach(&mut self) {
        self.detached = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_modes() {
        assert!(!BlendMode::Additive.requires_sorting());
        assert!(BlendMode::Normal.requires_sorting());
        assert_eq!(BlendMode::Additive.blend_state().dst, BlendFactor::One);
        assert_eq!(
            BlendMode::Normal.blend_state().dst,
            BlendFactor::OneMinusSrcAlpha
        );
        assert_eq!(BlendMode::default(), BlendMode::Additive);
    }

    #[test]
    fn test_headless_buffer_lifecycle() {
        let mut surface = HeadlessSurface::new();
        let a = surface.create_buffer("a", 4);
        let b = surface.create_buffer("b", 8);
        assert_ne!(a, b);
        assert_eq!(surface.live_buffers(), 2);
        assert_eq!(surface.buffer_capacity(b), Some(8));
        assert_eq!(surface.buffer_label(a), Some("a"));

        let vertex = ParticleVertex {
            position: [1.0, 2.0, 3.0],
            size: 4.0,
            color: [0.5, 0.5, 0.5],
            alpha: 1.0,
        };
        surface.upload(a, bytemuck::bytes_of(&vertex));
        assert_eq!(surface.vertices(a), vec![vertex]);

        surface.release_buffer(a);
        surface.release_buffer(a);
        assert_eq!(surface.live_buffers(), 1);
        assert_eq!(surface.released_buffers(), 1);
        assert!(surface.vertices(a).is_empty());
    }
}
