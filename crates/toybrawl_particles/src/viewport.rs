//! Orthographic camera for the particle overlay.
//!
//! The overlay spans 200 units vertically (`-100..100`) and `200 * aspect`
//! horizontally, so effect code places bursts in the same units on any
//! screen shape.

use bytemuck::{Pod, Zeroable};

/// Half the vertical extent of the view, in world units.
pub const HALF_HEIGHT: f32 = 100.0;
/// Near clip plane.
pub const NEAR: f32 = 0.1;
/// Far clip plane.
pub const FAR: f32 = 1000.0;
/// Camera distance from the particle plane.
pub const CAMERA_Z: f32 = 100.0;

/// Orthographic projection bounds.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Projection {
    /// Left edge.
    pub left: f32,
    /// Right edge.
    pub right: f32,
    /// Top edge.
    pub top: f32,
    /// Bottom edge.
    pub bottom: f32,
    /// Near plane.
    pub near: f32,
    /// Far plane.
    pub far: f32,
    /// Camera z position.
    pub camera_z: f32,
}

impl Projection {
    /// Projection for a viewport with the given aspect ratio.
    #[must_use]
    pub fn for_aspect(aspect: f32) -> Self {
        Self {
            left: -aspect * HALF_HEIGHT,
            right: aspect * HALF_HEIGHT,
            top: HALF_HEIGHT,
            bottom: -HALF_HEIGHT,
            near: NEAR,
            far: FAR,
            camera_z: CAMERA_Z,
        }
    }

    /// Combined view-projection matrix, column-major.
    #[must_use]
    pub fn matrix(&self) -> [[f32; 4]; 4] {
        let width = self.right - self.left;
        let height = self.top - self.bottom;
        let depth = self.far - self.near;
        let sz = -2.0 / depth;
        let tz = -(self.far + self.near) / depth;
        [
            [2.0 / width, 0.0, 0.0, 0.0],
            [0.0, 2.0 / height, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [
                -(self.right + self.left) / width,
                -(self.top + self.bottom) / height,
                // camera sits at +camera_z looking down -z
                tz - sz * self.camera_z,
                1.0,
            ],
        ]
    }
}

/// Surface size and the projection derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    projection: Projection,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl Viewport {
    /// Creates a viewport. A zero dimension is treated as square.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut viewport = Self {
            width: 1,
            height: 1,
            projection: Projection::for_aspect(1.0),
        };
        viewport.resize(width, height);
        viewport
    }

    /// Recomputes the projection. Zero dimensions are ignored.
    ///
    /// Returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            tracing::debug!("ignoring zero-sized viewport {width}x{height}");
            return false;
        }
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.projection = Projection::for_aspect(self.aspect());
        true
    }

    /// Width / height.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Current projection.
    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}
