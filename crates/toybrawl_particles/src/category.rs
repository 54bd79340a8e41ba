//! Particle categories.
//!
//! A category is a named, fixed-capacity set of slots stored as parallel
//! arrays. A slot is free when its alpha is zero; emission claims free slots
//! first-fit and update releases them when their life runs out. Nothing here
//! allocates after construction.

use rand::Rng;
use serde::{Deserialize, Serialize};
use toybrawl_core::{Rgb, Vec3};

use crate::surface::{BlendMode, BufferId};
use crate::vertex::ParticleVertex;

/// Category settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Number of slots. Clamped by the device ceiling.
    pub capacity: usize,
    /// Blend mode.
    pub blend: BlendMode,
    /// Color for bursts that do not set one.
    pub base_color: Rgb,
    /// Size for bursts that do not set one.
    pub base_size: f32,
    /// Optional sprite texture path, handed to the surface untouched.
    pub texture: Option<String>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            blend: BlendMode::Additive,
            base_color: Rgb::WHITE,
            base_size: 10.0,
            texture: None,
        }
    }
}

impl CategoryConfig {
    /// Default settings with `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Sets the blend mode.
    #[must_use]
    pub fn blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }
}

/// One emission request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleBurst {
    /// Emission center.
    pub position: Vec3,
    /// Initial velocity, in units per second.
    pub velocity: Vec3,
    /// Color; the category's base color if unset.
    pub color: Option<Rgb>,
    /// Base point size; the category's base size if unset.
    pub size: Option<f32>,
    /// Lifetime in milliseconds.
    pub life_ms: f64,
    /// Particles requested.
    pub count: u32,
    /// Positional jitter across x and y. Velocity jitter is a tenth of it.
    pub spread: f32,
    /// Downward acceleration; negative values pull upward.
    pub gravity: f32,
    /// Fade alpha with remaining life.
    pub fade_out: bool,
}

impl Default for ParticleBurst {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            color: None,
            size: None,
            life_ms: 1000.0,
            count: 1,
            spread: 0.0,
            gravity: 0.0,
            fade_out: true,
        }
    }
}

impl ParticleBurst {
    /// A single default particle at `position`.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Bookkeeping for a live slot.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SlotMeta {
    spawn_ms: f64,
    max_life_ms: f64,
    gravity: f32,
    fade_out: bool,
}

/// Result of one category update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CategoryTick {
    pub(crate) simulated: usize,
    pub(crate) expired: usize,
}

/// A category's slots.
pub(crate) struct Category {
    name: String,
    config: CategoryConfig,
    buffer: BufferId,
    positions: Box<[Vec3]>,
    velocities: Box<[Vec3]>,
    colors: Box<[Rgb]>,
    sizes: Box<[f32]>,
    alphas: Box<[f32]>,
    meta: Box<[Option<SlotMeta>]>,
    active: usize,
    dirty: bool,
    /// Reused upload staging.
    scratch: Vec<ParticleVertex>,
}

impl Category {
    /// Allocates every slot up front. `config.capacity` must already be clamped.
    pub(crate) fn new(name: &str, config: CategoryConfig, buffer: BufferId) -> Self {
        let capacity = config.capacity;
        Self {
            name: name.to_owned(),
            positions: vec![Vec3::ZERO; capacity].into_boxed_slice(),
            velocities: vec![Vec3::ZERO; capacity].into_boxed_slice(),
            colors: vec![config.base_color; capacity].into_boxed_slice(),
            sizes: vec![0.0; capacity].into_boxed_slice(),
            alphas: vec![0.0; capacity].into_boxed_slice(),
            meta: vec![None; capacity].into_boxed_slice(),
            config,
            buffer,
            active: 0,
            dirty: true,
            scratch: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn config(&self) -> &CategoryConfig {
        &self.config
    }

    pub(crate) fn buffer(&self) -> BufferId {
        self.buffer
    }

    pub(crate) fn capacity(&self) -> usize {
        self.alphas.len()
    }

    pub(crate) fn active(&self) -> usize {
        self.active
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Activates up to `burst.count` free slots. Returns how many.
    pub(crate) fn emit(&mut self, burst: &ParticleBurst, now_ms: f64, rng: &mut impl Rng) -> usize {
        let color = burst.color.unwrap_or(self.config.base_color);
        let size = burst.size.unwrap_or(self.config.base_size);
        let spread = burst.spread;
        let meta = SlotMeta {
            spawn_ms: now_ms,
            max_life_ms: burst.life_ms,
            gravity: burst.gravity,
            fade_out: burst.fade_out,
        };

        let mut emitted = 0;
        for _ in 0..burst.count {
            if self.active >= self.capacity() {
                break;
            }
            let Some(index) = self.alphas.iter().position(|&alpha| alpha <= 0.0) else {
                break;
            };

            self.positions[index] = Vec3::new(
                burst.position.x + (rng.gen::<f32>() - 0.5) * spread,
                burst.position.y + (rng.gen::<f32>() - 0.5) * spread,
                burst.position.z,
            );
            self.velocities[index] = Vec3::new(
                burst.velocity.x + (rng.gen::<f32>() - 0.5) * spread * 0.1,
                burst.velocity.y + (rng.gen::<f32>() - 0.5) * spread * 0.1,
                burst.velocity.z,
            );
            self.colors[index] = color;
            self.sizes[index] = size + rng.gen::<f32>() * size * 0.5;
            self.alphas[index] = 1.0;
            self.meta[index] = Some(meta);

            self.active += 1;
            emitted += 1;
        }

        if emitted > 0 {
            self.dirty = true;
        }
        emitted
    }

    /// Advances every live slot to `now_ms`, moving it by `dt_ms`.
    pub(crate) fn update(&mut self, now_ms: f64, dt_ms: f64) -> CategoryTick {
        let mut tick = CategoryTick::default();
        if self.active == 0 {
            return tick;
        }

        #[allow(clippy::cast_possible_truncation)]
        let dt = (dt_ms * 0.001) as f32;

        for i in 0..self.meta.len() {
            let Some(meta) = self.meta[i] else {
                continue;
            };

            let life_ratio = 1.0 - (now_ms - meta.spawn_ms) / meta.max_life_ms;
            if life_ratio <= 0.0 {
                self.alphas[i] = 0.0;
                self.sizes[i] = 0.0;
                self.meta[i] = None;
                self.active -= 1;
                tick.expired += 1;
                continue;
            }

            let velocity = &mut self.velocities[i];
            let position = &mut self.positions[i];
            position.x += velocity.x * dt;
            position.y += velocity.y * dt;
            position.z += velocity.z * dt;
            if meta.gravity != 0.0 {
                velocity.y -= meta.gravity * dt;
            }

            if meta.fade_out {
                // A live slot must never read as free.
                #[allow(clippy::cast_possible_truncation)]
                let alpha = (life_ratio as f32).max(f32::MIN_POSITIVE);
                self.alphas[i] = alpha;
            }
            tick.simulated += 1;
        }

        if tick.simulated > 0 || tick.expired > 0 {
            self.dirty = true;
        }
        tick
    }

    /// Packs every slot for upload and clears the dirty flag.
    pub(crate) fn pack(&mut self) -> &[ParticleVertex] {
        self.scratch.clear();
        self.scratch.extend((0..self.alphas.len()).map(|i| ParticleVertex {
            position: self.positions[i].to_array(),
            size: self.sizes[i],
            color: self.colors[i].to_array(),
            alpha: self.alphas[i],
        }));
        self.dirty = false;
        &self.scratch
    }

    #[cfg(test)]
    pub(crate) fn alphas(&self) -> &[f32] {
        &self.alphas
    }

    #[cfg(test)]
    pub(crate) fn positions(&self) -> &[Vec3] {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn category(capacity: usize) -> Category {
        Category::new("test", CategoryConfig::with_capacity(capacity), BufferId(0))
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_emit_respects_capacity() {
        let mut cat = category(5);
        let burst = ParticleBurst {
            count: 8,
            life_ms: 300.0,
            ..ParticleBurst::default()
        };
        assert_eq!(cat.emit(&burst, 0.0, &mut rng()), 5);
        assert_eq!(cat.active(), 5);
        assert_eq!(cat.emit(&burst, 0.0, &mut rng()), 0);
        assert_eq!(cat.active(), 5);
    }

    #[test]
    fn test_first_fit_reuses_freed_slot() {
        let mut cat = category(3);
        let mut rng = rng();
        let short = ParticleBurst {
            life_ms: 10.0,
            ..ParticleBurst::default()
        };
        let long = ParticleBurst {
            life_ms: 1000.0,
            count: 2,
            ..ParticleBurst::default()
        };
        cat.emit(&short, 0.0, &mut rng);
        cat.emit(&long, 0.0, &mut rng);
        cat.update(20.0, 20.0);
        assert_eq!(cat.active(), 2);
        assert_eq!(cat.alphas()[0], 0.0);

        cat.emit(&ParticleBurst::at(Vec3::new(5.0, 5.0, 5.0)), 20.0, &mut rng);
        assert_eq!(cat.positions()[0], Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(cat.active(), 3);
    }

    #[test]
    fn test_spread_jitter_bounds() {
        let mut cat = category(200);
        let burst = ParticleBurst {
            position: Vec3::new(10.0, -10.0, 3.0),
            count: 200,
            spread: 30.0,
            ..ParticleBurst::default()
        };
        cat.emit(&burst, 0.0, &mut rng());
        for p in cat.positions() {
            assert!((p.x - 10.0).abs() <= 15.0);
            assert!((p.y + 10.0).abs() <= 15.0);
            assert_eq!(p.z, 3.0);
        }
    }

    #[test]
    fn test_integration_and_gravity() {
        let mut cat = category(1);
        let burst = ParticleBurst {
            velocity: Vec3::new(100.0, 0.0, 0.0),
            gravity: 50.0,
            life_ms: 10_000.0,
            ..ParticleBurst::default()
        };
        cat.emit(&burst, 0.0, &mut rng());
        cat.update(1000.0, 1000.0);
        assert!((cat.positions()[0].x - 100.0).abs() < 1e-4);
        assert_eq!(cat.velocities[0].y, -50.0);
    }

    #[test]
    fn test_fade_monotonic_until_expiry() {
        let mut cat = category(1);
        let burst = ParticleBurst {
            life_ms: 300.0,
            ..ParticleBurst::default()
        };
        cat.emit(&burst, 0.0, &mut rng());
        let mut last = 1.0;
        let mut now = 0.0;
        while now < 300.0 {
            now += 16.0;
            cat.update(now, 16.0);
            let alpha = cat.alphas()[0];
            if now < 300.0 {
                assert!(alpha > 0.0 && alpha <= last, "alpha {alpha} at {now}");
                last = alpha;
            } else {
                assert_eq!(alpha, 0.0);
                assert_eq!(cat.active(), 0);
            }
        }
    }

    #[test]
    fn test_without_fade_alpha_holds() {
        let mut cat = category(1);
        let burst = ParticleBurst {
            life_ms: 100.0,
            fade_out: false,
            ..ParticleBurst::default()
        };
        cat.emit(&burst, 0.0, &mut rng());
        cat.update(50.0, 50.0);
        assert_eq!(cat.alphas()[0], 1.0);
        cat.update(100.0, 50.0);
        assert_eq!(cat.alphas()[0], 0.0);
    }

    #[test]
    fn test_pack_covers_every_slot() {
        let mut cat = category(4);
        cat.emit(&ParticleBurst::default(), 0.0, &mut rng());
        assert!(cat.is_dirty());
        let packed = cat.pack();
        assert_eq!(packed.len(), 4);
        assert_eq!(packed.iter().filter(|v| v.alpha > 0.0).count(), 1);
        assert!(!cat.is_dirty());
    }

    #[test]
    fn test_base_color_and_size_fallback() {
        let config = CategoryConfig {
            capacity: 1,
            base_color: Rgb::new(0.0, 0.0, 1.0),
            base_size: 4.0,
            ..CategoryConfig::default()
        };
        let mut cat = Category::new("blue", config, BufferId(0));
        cat.emit(&ParticleBurst::default(), 0.0, &mut rng());
        let vertex = cat.pack()[0];
        assert_eq!(vertex.color, [0.0, 0.0, 1.0]);
        assert!(vertex.size >= 4.0 && vertex.size <= 6.0);
    }
}
