//! # Particle Pool
//!
//! ```text
//! emit(name, burst) ──> first-fit free slots ──> update(dt) ──> render()
//!        │                                           │              │
//!   auto-create                                  expire slots   upload dirty
//!   category                                     (alpha = 0)    categories,
//!                                                               one draw each
//! ```
//!
//! The pool keeps its own simulated clock, advanced only by `update`.
//! Particle ages are measured against it, so a host that stops calling
//! `update` freezes every effect instead of expiring them in the background.
//! Hosts that run on a wall clock feed `update` the unclamped frame delta and
//! call `sync_clock` before emitting after an idle stretch, which keeps the
//! simulated clock equal to host time.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use toybrawl_core::{Rgb, Vec3};

use crate::category::{Category, CategoryConfig, ParticleBurst};
use crate::config::PoolConfig;
use crate::device::DeviceProfile;
use crate::presets::{Preset, PresetTable};
use crate::surface::{DrawCall, RenderSurface};
use crate::viewport::Viewport;

/// Statistics snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Categories created.
    pub categories: usize,
    /// Slots across all categories.
    pub total_capacity: usize,
    /// Live slots across all categories.
    pub active: usize,
    /// Particles activated since creation.
    pub emitted: u64,
    /// Particles requested but not activated for lack of free slots.
    pub dropped: u64,
    /// Particles that reached the end of their life.
    pub expired: u64,
    /// Draws issued by the last `render`.
    pub draws_last_frame: usize,
    /// Per-category capacity ceiling for this device.
    pub capacity_ceiling: usize,
}

/// Per-frame work done by `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolTick {
    /// Live slots advanced.
    pub simulated: usize,
    /// Slots released.
    pub expired: usize,
}

/// A set of named particle categories drawing into one surface.
pub struct ParticlePool<S: RenderSurface> {
    surface: S,
    /// In creation order, which is also draw order.
    categories: Vec<Category>,
    device: DeviceProfile,
    ceiling: usize,
    presets: PresetTable,
    viewport: Viewport,
    rng: ChaCha8Rng,
    now_ms: f64,
    stats: PoolStats,
    disposed: bool,
}

impl<S: RenderSurface> ParticlePool<S> {
    /// Creates an empty pool. The device ceiling is fixed here.
    #[must_use]
    pub fn new(surface: S, config: &PoolConfig, device: DeviceProfile) -> Self {
        let ceiling = device.capacity_ceiling(config).max(1);
        if device.is_constrained() {
            tracing::info!("constrained device: limiting categories to {ceiling} particles");
        }
        Self {
            surface,
            categories: Vec::new(),
            device,
            ceiling,
            presets: PresetTable::default(),
            viewport: Viewport::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            now_ms: 0.0,
            stats: PoolStats {
                capacity_ceiling: ceiling,
                ..PoolStats::default()
            },
            disposed: false,
        }
    }

    /// Replaces the preset bundles.
    #[must_use]
    pub fn with_presets(mut self, presets: PresetTable) -> Self {
        self.presets = presets;
        self
    }

    /// Sets the initial viewport size.
    #[must_use]
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport.resize(width, height);
        self
    }

    fn guard(&self, operation: &str) -> bool {
        if self.disposed {
            tracing::warn!("{operation} on a disposed particle pool ignored");
        }
        !self.disposed
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name() == name)
    }

    // ========== Categories ==========

    /// Creates `name`, replacing any existing category of that name.
    ///
    /// The replaced category's buffer is released and its particles vanish.
    /// Returns the capacity granted after the device ceiling. A capacity of
    /// zero is rejected: nothing is created or replaced and 0 is returned.
    pub fn create_category(&mut self, name: &str, mut config: CategoryConfig) -> usize {
        if !self.guard("create_category") {
            return 0;
        }
        let requested = config.capacity;
        if requested == 0 {
            tracing::warn!("category {name}: capacity 0 rejected");
            return 0;
        }
        config.capacity = requested.min(self.ceiling);
        if config.capacity != requested {
            tracing::debug!("category {name}: capacity {requested} clamped to {}", config.capacity);
        }

        let buffer = self.surface.create_buffer(name, config.capacity);
        let granted = config.capacity;
        let category = Category::new(name, config, buffer);

        if let Some(index) = self.find(name) {
            let old = std::mem::replace(&mut self.categories[index], category);
            self.surface.release_buffer(old.buffer());
            self.stats.total_capacity -= old.capacity();
            self.stats.active -= old.active();
            tracing::debug!("category {name} replaced");
        } else {
            self.categories.push(category);
            self.stats.categories += 1;
            tracing::debug!("category {name} created with {granted} slots");
        }
        self.stats.total_capacity += granted;
        granted
    }

    /// Whether `name` exists.
    #[must_use]
    pub fn has_category(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Live slots in `name`.
    #[must_use]
    pub fn active_in(&self, name: &str) -> Option<usize> {
        self.find(name).map(|i| self.categories[i].active())
    }

    /// Slots in `name`.
    #[must_use]
    pub fn capacity_of(&self, name: &str) -> Option<usize> {
        self.find(name).map(|i| self.categories[i].capacity())
    }

    /// Settings `name` was created with, capacity as granted.
    #[must_use]
    pub fn category_config(&self, name: &str) -> Option<&CategoryConfig> {
        self.find(name).map(|i| self.categories[i].config())
    }

    /// Category names in draw order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(Category::name)
    }

    // ========== Emission ==========

    /// Activates up to `burst.count` particles in `name`. Returns how many.
    ///
    /// An unknown category is created with default settings. Requests beyond
    /// the free slots are dropped. Bursts whose life is not positive emit
    /// nothing.
    pub fn emit(&mut self, name: &str, burst: &ParticleBurst) -> usize {
        if !self.guard("emit") {
            return 0;
        }
        if !burst.life_ms.is_finite() || burst.life_ms <= 0.0 {
            tracing::debug!("burst into {name} with life {} dropped", burst.life_ms);
            return 0;
        }

        let index = if let Some(index) = self.find(name) {
            index
        } else {
            tracing::debug!("emit into unknown category {name}, creating it");
            self.create_category(name, CategoryConfig::default());
            self.categories.len() - 1
        };

        let emitted = self.categories[index].emit(burst, self.now_ms, &mut self.rng);
        let requested = burst.count as usize;
        if emitted < requested {
            tracing::trace!("{name}: {} of {requested} particles dropped", requested - emitted);
        }
        self.stats.active += emitted;
        self.stats.emitted += emitted as u64;
        self.stats.dropped += (requested - emitted) as u64;
        emitted
    }

    fn emit_preset(&mut self, preset: Preset, position: Vec3, color: Option<Rgb>) -> usize {
        if !self.guard("preset") {
            return 0;
        }
        let bundle = *self.presets.get(preset);
        let name = preset.category();
        if !self.has_category(name) && self.create_category(name, bundle.category_config()) == 0 {
            return 0;
        }
        self.emit(name, &bundle.burst(position, color))
    }

    /// Orange burst; `color` overrides the default.
    pub fn create_explosion(&mut self, position: Vec3, color: Option<Rgb>) -> usize {
        self.emit_preset(Preset::Explosion, position, color)
    }

    /// Yellow glints; `color` overrides the default.
    pub fn create_sparkle(&mut self, position: Vec3, color: Option<Rgb>) -> usize {
        self.emit_preset(Preset::Sparkle, position, color)
    }

    /// Green motes. Always green.
    pub fn create_heal(&mut self, position: Vec3) -> usize {
        self.emit_preset(Preset::Heal, position, None)
    }

    /// Red spatter; `color` overrides the default.
    pub fn create_hit(&mut self, position: Vec3, color: Option<Rgb>) -> usize {
        self.emit_preset(Preset::Hit, position, color)
    }

    // ========== Frame ==========

    /// Advances every live particle by `dt_ms`.
    ///
    /// Negative or non-finite deltas advance by zero.
    pub fn update(&mut self, dt_ms: f64) -> PoolTick {
        let mut tick = PoolTick::default();
        if !self.guard("update") {
            return tick;
        }
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        self.now_ms += dt_ms;

        for category in &mut self.categories {
            let result = category.update(self.now_ms, dt_ms);
            tick.simulated += result.simulated;
            tick.expired += result.expired;
        }

        self.stats.active -= tick.expired;
        self.stats.expired += tick.expired as u64;
        tick
    }

    /// Uploads changed categories and issues one draw per category.
    /// Returns the number of draws.
    pub fn render(&mut self) -> usize {
        if !self.guard("render") {
            return 0;
        }
        let projection = *self.viewport.projection();
        for category in &mut self.categories {
            if category.is_dirty() {
                let buffer = category.buffer();
                let vertices = category.pack();
                self.surface.upload(buffer, bytemuck::cast_slice(vertices));
            }
            #[allow(clippy::cast_possible_truncation)]
            let vertex_count = category.capacity() as u32;
            self.surface.draw(&DrawCall {
                buffer: category.buffer(),
                vertex_count,
                blend: category.config().blend,
                texture: category.config().texture.as_deref(),
                projection: &projection,
            });
        }
        self.stats.draws_last_frame = self.categories.len();
        self.categories.len()
    }

    /// Moves the simulated clock to `now_ms` while no particle is alive.
    ///
    /// Returns whether the clock moved. Ignored while particles are alive,
    /// since their ages are measured against the current clock.
    pub fn sync_clock(&mut self, now_ms: f64) -> bool {
        if self.disposed || self.stats.active > 0 || !now_ms.is_finite() {
            return false;
        }
        self.now_ms = now_ms;
        true
    }

    /// Whether `update`/`render` have anything to do.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        !self.disposed
            && self
                .categories
                .iter()
                .any(|c| c.active() > 0 || c.is_dirty())
    }

    /// Resizes the viewport; the next draw uses the new projection.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.guard("resize") && self.viewport.resize(width, height) {
            tracing::debug!("particle viewport resized to {width}x{height}");
        }
    }

    /// Releases every buffer and detaches the surface. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for category in self.categories.drain(..) {
            self.surface.release_buffer(category.buffer());
        }
        self.surface.detach();
        self.disposed = true;
        self.stats.active = 0;
        self.stats.categories = 0;
        self.stats.total_capacity = 0;
        self.stats.draws_last_frame = 0;
        tracing::debug!("particle pool disposed");
    }

    // ========== Queries ==========

    /// Statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Live particles across all categories.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.stats.active
    }

    /// Whether `dispose` was called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Simulated time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// The device profile the pool was built for.
    #[must_use]
    pub fn device(&self) -> &DeviceProfile {
        &self.device
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The render surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The render surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: RenderSurface> Drop for ParticlePool<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{BlendMode, HeadlessSurface};

    fn pool() -> ParticlePool<HeadlessSurface> {
        ParticlePool::new(HeadlessSurface::new(), &PoolConfig::default(), DeviceProfile::DESKTOP)
    }

    #[test]
    fn test_hit_capacity_scenario() {
        let mut pool = pool();
        pool.create_category("hit", CategoryConfig::with_capacity(5));
        let emitted = pool.emit(
            "hit",
            &ParticleBurst {
                count: 8,
                life_ms: 300.0,
                ..ParticleBurst::default()
            },
        );
        assert_eq!(emitted, 5);
        assert_eq!(pool.active_in("hit"), Some(5));
        assert_eq!(pool.stats().dropped, 3);
    }

    #[test]
    fn test_expiry_at_life() {
        let mut pool = pool();
        pool.emit(
            "spark",
            &ParticleBurst {
                count: 10,
                life_ms: 100.0,
                ..ParticleBurst::default()
            },
        );
        assert_eq!(pool.active_count(), 10);
        pool.update(50.0);
        assert_eq!(pool.active_count(), 10);
        let tick = pool.update(50.0);
        assert_eq!(tick.expired, 10);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.stats().expired, 10);
    }

    #[test]
    fn test_unknown_category_auto_created() {
        let mut pool = pool();
        assert!(!pool.has_category("dust"));
        assert_eq!(pool.emit("dust", &ParticleBurst::default()), 1);
        assert_eq!(pool.capacity_of("dust"), Some(1000));
        assert_eq!(
            pool.category_config("dust").map(|c| c.blend),
            Some(BlendMode::Additive)
        );
    }

    #[test]
    fn test_non_positive_life_emits_nothing() {
        let mut pool = pool();
        for life_ms in [0.0, -5.0, f64::NAN] {
            let burst = ParticleBurst {
                life_ms,
                ..ParticleBurst::default()
            };
            assert_eq!(pool.emit("x", &burst), 0);
        }
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_replace_releases_old_buffer() {
        let mut pool = pool();
        pool.create_category("fx", CategoryConfig::with_capacity(10));
        pool.emit("fx", &ParticleBurst { count: 4, ..ParticleBurst::default() });
        pool.create_category("fx", CategoryConfig::with_capacity(20));

        assert_eq!(pool.surface().live_buffers(), 1);
        assert_eq!(pool.surface().released_buffers(), 1);
        assert_eq!(pool.capacity_of("fx"), Some(20));
        assert_eq!(pool.active_count(), 0);
        let stats = pool.stats();
        assert_eq!(stats.categories, 1);
        assert_eq!(stats.total_capacity, 20);
    }

    #[test]
    fn test_constrained_device_clamps_capacity() {
        let mut pool = ParticlePool::new(
            HeadlessSurface::new(),
            &PoolConfig::default(),
            DeviceProfile::MOBILE,
        );
        assert_eq!(pool.create_category("big", CategoryConfig::with_capacity(2000)), 500);
        assert_eq!(pool.create_category("small", CategoryConfig::with_capacity(100)), 100);
        assert_eq!(pool.stats().capacity_ceiling, 500);
    }

    #[test]
    fn test_render_one_draw_per_category() {
        let mut pool = pool().with_viewport(800, 400);
        pool.create_explosion(Vec3::ZERO, None);
        pool.create_hit(Vec3::ZERO, None);
        assert_eq!(pool.render(), 2);

        let draws = pool.surface_mut().take_draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].vertex_count, 500);
        assert_eq!(draws[0].blend, BlendMode::Additive);
        assert_eq!(draws[1].vertex_count, 100);
        assert_eq!(draws[1].blend, BlendMode::Normal);
        assert_eq!(pool.surface().uploads(), 2);

        let vertices = pool.surface().vertices(draws[1].buffer);
        assert_eq!(vertices.len(), 100);
        assert_eq!(vertices.iter().filter(|v| v.alpha > 0.0).count(), 15);
    }

    #[test]
    fn test_clean_categories_skip_upload() {
        let mut pool = pool();
        pool.create_category("idle", CategoryConfig::with_capacity(8));
        pool.render();
        let uploads = pool.surface().uploads();
        pool.render();
        assert_eq!(pool.surface().uploads(), uploads);
        assert!(!pool.needs_frame());
    }

    #[test]
    fn test_needs_frame_until_last_upload() {
        let mut pool = pool();
        pool.emit("x", &ParticleBurst { life_ms: 16.0, ..ParticleBurst::default() });
        assert!(pool.needs_frame());
        pool.update(16.0);
        assert_eq!(pool.active_count(), 0);
        // the zeroed slot still has to reach the surface
        assert!(pool.needs_frame());
        pool.render();
        assert!(!pool.needs_frame());
    }

    #[test]
    fn test_disposed_pool_is_inert() {
        let mut pool = pool();
        pool.create_sparkle(Vec3::ZERO, None);
        pool.dispose();
        assert!(pool.is_disposed());
        assert!(pool.surface().is_detached());
        assert_eq!(pool.surface().live_buffers(), 0);

        assert_eq!(pool.emit("sparkle", &ParticleBurst::default()), 0);
        assert_eq!(pool.create_category("new", CategoryConfig::default()), 0);
        assert_eq!(pool.update(16.0), PoolTick::default());
        assert_eq!(pool.render(), 0);
        assert!(!pool.needs_frame());
        pool.dispose();
    }

    #[test]
    fn test_dispose_resets_buffer_stats() {
        let mut pool = pool();
        pool.create_sparkle(Vec3::ZERO, None);
        pool.create_hit(Vec3::ZERO, None);
        pool.render();
        pool.dispose();

        let stats = pool.stats();
        assert_eq!(stats.categories, 0);
        assert_eq!(stats.total_capacity, 0);
        assert_eq!(stats.active, 0);
        assert_eq!(stats.draws_last_frame, 0);
        // lifetime counters survive
        assert_eq!(stats.emitted, 25);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut pool = pool();
        assert_eq!(pool.create_category("void", CategoryConfig::with_capacity(0)), 0);
        assert!(!pool.has_category("void"));
        assert_eq!(pool.surface().live_buffers(), 0);

        pool.create_category("fx", CategoryConfig::with_capacity(4));
        assert_eq!(pool.create_category("fx", CategoryConfig::with_capacity(0)), 0);
        assert_eq!(pool.capacity_of("fx"), Some(4));
        assert_eq!(pool.stats().total_capacity, 4);
    }

    #[test]
    fn test_zero_capacity_preset_emits_nothing() {
        let mut presets = PresetTable::default();
        presets.hit.capacity = 0;
        let mut pool = pool().with_presets(presets);
        assert_eq!(pool.create_hit(Vec3::ZERO, None), 0);
        assert!(!pool.has_category("hit"));
    }

    #[test]
    fn test_sync_clock_only_while_empty() {
        let mut pool = pool();
        assert!(pool.sync_clock(5_000.0));
        assert_eq!(pool.now_ms(), 5_000.0);

        pool.emit(
            "spark",
            &ParticleBurst {
                life_ms: 100.0,
                ..ParticleBurst::default()
            },
        );
        assert!(!pool.sync_clock(9_000.0));
        assert_eq!(pool.now_ms(), 5_000.0);
        assert!(!pool.sync_clock(f64::NAN));

        // ages run from the synced time
        pool.update(99.0);
        assert_eq!(pool.active_count(), 1);
        pool.update(1.0);
        assert_eq!(pool.active_count(), 0);
        assert!(pool.sync_clock(9_000.0));
    }

    #[test]
    fn test_presets_create_categories_lazily() {
        let mut pool = pool();
        assert_eq!(pool.create_heal(Vec3::new(1.0, 2.0, 0.0)), 20);
        assert_eq!(pool.capacity_of("heal"), Some(300));
        assert_eq!(pool.create_sparkle(Vec3::ZERO, None), 10);
        assert_eq!(pool.create_explosion(Vec3::ZERO, None), 50);
        assert_eq!(pool.create_hit(Vec3::ZERO, Some(Rgb::WHITE)), 15);
        let names: Vec<&str> = pool.category_names().collect();
        assert_eq!(names, vec!["heal", "sparkle", "explosion", "hit"]);
    }

    #[test]
    fn test_seeded_emission_is_reproducible() {
        let mut a = pool();
        let mut b = pool();
        a.create_explosion(Vec3::ZERO, None);
        b.create_explosion(Vec3::ZERO, None);
        a.render();
        b.render();
        let buffer = a.surface_mut().take_draws()[0].buffer;
        assert_eq!(a.surface().vertices(buffer), b.surface().vertices(buffer));
    }

    #[test]
    fn test_resize_changes_projection() {
        let mut pool = pool().with_viewport(100, 100);
        pool.create_category("x", CategoryConfig::with_capacity(1));
        pool.render();
        pool.resize(200, 100);
        pool.render();
        let draws = pool.surface_mut().take_draws();
        assert_ne!(draws[0].projection, draws[1].projection);
        assert_eq!(pool.viewport().projection().right, 200.0);
    }
}
