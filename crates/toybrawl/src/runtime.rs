//! # Effects Runtime
//!
//! Owns one tween scheduler and one particle pool for a scene and advances
//! both from host frames. Effect code borrows the components through the
//! runtime instead of reaching for globals; callbacks that need to schedule
//! more work capture a `TweenSpawner`.
//!
//! Both components run on the runtime's clock. Tweens see the clamped frame
//! delta; particles age by the unclamped one, so a particle with life `L`
//! is gone once the clock reaches its spawn time plus `L`.

use toybrawl_core::{Clock, LoopState};
use toybrawl_particles::{ParticlePool, PoolTick, RenderSurface};
use toybrawl_tween::{TweenScheduler, TweenSpawner};

use crate::config::EffectsConfig;
use crate::frame_loop::{FrameDriver, FrameStats, FrameStatsAccumulator};

/// Scheduler, pool and frame driver for one scene.
pub struct EffectsRuntime<C: Clock, S: RenderSurface> {
    clock: C,
    tweens: TweenScheduler<C>,
    particles: ParticlePool<S>,
    driver: FrameDriver,
}

impl<C: Clock, S: RenderSurface> EffectsRuntime<C, S> {
    /// Builds the runtime from configuration.
    ///
    /// The device profile in `config` fixes particle capacity for the
    /// lifetime of the runtime.
    #[must_use]
    pub fn new(clock: C, surface: S, config: &EffectsConfig) -> Self {
        let mut particles = ParticlePool::new(surface, &config.particles, config.device)
            .with_presets(config.presets);
        particles.sync_clock(clock.now_ms());
        tracing::debug!(
            "effects runtime ready (ceiling {} particles per category)",
            particles.stats().capacity_ceiling
        );
        Self {
            tweens: TweenScheduler::with_config(clock.clone(), config.tween),
            clock,
            particles,
            driver: FrameDriver::new(config.frame, config.tween.frame_clamp_ms),
        }
    }

    /// The tween scheduler.
    #[must_use]
    pub fn tweens(&self) -> &TweenScheduler<C> {
        &self.tweens
    }

    /// The tween scheduler, mutably.
    pub fn tweens_mut(&mut self) -> &mut TweenScheduler<C> {
        &mut self.tweens
    }

    /// A spawner for callbacks.
    #[must_use]
    pub fn spawner(&self) -> TweenSpawner<C> {
        self.tweens.spawner()
    }

    /// The particle pool.
    #[must_use]
    pub fn particles(&self) -> &ParticlePool<S> {
        &self.particles
    }

    /// The particle pool, mutably.
    ///
    /// An empty pool is first moved to the current time, so particles
    /// emitted after an idle stretch are stamped on the runtime's clock.
    pub fn particles_mut(&mut self) -> &mut ParticlePool<S> {
        self.particles.sync_clock(self.clock.now_ms());
        &mut self.particles
    }

    /// The clock shared with the scheduler.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Whether the host should schedule a frame.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.tweens.is_running() || self.particles.needs_frame()
    }

    /// Runs one frame at the clock's current time.
    ///
    /// Returns `Idle` once neither component has work; the host can stop
    /// requesting frames until something new is scheduled or emitted.
    pub fn frame(&mut self) -> LoopState {
        let now_ms = self.clock.now_ms();
        let ctx = self.driver.begin(now_ms);

        let tween_state = self.tweens.tick();

        let mut tick = PoolTick::default();
        let mut draws = 0;
        if self.particles.needs_frame() {
            tick = self.particles.update(now_ms - self.particles.now_ms());
            draws = self.particles.render();
        }
        let particle_state = if self.particles.needs_frame() {
            LoopState::Running
        } else {
            LoopState::Idle
        };

        self.driver.end(FrameStats {
            frame: ctx.frame,
            delta_ms: ctx.delta_ms,
            work_ms: (self.clock.now_ms() - now_ms).max(0.0),
            tweens_active: self.tweens.active_count(),
            springs_active: self.tweens.spring_count(),
            particles_simulated: tick.simulated,
            particles_expired: tick.expired,
            draws,
        });

        let state = tween_state.or(particle_state);
        if !state.is_running() {
            self.driver.suspend();
        }
        state
    }

    /// Forwards a surface resize to the pool.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.particles.resize(width, height);
    }

    /// Drops every tween without callbacks and disposes the pool.
    pub fn shutdown(&mut self) {
        self.tweens.clear();
        self.particles.dispose();
        self.driver.suspend();
    }

    /// Frames run so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.driver.frame_count()
    }

    /// Accumulated frame statistics.
    #[must_use]
    pub fn frame_stats(&self) -> &FrameStatsAccumulator {
        self.driver.stats()
    }
}
