//! # Frame Loop
//!
//! ```text
//! Host frame (timestamp):
//! ┌───────────────────────────────────────────────────────────────┐
//! │ 1. BEGIN FRAME                                                │
//! │    └─ Clamp delta since the previous frame                    │
//! │                                                               │
//! │ 2. TWEEN TICK                                                 │
//! │    ├─ Write eased values, snap finished tweens                │
//! │    └─ Fire callbacks, merge spawner requests                  │
//! │                                                               │
//! │ 3. PARTICLE TICK (only if the pool has work)                  │
//! │    ├─ Integrate and expire slots                              │
//! │    └─ Upload dirty categories, one draw per category          │
//! │                                                               │
//! │ 4. END FRAME                                                  │
//! │    └─ Record stats, report Running / Idle to the host         │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use toybrawl_core::{clamp_delta, MAX_FRAME_DELTA_MS};

use crate::config::FrameBudget;

/// Per-frame statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Clamped delta since the previous frame, in milliseconds.
    pub delta_ms: f64,
    /// Time spent inside the frame, in milliseconds.
    pub work_ms: f64,
    /// Tweens in flight after the tick.
    pub tweens_active: usize,
    /// Springs in flight after the tick.
    pub springs_active: usize,
    /// Particles advanced.
    pub particles_simulated: usize,
    /// Particles expired.
    pub particles_expired: usize,
    /// Draws issued.
    pub draws: usize,
}

/// What a frame starts with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Frame number.
    pub frame: u64,
    /// Clamped delta in milliseconds.
    pub delta_ms: f64,
}

/// Turns host timestamps into clamped frame deltas and collects statistics.
#[derive(Clone, Debug)]
pub struct FrameDriver {
    budget: FrameBudget,
    frame_clamp_ms: f64,
    last_frame_ms: Option<f64>,
    frame_count: u64,
    stats: FrameStatsAccumulator,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(FrameBudget::default(), MAX_FRAME_DELTA_MS)
    }
}

impl FrameDriver {
    /// Creates a driver.
    #[must_use]
    pub fn new(budget: FrameBudget, frame_clamp_ms: f64) -> Self {
        Self {
            budget,
            frame_clamp_ms,
            last_frame_ms: None,
            frame_count: 0,
            stats: FrameStatsAccumulator::new(budget.target_frame_ms()),
        }
    }

    /// Starts a frame at host time `now_ms`.
    ///
    /// The first frame after construction or `suspend` advances by one
    /// nominal frame rather than by the time spent idle.
    pub fn begin(&mut self, now_ms: f64) -> FrameContext {
        let raw = match self.last_frame_ms {
            Some(last) => now_ms - last,
            None => self.budget.target_frame_ms(),
        };
        self.last_frame_ms = Some(now_ms);
        FrameContext {
            frame: self.frame_count,
            delta_ms: clamp_delta(raw, self.frame_clamp_ms),
        }
    }

    /// Ends the current frame.
    pub fn end(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats.record(stats);

        if self.budget.warn_over_budget && stats.work_ms > self.budget.target_frame_ms() {
            tracing::warn!(
                "frame {} exceeded budget: {:.2}ms (target: {:.2}ms)",
                stats.frame,
                stats.work_ms,
                self.budget.target_frame_ms()
            );
        }
    }

    /// Forgets the previous timestamp. Called when the host stops frames.
    pub fn suspend(&mut self) {
        self.last_frame_ms = None;
    }

    /// Frames completed.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Frame budget in milliseconds.
    pub budget_ms: f64,
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of frame deltas.
    pub delta_ms_sum: f64,
    /// Sum of work times.
    pub work_ms_sum: f64,
    /// Min work time.
    pub min_work_ms: f64,
    /// Max work time.
    pub max_work_ms: f64,
    /// Frames whose work exceeded the budget.
    pub frames_over_budget: u64,
    /// Sum of tweens in flight per frame.
    pub tween_sum: u64,
    /// Sum of particles simulated per frame.
    pub particle_sum: u64,
    /// Most particles simulated in one frame.
    pub peak_particles: usize,
    /// Sum of draws per frame.
    pub draw_sum: u64,
}

impl FrameStatsAccumulator {
    /// Creates a new accumulator.
    #[must_use]
    pub fn new(budget_ms: f64) -> Self {
        Self {
            budget_ms,
            frames_recorded: 0,
            delta_ms_sum: 0.0,
            work_ms_sum: 0.0,
            min_work_ms: f64::MAX,
            max_work_ms: 0.0,
            frames_over_budget: 0,
            tween_sum: 0,
            particle_sum: 0,
            peak_particles: 0,
            draw_sum: 0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.delta_ms_sum += stats.delta_ms;
        self.work_ms_sum += stats.work_ms;
        self.min_work_ms = self.min_work_ms.min(stats.work_ms);
        self.max_work_ms = self.max_work_ms.max(stats.work_ms);
        self.tween_sum += (stats.tweens_active + stats.springs_active) as u64;
        self.particle_sum += stats.particles_simulated as u64;
        self.peak_particles = self.peak_particles.max(stats.particles_simulated);
        self.draw_sum += stats.draws as u64;

        if stats.work_ms > self.budget_ms {
            self.frames_over_budget += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn per_frame(&self, sum: f64) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        sum / self.frames_recorded as f64
    }

    /// Average work time in milliseconds.
    #[must_use]
    pub fn avg_work_ms(&self) -> f64 {
        self.per_frame(self.work_ms_sum)
    }

    /// Average delta between frames in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        self.per_frame(self.delta_ms_sum)
    }

    /// Average FPS from frame deltas.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Average tweens plus springs in flight per frame.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_tweens(&self) -> f64 {
        self.per_frame(self.tween_sum as f64)
    }

    /// Average particles simulated per frame.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_particles(&self) -> f64 {
        self.per_frame(self.particle_sum as f64)
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new(FrameBudget::default().target_frame_ms())
    }
}

impl fmt::Display for FrameStatsAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = if self.frames_recorded == 0 { 0.0 } else { self.min_work_ms };
        writeln!(f, "┌─ TIMING ─────────────────────────────────────────┐")?;
        writeln!(f, "│ Frames Recorded:    {}", self.frames_recorded)?;
        writeln!(f, "│ Average Frame:      {:.3} ms ({:.1} FPS)", self.avg_frame_ms(), self.avg_fps())?;
        writeln!(f, "│ Average Work:       {:.3} ms", self.avg_work_ms())?;
        writeln!(f, "│ Min / Max Work:     {:.3} / {:.3} ms", min, self.max_work_ms)?;
        writeln!(f, "└──────────────────────────────────────────────────┘")?;
        writeln!(f, "┌─ BUDGET ─────────────────────────────────────────┐")?;
        writeln!(f, "│ Target:             {:.3} ms", self.budget_ms)?;
        writeln!(
            f,
            "│ Over Budget:        {} frames ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        )?;
        writeln!(f, "└──────────────────────────────────────────────────┘")?;
        writeln!(f, "┌─ WORK ───────────────────────────────────────────┐")?;
        writeln!(f, "│ Tweens / frame:     {:.1}", self.avg_tweens())?;
        writeln!(f, "│ Particles / frame:  {:.1} (peak {})", self.avg_particles(), self.peak_particles)?;
        writeln!(f, "│ Draws:              {}", self.draw_sum)?;
        write!(f, "└──────────────────────────────────────────────────┘")
    }
}
