//! # Tween Scheduler
//!
//! Owns every in-flight tween and spring and advances them once per host
//! frame.
//!
//! ```text
//! schedule() ──> active set ──tick()──> write fields ──> progress >= 1?
//!      ^                                                        │ yes
//!      │                                          snap, remove, │
//!      └──── TweenSpawner (from callbacks) <── on_complete() <──┘
//! ```
//!
//! The loop is lazy: the first request starts it, and the first tick that
//! ends with nothing active reports `LoopState::Idle`. Idle ticks do no work
//! until the next request arrives.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use toybrawl_core::{clamp_delta, Clock, LoopState};

use crate::config::TweenConfig;
use crate::easing::Easing;
use crate::field::TweenTarget;
use crate::request::{ChainStep, TargetRef, TweenHandle, TweenOptions, TweenRequest};
use crate::spring::Spring;

/// Work queued by spawners, merged into the scheduler between update passes.
#[derive(Default)]
struct Inbox {
    pending: Vec<TweenRequest>,
    cancelled: Vec<TweenHandle>,
}

fn next_handle(counter: &Cell<u64>) -> TweenHandle {
    let id = counter.get();
    counter.set(id + 1);
    TweenHandle(id)
}

/// Cloneable scheduling handle for code that cannot borrow the scheduler,
/// typically completion callbacks.
///
/// Requests keep the start time and start values captured at the call;
/// they join the active set at the end of the current tick, or at the next
/// tick when queued outside one. A queued request counts as running work.
/// Cancellations are applied before the next update pass.
pub struct TweenSpawner<C: Clock> {
    clock: C,
    default_easing: Easing,
    next_handle: Rc<Cell<u64>>,
    inbox: Rc<RefCell<Inbox>>,
}

impl<C: Clock> Clone for TweenSpawner<C> {
    fn clone(&self) -> Self {
        Self {
            clock: self.clock.clone(),
            default_easing: self.default_easing,
            next_handle: Rc::clone(&self.next_handle),
            inbox: Rc::clone(&self.inbox),
        }
    }
}

impl<C: Clock> TweenSpawner<C> {
    /// Queues a tween. See `TweenScheduler::schedule`.
    pub fn schedule<T: TweenTarget + 'static>(
        &self,
        target: &Rc<RefCell<T>>,
        options: TweenOptions,
    ) -> TweenHandle {
        let target: TargetRef = target.clone();
        let handle = next_handle(&self.next_handle);
        let request = TweenRequest::build(
            handle,
            target,
            options,
            self.default_easing,
            self.clock.now_ms(),
            VecDeque::new(),
        );
        self.inbox.borrow_mut().pending.push(request);
        handle
    }

    /// Queues a cancellation. Unknown or finished handles are ignored.
    pub fn cancel(&self, handle: TweenHandle) {
        self.inbox.borrow_mut().cancelled.push(handle);
    }
}

/// The tween scheduler.
pub struct TweenScheduler<C: Clock> {
    clock: C,
    config: TweenConfig,
    /// In registration order; updated back to front.
    active: Vec<TweenRequest>,
    springs: Vec<Spring>,
    inbox: Rc<RefCell<Inbox>>,
    next_handle: Rc<Cell<u64>>,
    running: bool,
    last_frame_ms: f64,
    last_delta_ms: f64,
    frames: u64,
}

impl<C: Clock> fmt::Debug for TweenScheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenScheduler")
            .field("active", &self.active.len())
            .field("springs", &self.springs.len())
            .field("running", &self.running)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> TweenScheduler<C> {
    /// Creates an idle scheduler with default settings.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, TweenConfig::default())
    }

    /// Creates an idle scheduler.
    #[must_use]
    pub fn with_config(clock: C, config: TweenConfig) -> Self {
        Self {
            clock,
            config,
            active: Vec::new(),
            springs: Vec::new(),
            inbox: Rc::new(RefCell::new(Inbox::default())),
            next_handle: Rc::new(Cell::new(1)),
            running: false,
            last_frame_ms: 0.0,
            last_delta_ms: 0.0,
            frames: 0,
        }
    }

    /// Returns a spawner sharing this scheduler's queue.
    #[must_use]
    pub fn spawner(&self) -> TweenSpawner<C> {
        TweenSpawner {
            clock: self.clock.clone(),
            default_easing: self.config.default_easing,
            next_handle: Rc::clone(&self.next_handle),
            inbox: Rc::clone(&self.inbox),
        }
    }

    /// The scheduler's clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The scheduler's settings.
    #[must_use]
    pub fn config(&self) -> &TweenConfig {
        &self.config
    }

    // ========== Requests ==========

    /// Starts interpolating fields of `target`.
    ///
    /// Fields the target does not carry are dropped here, never per frame.
    pub fn schedule<T: TweenTarget + 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        options: TweenOptions,
    ) -> TweenHandle {
        let target: TargetRef = target.clone();
        self.schedule_ref(target, options)
    }

    /// Same as `schedule`, for an already type-erased target.
    pub fn schedule_ref(&mut self, target: TargetRef, options: TweenOptions) -> TweenHandle {
        let handle = next_handle(&self.next_handle);
        let request = TweenRequest::build(
            handle,
            target,
            options,
            self.config.default_easing,
            self.clock.now_ms(),
            VecDeque::new(),
        );
        self.push_active(request);
        handle
    }

    /// Runs `steps` one after another. Each step's callback fires before the
    /// next step starts; the next step captures its start values then.
    ///
    /// Every link shares the returned handle, so cancelling it stops whichever
    /// link is running and drops the rest. Returns `None` for an empty chain.
    pub fn chain(&mut self, steps: impl IntoIterator<Item = ChainStep>) -> Option<TweenHandle> {
        let mut steps: VecDeque<ChainStep> = steps.into_iter().collect();
        let first = steps.pop_front()?;
        let handle = next_handle(&self.next_handle);
        let request = TweenRequest::build(
            handle,
            first.target,
            first.options,
            self.config.default_easing,
            self.clock.now_ms(),
            steps,
        );
        self.push_active(request);
        Some(handle)
    }

    /// Removes a request before completion. Its callback does not fire.
    ///
    /// Returns whether anything was removed; unknown and finished handles
    /// are a no-op.
    pub fn cancel(&mut self, handle: TweenHandle) -> bool {
        self.apply_inbox();
        let before = self.active.len();
        self.active.retain(|request| request.handle != handle);
        let removed = self.active.len() != before;
        if removed {
            tracing::debug!("{handle} cancelled");
            self.settle();
        }
        removed
    }

    /// Drops every tween and spring without firing callbacks.
    pub fn clear(&mut self) {
        {
            let mut inbox = self.inbox.borrow_mut();
            inbox.pending.clear();
            inbox.cancelled.clear();
        }
        let dropped = self.active.len() + self.springs.len();
        self.active.clear();
        self.springs.clear();
        if dropped > 0 {
            tracing::debug!("cleared {dropped} animations");
        }
        self.settle();
    }

    pub(crate) fn push_spring(&mut self, spring: Spring) {
        self.springs.push(spring);
        self.start();
    }

    fn push_active(&mut self, request: TweenRequest) {
        self.active.push(request);
        self.start();
    }

    fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.last_frame_ms = self.clock.now_ms();
            tracing::debug!("tween loop started");
        }
    }

    fn settle(&mut self) -> LoopState {
        if self.active.is_empty() && self.springs.is_empty() {
            if self.running {
                self.running = false;
                tracing::debug!("tween loop idle after {} frames", self.frames);
            }
            LoopState::Idle
        } else {
            LoopState::Running
        }
    }

    fn apply_inbox(&mut self) {
        let (pending, cancelled) = {
            let Ok(mut inbox) = self.inbox.try_borrow_mut() else {
                return;
            };
            if inbox.pending.is_empty() && inbox.cancelled.is_empty() {
                return;
            }
            (
                std::mem::take(&mut inbox.pending),
                std::mem::take(&mut inbox.cancelled),
            )
        };
        for request in pending {
            if !cancelled.contains(&request.handle) {
                self.push_active(request);
            }
        }
        if !cancelled.is_empty() {
            self.active
                .retain(|request| !cancelled.contains(&request.handle));
        }
    }

    // ========== Frame ==========

    /// Advances every request to the clock's current time.
    ///
    /// Start times are stamped from the same clock, so there is one timeline.
    /// Requests are updated in reverse registration order. A request whose
    /// progress reaches 1 has its exact end values written, leaves the active
    /// set, and only then has its callback invoked.
    pub fn tick(&mut self) -> LoopState {
        self.apply_inbox();
        if !self.running {
            return LoopState::Idle;
        }
        let now_ms = self.clock.now_ms();

        self.last_delta_ms = clamp_delta(now_ms - self.last_frame_ms, self.config.frame_clamp_ms);
        self.last_frame_ms = now_ms;
        self.frames += 1;

        let continued = self.update_tweens(now_ms);
        for request in continued {
            self.push_active(request);
        }

        #[allow(clippy::cast_possible_truncation)]
        let dt_secs = (self.last_delta_ms / 1000.0) as f32;
        self.update_springs(dt_secs);

        self.apply_inbox();
        self.settle()
    }

    /// Returns the next links of chains that finished this frame.
    fn update_tweens(&mut self, now_ms: f64) -> Vec<TweenRequest> {
        let mut continued = Vec::new();
        let mut i = self.active.len();
        while i > 0 {
            i -= 1;
            let progress = self.active[i].progress(now_ms);
            if progress < 1.0 {
                let request = &self.active[i];
                request.write(request.easing.apply(progress));
                continue;
            }

            self.active[i].snap();
            let mut finished = self.active.remove(i);
            let on_complete = finished.on_complete.take();
            let mut rest = std::mem::take(&mut finished.then);
            let handle = finished.handle;
            drop(finished);

            if let Some(callback) = on_complete {
                callback();
            }
            if let Some(step) = rest.pop_front() {
                continued.push(TweenRequest::build(
                    handle,
                    step.target,
                    step.options,
                    self.config.default_easing,
                    self.clock.now_ms(),
                    rest,
                ));
            }
        }
        continued
    }

    fn update_springs(&mut self, dt_secs: f32) {
        let mut i = self.springs.len();
        while i > 0 {
            i -= 1;
            if !self.springs[i].step(dt_secs) {
                let spring = self.springs.remove(i);
                spring.finish();
            }
        }
    }

    // ========== Queries ==========

    /// Whether the loop wants frames, including spawner requests not yet
    /// merged.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
            || self
                .inbox
                .try_borrow()
                .is_ok_and(|inbox| !inbox.pending.is_empty())
    }

    /// Number of in-flight tweens.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of in-flight springs.
    #[must_use]
    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }

    /// Whether `handle` is still in flight.
    #[must_use]
    pub fn is_active(&self, handle: TweenHandle) -> bool {
        self.active.iter().any(|request| request.handle == handle)
    }

    /// Frames that did work since creation.
    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// The clamped delta of the last processed frame, in milliseconds.
    #[must_use]
    pub fn last_delta_ms(&self) -> f64 {
        self.last_delta_ms
    }
}
