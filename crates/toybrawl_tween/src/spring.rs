//! # Spring stepper
//!
//! A damped spring pulling fields toward a target. Unlike a tween it has no
//! duration: it settles when every field is within `epsilon` of its target
//! and moving slower than `epsilon`, then snaps and fires its callback.
//!
//! Springs are fire-and-forget. They have no handle and can only be dropped
//! wholesale through `TweenScheduler::clear`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use toybrawl_core::Clock;

use crate::field::{Field, TweenTarget};
use crate::request::{Callback, TargetRef};
use crate::scheduler::TweenScheduler;

/// Spring parameters.
pub struct SpringOptions {
    to: Vec<(Field, f32)>,
    stiffness: f32,
    damping: f32,
    epsilon: f32,
    on_complete: Option<Callback>,
}

impl Default for SpringOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SpringOptions {
    /// Stiffness 100, damping 10, epsilon 0.01.
    #[must_use]
    pub fn new() -> Self {
        Self {
            to: Vec::new(),
            stiffness: 100.0,
            damping: 10.0,
            epsilon: 0.01,
            on_complete: None,
        }
    }

    /// Pulls `field` toward `value`.
    #[must_use]
    pub fn to(mut self, field: Field, value: f32) -> Self {
        match self.to.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.to.push((field, value)),
        }
        self
    }

    /// Sets the stiffness.
    #[must_use]
    pub fn stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    /// Sets the damping.
    #[must_use]
    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Sets the settle threshold for both distance and velocity.
    #[must_use]
    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon.abs();
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for SpringOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpringOptions")
            .field("to", &self.to)
            .field("stiffness", &self.stiffness)
            .field("damping", &self.damping)
            .field("epsilon", &self.epsilon)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
struct SpringChannel {
    field: Field,
    to: f32,
    velocity: f32,
}

/// An in-flight spring. Mutated only by the scheduler.
pub(crate) struct Spring {
    target: TargetRef,
    channels: Vec<SpringChannel>,
    stiffness: f32,
    damping: f32,
    epsilon: f32,
    on_complete: Option<Callback>,
}

impl Spring {
    fn build(target: TargetRef, options: SpringOptions) -> Self {
        let SpringOptions {
            to,
            stiffness,
            damping,
            epsilon,
            on_complete,
        } = options;

        let channels = match target.try_borrow() {
            Ok(current) => to
                .into_iter()
                .filter(|(field, _)| {
                    let carried = current.get(*field).is_some();
                    if !carried {
                        tracing::warn!("spring target does not carry {field}, dropping channel");
                    }
                    carried
                })
                .map(|(field, to)| SpringChannel {
                    field,
                    to,
                    velocity: 0.0,
                })
                .collect(),
            Err(_) => to
                .into_iter()
                .map(|(field, to)| SpringChannel {
                    field,
                    to,
                    velocity: 0.0,
                })
                .collect(),
        };

        Self {
            target,
            channels,
            stiffness,
            damping,
            epsilon,
            on_complete,
        }
    }

    /// Advances by `dt_secs`. Returns true while any channel is still moving.
    pub(crate) fn step(&mut self, dt_secs: f32) -> bool {
        let Ok(mut target) = self.target.try_borrow_mut() else {
            return true;
        };
        let mut moving = false;
        for channel in &mut self.channels {
            let Some(current) = target.get(channel.field) else {
                continue;
            };
            let distance = channel.to - current;
            let acceleration =
                (distance * self.stiffness - channel.velocity * self.damping) / 100.0;
            channel.velocity += acceleration * dt_secs;
            target.set(channel.field, current + channel.velocity * dt_secs);

            if distance.abs() > self.epsilon || channel.velocity.abs() > self.epsilon {
                moving = true;
            }
        }
        target.after_frame();
        moving
    }

    /// Writes the exact targets, then fires the callback.
    pub(crate) fn finish(mut self) {
        if let Ok(mut target) = self.target.try_borrow_mut() {
            for channel in &self.channels {
                target.set(channel.field, channel.to);
            }
            target.after_frame();
        }
        let on_complete = self.on_complete.take();
        drop(self);
        if let Some(callback) = on_complete {
            callback();
        }
    }
}

impl<C: Clock> TweenScheduler<C> {
    /// Springs fields of `target` toward the values in `options`.
    pub fn spring<T: TweenTarget + 'static>(
        &mut self,
        target: &Rc<RefCell<T>>,
        options: SpringOptions,
    ) {
        let target: TargetRef = target.clone();
        self.push_spring(Spring::build(target, options));
    }
}
