//! # Tween requests
//!
//! One in-flight interpolation: which channels of which target move from
//! where to where, over how long, and what to call when it lands.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::easing::Easing;
use crate::field::{Field, TweenTarget};

/// Shared handle to a tween target.
pub type TargetRef = Rc<RefCell<dyn TweenTarget>>;

/// Zero-argument completion callback.
pub type Callback = Box<dyn FnOnce()>;

/// Opaque handle returned by `schedule`, usable to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenHandle(pub(crate) u64);

impl TweenHandle {
    /// Raw id, for logging.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TweenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tween#{}", self.0)
    }
}

/// What to animate and how.
///
/// ```rust,ignore
/// let options = TweenOptions::new(1000.0)
///     .from(Field::X, 0.0)
///     .to(Field::X, 100.0)
///     .easing(Easing::Linear)
///     .on_complete(|| println!("landed"));
/// ```
pub struct TweenOptions {
    pub(crate) to: Vec<(Field, f32)>,
    pub(crate) from: Vec<(Field, f32)>,
    pub(crate) duration_ms: f64,
    pub(crate) easing: Option<Easing>,
    pub(crate) on_complete: Option<Callback>,
}

impl TweenOptions {
    /// Options for a tween lasting `duration_ms`.
    ///
    /// Durations that are not strictly positive complete on the next tick.
    #[must_use]
    pub fn new(duration_ms: f64) -> Self {
        Self {
            to: Vec::new(),
            from: Vec::new(),
            duration_ms,
            easing: None,
            on_complete: None,
        }
    }

    /// Sets the end value of `field`.
    #[must_use]
    pub fn to(mut self, field: Field, value: f32) -> Self {
        upsert(&mut self.to, field, value);
        self
    }

    /// Sets an explicit start value for `field`.
    ///
    /// Without one the field's value on the target at request time is used.
    #[must_use]
    pub fn from(mut self, field: Field, value: f32) -> Self {
        upsert(&mut self.from, field, value);
        self
    }

    /// Sets the easing function.
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Sets the easing by table name. Unknown names select `Linear`.
    #[must_use]
    pub fn easing_named(self, name: &str) -> Self {
        self.easing(Easing::from_name(name))
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }
}

impl fmt::Debug for TweenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenOptions")
            .field("to", &self.to)
            .field("from", &self.from)
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

fn upsert(values: &mut Vec<(Field, f32)>, field: Field, value: f32) {
    match values.iter_mut().find(|(f, _)| *f == field) {
        Some(slot) => slot.1 = value,
        None => values.push((field, value)),
    }
}

/// One step of a chain: a target and the tween to run on it.
pub struct ChainStep {
    pub(crate) target: TargetRef,
    pub(crate) options: TweenOptions,
}

impl ChainStep {
    /// Creates a chain step.
    #[must_use]
    pub fn new<T: TweenTarget + 'static>(target: &Rc<RefCell<T>>, options: TweenOptions) -> Self {
        let target: TargetRef = target.clone();
        Self { target, options }
    }
}

/// A single driven channel with its captured endpoints.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Channel {
    pub(crate) field: Field,
    pub(crate) from: f32,
    pub(crate) to: f32,
}

/// An in-flight tween. Mutated only by the scheduler.
pub(crate) struct TweenRequest {
    pub(crate) handle: TweenHandle,
    target: TargetRef,
    channels: Vec<Channel>,
    start_ms: f64,
    duration_ms: f64,
    pub(crate) easing: Easing,
    pub(crate) on_complete: Option<Callback>,
    /// Remaining chain links, started one after another under the same handle.
    pub(crate) then: VecDeque<ChainStep>,
}

impl TweenRequest {
    /// Captures start values and validates fields against the target.
    pub(crate) fn build(
        handle: TweenHandle,
        target: TargetRef,
        options: TweenOptions,
        default_easing: Easing,
        now_ms: f64,
        then: VecDeque<ChainStep>,
    ) -> Self {
        let TweenOptions {
            to,
            from,
            duration_ms,
            easing,
            on_complete,
        } = options;

        let current = target.try_borrow().ok();
        let channels: Vec<Channel> = to
            .into_iter()
            .filter_map(|(field, to)| {
                let explicit = from.iter().find(|(f, _)| *f == field).map(|(_, v)| *v);
                let start = match &current {
                    Some(t) => t.get(field).map(|carried| explicit.unwrap_or(carried)),
                    None => explicit,
                };
                if let Some(from) = start {
                    Some(Channel { field, from, to })
                } else {
                    tracing::warn!("{handle}: target does not carry {field}, dropping channel");
                    None
                }
            })
            .collect();
        drop(current);

        Self {
            handle,
            target,
            channels,
            start_ms: now_ms,
            duration_ms,
            easing: easing.unwrap_or(default_easing),
            on_complete,
            then,
        }
    }

    /// Linear progress at `now_ms`, clamped to `[0, 1]`.
    ///
    /// Durations that are not strictly positive report completion.
    pub(crate) fn progress(&self, now_ms: f64) -> f32 {
        if !self.duration_ms.is_finite() || self.duration_ms <= 0.0 {
            return 1.0;
        }
        let raw = (now_ms - self.start_ms) / self.duration_ms;
        if raw.is_nan() {
            return 1.0;
        }
        #[allow(clippy::cast_possible_truncation)]
        let progress = raw.clamp(0.0, 1.0) as f32;
        progress
    }

    /// Writes interpolated values for an eased progress.
    pub(crate) fn write(&self, eased: f32) {
        self.write_with(|c| c.from + (c.to - c.from) * eased);
    }

    /// Writes the exact end values.
    pub(crate) fn snap(&self) {
        self.write_with(|c| c.to);
    }

    fn write_with(&self, value: impl Fn(&Channel) -> f32) {
        // A target borrowed elsewhere this frame keeps its value until the next one.
        let Ok(mut target) = self.target.try_borrow_mut() else {
            return;
        };
        for channel in &self.channels {
            target.set(channel.field, value(channel));
        }
        target.after_frame();
    }

    #[cfg(test)]
    pub(crate) fn channels(&self) -> &[Channel] {
        &self.channels
    }
}
