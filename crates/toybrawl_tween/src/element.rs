//! # Element transform helper
//!
//! Animates a visual element's 2D transform and opacity through the
//! scheduler. Intermediate values live on a private tween target; every frame
//! the element receives the whole transform at once, both as values and as a
//! compositor-ready transform string.
//!
//! While the tween is in flight the element carries a compositor hint. The
//! hint is released when the tween leaves the scheduler, whether it completed,
//! was cancelled or was cleared.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use toybrawl_core::Clock;

use crate::easing::Easing;
use crate::field::{Field, TweenTarget};
use crate::request::{TargetRef, TweenHandle, TweenOptions};
use crate::scheduler::TweenScheduler;

/// Default element tween length, in milliseconds.
pub const DEFAULT_ELEMENT_DURATION_MS: f64 = 300.0;

/// A 2D element transform plus opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementTransform {
    /// Horizontal offset in pixels.
    pub x: f32,
    /// Vertical offset in pixels.
    pub y: f32,
    /// Uniform scale.
    pub scale: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Opacity.
    pub opacity: f32,
}

impl Default for ElementTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
            opacity: 1.0,
        }
    }
}

impl ElementTransform {
    /// Serializes the spatial part as a compositor transform string.
    ///
    /// Opacity is not part of the transform and is committed separately.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "translate3d({}px, {}px, 0) scale({}) rotate({}deg)",
            self.x, self.y, self.scale, self.rotation
        )
    }

    fn get(&self, field: Field) -> Option<f32> {
        match field {
            Field::X => Some(self.x),
            Field::Y => Some(self.y),
            Field::Scale => Some(self.scale),
            Field::Rotation => Some(self.rotation),
            Field::Opacity => Some(self.opacity),
            _ => None,
        }
    }

    fn set(&mut self, field: Field, value: f32) {
        match field {
            Field::X => self.x = value,
            Field::Y => self.y = value,
            Field::Scale => self.scale = value,
            Field::Rotation => self.rotation = value,
            Field::Opacity => self.opacity = value,
            _ => {}
        }
    }
}

/// Compositor layer hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositorHint {
    /// No hint.
    #[default]
    Auto,
    /// Transform and opacity are about to change.
    TransformOpacity,
}

impl CompositorHint {
    /// The hint's style value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::TransformOpacity => "transform, opacity",
        }
    }
}

impl fmt::Display for CompositorHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An element whose transform the helper can drive.
pub trait VisualElement {
    /// The last committed transform, used as the start of a new tween.
    fn committed(&self) -> ElementTransform;

    /// Applies a transform. `css` is `transform.to_css()`.
    fn commit(&mut self, transform: &ElementTransform, css: &str);

    /// Sets or clears the compositor hint.
    fn set_compositor_hint(&mut self, hint: CompositorHint);
}

/// A retained element record: what a DOM-less host renders from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyledElement {
    /// Last committed transform.
    pub transform: ElementTransform,
    /// Last committed transform string.
    pub css_transform: String,
    /// Current compositor hint.
    pub hint: CompositorHint,
    /// Number of commits received.
    pub commits: u64,
}

impl StyledElement {
    /// An element already showing `transform`.
    #[must_use]
    pub fn with_transform(transform: ElementTransform) -> Self {
        Self {
            css_transform: transform.to_css(),
            transform,
            ..Self::default()
        }
    }
}

impl VisualElement for StyledElement {
    fn committed(&self) -> ElementTransform {
        self.transform
    }

    fn commit(&mut self, transform: &ElementTransform, css: &str) {
        self.transform = *transform;
        css.clone_into(&mut self.css_transform);
        self.commits += 1;
    }

    fn set_compositor_hint(&mut self, hint: CompositorHint) {
        self.hint = hint;
    }
}

/// Target transform for `animate_element`.
///
/// Every component has a target: unset ones animate back to the identity
/// (`x = y = rotation = 0`, `scale = opacity = 1`).
pub struct ElementProps {
    to: ElementTransform,
    duration_ms: f64,
    easing: Option<Easing>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl Default for ElementProps {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementProps {
    /// Identity target over 300ms.
    #[must_use]
    pub fn new() -> Self {
        Self {
            to: ElementTransform::default(),
            duration_ms: DEFAULT_ELEMENT_DURATION_MS,
            easing: None,
            on_complete: None,
        }
    }

    /// Target offset.
    #[must_use]
    pub fn translate(mut self, x: f32, y: f32) -> Self {
        self.to.x = x;
        self.to.y = y;
        self
    }

    /// Target scale.
    #[must_use]
    pub fn scale(mut self, scale: f32) -> Self {
        self.to.scale = scale;
        self
    }

    /// Target rotation in degrees.
    #[must_use]
    pub fn rotation(mut self, degrees: f32) -> Self {
        self.to.rotation = degrees;
        self
    }

    /// Target opacity.
    #[must_use]
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.to.opacity = opacity;
        self
    }

    /// Tween length.
    #[must_use]
    pub fn duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Easing; the scheduler default otherwise.
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Completion callback, fired after the final transform is committed.
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for ElementProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementProps")
            .field("to", &self.to)
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .finish_non_exhaustive()
    }
}

/// Scheduler-side proxy: owns the in-flight values, pushes them to the element.
struct ElementTween<E: VisualElement> {
    element: Rc<RefCell<E>>,
    current: ElementTransform,
}

impl<E: VisualElement> ElementTween<E> {
    fn commit(&self) {
        if let Ok(mut element) = self.element.try_borrow_mut() {
            element.commit(&self.current, &self.current.to_css());
        }
    }
}

impl<E: VisualElement> TweenTarget for ElementTween<E> {
    fn get(&self, field: Field) -> Option<f32> {
        self.current.get(field)
    }

    fn set(&mut self, field: Field, value: f32) {
        self.current.set(field, value);
    }

    fn after_frame(&mut self) {
        self.commit();
    }
}

impl<E: VisualElement> Drop for ElementTween<E> {
    fn drop(&mut self) {
        if let Ok(mut element) = self.element.try_borrow_mut() {
            element.set_compositor_hint(CompositorHint::Auto);
        }
    }
}

impl<C: Clock> TweenScheduler<C> {
    /// Tweens `element` from its committed transform to `props`.
    ///
    /// The element is hinted for compositing and receives its start transform
    /// immediately.
    pub fn animate_element<E: VisualElement + 'static>(
        &mut self,
        element: &Rc<RefCell<E>>,
        props: ElementProps,
    ) -> TweenHandle {
        let ElementProps {
            to,
            duration_ms,
            easing,
            on_complete,
        } = props;

        let current = match element.try_borrow_mut() {
            Ok(mut el) => {
                el.set_compositor_hint(CompositorHint::TransformOpacity);
                el.committed()
            }
            Err(_) => ElementTransform::default(),
        };
        let proxy = ElementTween {
            element: Rc::clone(element),
            current,
        };
        proxy.commit();

        let mut options = TweenOptions::new(duration_ms)
            .to(Field::X, to.x)
            .to(Field::Y, to.y)
            .to(Field::Scale, to.scale)
            .to(Field::Rotation, to.rotation)
            .to(Field::Opacity, to.opacity);
        options.easing = easing;
        options.on_complete = on_complete;

        let target: TargetRef = Rc::new(RefCell::new(proxy));
        self.schedule_ref(target, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use toybrawl_core::ManualClock;

    fn setup() -> (ManualClock, TweenScheduler<ManualClock>, Rc<RefCell<StyledElement>>) {
        let clock = ManualClock::new(0.0);
        let scheduler = TweenScheduler::new(clock.clone());
        let element = Rc::new(RefCell::new(StyledElement::default()));
        (clock, scheduler, element)
    }

    fn run(clock: &ManualClock, scheduler: &mut TweenScheduler<ManualClock>, frames: usize) {
        for _ in 0..frames {
            clock.advance(16.0);
            scheduler.tick();
        }
    }

    #[test]
    fn test_css_format() {
        let transform = ElementTransform {
            x: 10.0,
            y: -4.5,
            scale: 1.5,
            rotation: 90.0,
            opacity: 0.5,
        };
        assert_eq!(
            transform.to_css(),
            "translate3d(10px, -4.5px, 0) scale(1.5) rotate(90deg)"
        );
        assert_eq!(
            ElementTransform::default().to_css(),
            "translate3d(0px, 0px, 0) scale(1) rotate(0deg)"
        );
    }

    #[test]
    fn test_hint_released_on_completion() {
        let (clock, mut scheduler, element) = setup();
        let hint_at_callback = Rc::new(Cell::new(CompositorHint::TransformOpacity));
        let seen = Rc::clone(&hint_at_callback);
        let observed = Rc::clone(&element);

        scheduler.animate_element(
            &element,
            ElementProps::new()
                .translate(40.0, 20.0)
                .scale(2.0)
                .opacity(0.25)
                .on_complete(move || seen.set(observed.borrow().hint)),
        );
        assert_eq!(element.borrow().hint, CompositorHint::TransformOpacity);
        assert_eq!(element.borrow().commits, 1);

        run(&clock, &mut scheduler, 5);
        assert_eq!(element.borrow().hint, CompositorHint::TransformOpacity);
        assert!(element.borrow().transform.x > 0.0);

        run(&clock, &mut scheduler, 30);
        let el = element.borrow();
        assert_eq!(el.hint, CompositorHint::Auto);
        assert_eq!(hint_at_callback.get(), CompositorHint::Auto);
        assert_eq!(el.transform.x, 40.0);
        assert_eq!(el.transform.scale, 2.0);
        assert_eq!(el.transform.opacity, 0.25);
        assert_eq!(el.css_transform, "translate3d(40px, 20px, 0) scale(2) rotate(0deg)");
    }

    #[test]
    fn test_hint_released_on_cancel() {
        let (clock, mut scheduler, element) = setup();
        let handle = scheduler.animate_element(&element, ElementProps::new().translate(100.0, 0.0));
        run(&clock, &mut scheduler, 3);
        assert!(scheduler.cancel(handle));
        assert_eq!(element.borrow().hint, CompositorHint::Auto);
        assert!(element.borrow().transform.x < 100.0);
    }

    #[test]
    fn test_hint_released_on_clear() {
        let (_clock, mut scheduler, element) = setup();
        scheduler.animate_element(&element, ElementProps::new().rotation(45.0));
        scheduler.clear();
        assert_eq!(element.borrow().hint, CompositorHint::Auto);
    }

    #[test]
    fn test_starts_from_committed_transform() {
        let clock = ManualClock::new(0.0);
        let mut scheduler = TweenScheduler::new(clock.clone());
        let element = Rc::new(RefCell::new(StyledElement::with_transform(ElementTransform {
            x: 80.0,
            ..ElementTransform::default()
        })));

        scheduler.animate_element(
            &element,
            ElementProps::new().duration_ms(100.0).easing(Easing::Linear),
        );
        clock.set(50.0);
        scheduler.tick();
        assert!((element.borrow().transform.x - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_unset_components_return_to_identity() {
        let (clock, mut scheduler, element) = setup();
        element.borrow_mut().transform = ElementTransform {
            x: 5.0,
            y: 5.0,
            scale: 3.0,
            rotation: 30.0,
            opacity: 0.0,
        };
        scheduler.animate_element(&element, ElementProps::new().duration_ms(32.0));
        run(&clock, &mut scheduler, 4);
        assert_eq!(element.borrow().transform, ElementTransform::default());
    }
}
