//! # Animatable fields
//!
//! A tween names the channels it drives from a closed set instead of
//! free-form keys. A target declares which channels it carries through
//! `TweenTarget::get`; anything it does not carry is rejected when the
//! request is scheduled, so the per-frame loop only ever touches channels
//! that exist.

use std::fmt;

/// Style sub-record channels (the `style.*` side of a visual element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProp {
    /// `style.opacity`
    Opacity,
    /// `style.left`, in pixels
    Left,
    /// `style.top`, in pixels
    Top,
    /// `style.width`, in pixels
    Width,
    /// `style.height`, in pixels
    Height,
    /// Uniform scale applied through the style record.
    Scale,
    /// Rotation applied through the style record, in degrees.
    Rotate,
    /// Blur radius, in pixels.
    Blur,
    /// Brightness multiplier.
    Brightness,
}

impl StyleProp {
    /// Number of style channels.
    pub const COUNT: usize = 9;

    /// Dense index used by `StyleRecord`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A channel a tween can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
    /// Depth.
    Z,
    /// Uniform scale.
    Scale,
    /// Rotation in degrees.
    Rotation,
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Width.
    Width,
    /// Height.
    Height,
    /// Generic normalized progress (shader uniforms, fill bars).
    Progress,
    /// A channel inside the target's style record.
    Style(StyleProp),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Style(prop) => write!(f, "style.{prop:?}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Something whose numeric channels a tween can write.
///
/// Targets are shared as `Rc<RefCell<T>>`: the effect code keeps one handle to
/// read the animated values, the scheduler keeps another while the request is
/// in flight.
pub trait TweenTarget {
    /// Current value of `field`, or `None` if this target does not carry it.
    fn get(&self, field: Field) -> Option<f32>;

    /// Writes `value` into `field`. Fields the target does not carry are ignored.
    fn set(&mut self, field: Field, value: f32);

    /// Called once per frame after every field of a request has been written.
    fn after_frame(&mut self) {}
}

/// Fixed record of style channels. Unset channels read as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StyleRecord {
    values: [f32; StyleProp::COUNT],
}

impl StyleRecord {
    /// Reads a style channel.
    #[inline]
    #[must_use]
    pub fn get(&self, prop: StyleProp) -> f32 {
        self.values[prop.index()]
    }

    /// Writes a style channel.
    #[inline]
    pub fn set(&mut self, prop: StyleProp, value: f32) {
        self.values[prop.index()] = value;
    }
}

/// A plain animatable record: transform channels plus a style record.
///
/// This is what effect code hands the scheduler when it has no richer
/// object of its own (a card offset, an aura's style, a shader uniform).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedNode {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
    /// Depth.
    pub z: f32,
    /// Uniform scale.
    pub scale: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Opacity.
    pub opacity: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
    /// Generic progress.
    pub progress: f32,
    /// Style channels.
    pub style: StyleRecord,
}

impl Default for AnimatedNode {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            scale: 1.0,
            rotation: 0.0,
            opacity: 1.0,
            width: 0.0,
            height: 0.0,
            progress: 0.0,
            style: StyleRecord::default(),
        }
    }
}

impl AnimatedNode {
    /// A node at `(x, y)` with identity scale and full opacity.
    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

impl TweenTarget for AnimatedNode {
    fn get(&self, field: Field) -> Option<f32> {
        Some(match field {
            Field::X => self.x,
            Field::Y => self.y,
            Field::Z => self.z,
            Field::Scale => self.scale,
            Field::Rotation => self.rotation,
            Field::Opacity => self.opacity,
            Field::Width => self.width,
            Field::Height => self.height,
            Field::Progress => self.progress,
            Field::Style(prop) => self.style.get(prop),
        })
    }

    fn set(&mut self, field: Field, value: f32) {
        match field {
            Field::X => self.x = value,
            Field::Y => self.y = value,
            Field::Z => self.z = value,
            Field::Scale => self.scale = value,
            Field::Rotation => self.rotation = value,
            Field::Opacity => self.opacity = value,
            Field::Width => self.width = value,
            Field::Height => self.height = value,
            Field::Progress => self.progress = value,
            Field::Style(prop) => self.style.set(prop, value),
        }
    }
}

/// A style record on its own is a target for its style channels only.
impl TweenTarget for StyleRecord {
    fn get(&self, field: Field) -> Option<f32> {
        match field {
            Field::Style(prop) => Some(StyleRecord::get(self, prop)),
            _ => None,
        }
    }

    fn set(&mut self, field: Field, value: f32) {
        if let Field::Style(prop) = field {
            StyleRecord::set(self, prop, value);
        }
    }
}
