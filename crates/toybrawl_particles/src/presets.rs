//! Preset bursts.
//!
//! Each preset is a parameter bundle layered over `ParticlePool::emit`: the
//! category it lives in, and the burst it fires. The category is created on
//! first use.

use serde::{Deserialize, Serialize};
use toybrawl_core::{Rgb, Vec3};

use crate::category::{CategoryConfig, ParticleBurst};
use crate::surface::BlendMode;

/// The built-in presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Orange blast rising then falling.
    Explosion,
    /// Small, short yellow glints.
    Sparkle,
    /// Slow green motes drifting up.
    Heal,
    /// Quick red spatter, alpha blended.
    Hit,
}

impl Preset {
    /// Every preset.
    pub const ALL: [Self; 4] = [Self::Explosion, Self::Sparkle, Self::Heal, Self::Hit];

    /// Category name the preset emits into.
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            Self::Explosion => "explosion",
            Self::Sparkle => "sparkle",
            Self::Heal => "heal",
            Self::Hit => "hit",
        }
    }
}

/// One preset's parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetBundle {
    /// Capacity of the category created on first use.
    pub capacity: usize,
    /// Blend mode of that category.
    pub blend: BlendMode,
    /// Color when the caller gives none.
    pub color: Rgb,
    /// Ignore the caller's color.
    pub fixed_color: bool,
    /// Particles per burst.
    pub count: u32,
    /// Positional jitter.
    pub spread: f32,
    /// Base point size.
    pub size: f32,
    /// Lifetime in milliseconds.
    pub life_ms: f64,
    /// Initial velocity.
    pub velocity: Vec3,
    /// Downward acceleration.
    pub gravity: f32,
    /// Fade with remaining life.
    pub fade_out: bool,
}

impl Default for PresetBundle {
    fn default() -> Self {
        let burst = ParticleBurst::default();
        let category = CategoryConfig::default();
        Self {
            capacity: category.capacity,
            blend: category.blend,
            color: category.base_color,
            fixed_color: false,
            count: burst.count,
            spread: burst.spread,
            size: category.base_size,
            life_ms: burst.life_ms,
            velocity: burst.velocity,
            gravity: burst.gravity,
            fade_out: burst.fade_out,
        }
    }
}

impl PresetBundle {
    /// Category settings for first use.
    #[must_use]
    pub fn category_config(&self) -> CategoryConfig {
        CategoryConfig {
            capacity: self.capacity,
            blend: self.blend,
            ..CategoryConfig::default()
        }
    }

    /// The burst fired at `position`.
    #[must_use]
    pub fn burst(&self, position: Vec3, color: Option<Rgb>) -> ParticleBurst {
        let color = if self.fixed_color {
            self.color
        } else {
            color.unwrap_or(self.color)
        };
        ParticleBurst {
            position,
            velocity: self.velocity,
            color: Some(color),
            size: Some(self.size),
            life_ms: self.life_ms,
            count: self.count,
            spread: self.spread,
            gravity: self.gravity,
            fade_out: self.fade_out,
        }
    }
}

/// The four bundles, overridable from configuration.
///
/// Overrides are merged field by field onto each preset's own defaults, so
/// `[presets.hit] count = 25` keeps the rest of the hit bundle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PresetOverrides", into = "PresetOverrides")]
pub struct PresetTable {
    /// `explosion`
    pub explosion: PresetBundle,
    /// `sparkle`
    pub sparkle: PresetBundle,
    /// `heal`
    pub heal: PresetBundle,
    /// `hit`
    pub hit: PresetBundle,
}

impl Default for PresetTable {
    fn default() -> Self {
        Self {
            explosion: PresetBundle {
                capacity: 500,
                blend: BlendMode::Additive,
                color: Rgb::new(1.0, 0.5, 0.0),
                count: 50,
                spread: 30.0,
                size: 15.0,
                life_ms: 1000.0,
                velocity: Vec3::new(0.0, 20.0, 0.0),
                gravity: -50.0,
                ..PresetBundle::default()
            },
            sparkle: PresetBundle {
                capacity: 200,
                blend: BlendMode::Additive,
                color: Rgb::new(1.0, 1.0, 0.0),
                count: 10,
                spread: 20.0,
                size: 5.0,
                life_ms: 500.0,
                ..PresetBundle::default()
            },
            heal: PresetBundle {
                capacity: 300,
                blend: BlendMode::Additive,
                color: Rgb::new(0.0, 1.0, 0.5),
                fixed_color: true,
                count: 20,
                spread: 10.0,
                size: 8.0,
                life_ms: 1500.0,
                velocity: Vec3::new(0.0, 10.0, 0.0),
                ..PresetBundle::default()
            },
            hit: PresetBundle {
                capacity: 100,
                blend: BlendMode::Normal,
                color: Rgb::new(1.0, 0.0, 0.0),
                count: 15,
                spread: 15.0,
                size: 12.0,
                life_ms: 300.0,
                velocity: Vec3::new(0.0, -5.0, 0.0),
                gravity: -20.0,
                ..PresetBundle::default()
            },
        }
    }
}

impl PresetTable {
    /// The bundle for `preset`.
    #[must_use]
    pub fn get(&self, preset: Preset) -> &PresetBundle {
        match preset {
            Preset::Explosion => &self.explosion,
            Preset::Sparkle => &self.sparkle,
            Preset::Heal => &self.heal,
            Preset::Hit => &self.hit,
        }
    }
}

/// Partial bundle as written in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blend: Option<BlendMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fixed_color: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spread: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    life_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    velocity: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gravity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fade_out: Option<bool>,
}

impl PresetOverride {
    fn apply(&self, bundle: &mut PresetBundle) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    bundle.$field = value;
                })*
            };
        }
        merge!(capacity, blend, color, fixed_color, count, spread, size, life_ms, velocity, gravity, fade_out);
    }
}

impl From<PresetBundle> for PresetOverride {
    fn from(bundle: PresetBundle) -> Self {
        Self {
            capacity: Some(bundle.capacity),
            blend: Some(bundle.blend),
            color: Some(bundle.color),
            fixed_color: Some(bundle.fixed_color),
            count: Some(bundle.count),
            spread: Some(bundle.spread),
            size: Some(bundle.size),
            life_ms: Some(bundle.life_ms),
            velocity: Some(bundle.velocity),
            gravity: Some(bundle.gravity),
            fade_out: Some(bundle.fade_out),
        }
    }
}

/// The `[presets]` table as written in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetOverrides {
    /// `[presets.explosion]`
    pub explosion: PresetOverride,
    /// `[presets.sparkle]`
    pub sparkle: PresetOverride,
    /// `[presets.heal]`
    pub heal: PresetOverride,
    /// `[presets.hit]`
    pub hit: PresetOverride,
}

impl From<PresetOverrides> for PresetTable {
    fn from(overrides: PresetOverrides) -> Self {
        let mut table = Self::default();
        overrides.explosion.apply(&mut table.explosion);
        overrides.sparkle.apply(&mut table.sparkle);
        overrides.heal.apply(&mut table.heal);
        overrides.hit.apply(&mut table.hit);
        table
    }
}

impl From<PresetTable> for PresetOverrides {
    fn from(table: PresetTable) -> Self {
        Self {
            explosion: table.explosion.into(),
            sparkle: table.sparkle.into(),
            heal: table.heal.into(),
            hit: table.hit.into(),
        }
    }
}
