//! # Effects configuration
//!
//! One TOML document, loaded once at startup. Every table and every field is
//! optional; an empty document yields the defaults.
//!
//! ```toml
//! [tween]
//! frame_clamp_ms = 33.0
//! default_easing = "easeInOut"
//!
//! [particles]
//! max_particles = 5000
//! constrained_ceiling = 500
//! seed = 42
//!
//! [device]
//! logical_cores = 4
//! memory_gb = 3.0
//! mobile = true
//!
//! [presets.hit]
//! count = 25
//!
//! [frame]
//! target_fps = 60
//! warn_over_budget = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use toybrawl_core::{FxError, FxResult};
use toybrawl_particles::{DeviceProfile, PoolConfig, PresetTable};
use toybrawl_tween::TweenConfig;

/// Host frame budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameBudget {
    /// Refresh rate the effects are tuned for.
    pub target_fps: u32,
    /// Log frames whose work exceeds the budget.
    pub warn_over_budget: bool,
}

impl Default for FrameBudget {
    fn default() -> Self {
        Self {
            target_fps: 60,
            warn_over_budget: true,
        }
    }
}

impl FrameBudget {
    /// Budget per frame in milliseconds.
    #[must_use]
    pub fn target_frame_ms(&self) -> f64 {
        1000.0 / f64::from(self.target_fps.max(1))
    }
}

/// All effects settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// `[tween]`
    pub tween: TweenConfig,
    /// `[particles]`
    pub particles: PoolConfig,
    /// `[device]`
    pub device: DeviceProfile,
    /// `[presets.*]`
    pub presets: PresetTable,
    /// `[frame]`
    pub frame: FrameBudget,
}

impl EffectsConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `FxError::Toml` for malformed documents and
    /// `FxError::InvalidConfig` for out-of-range values.
    pub fn from_toml_str(text: &str) -> FxResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| FxError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `FxError::Io` if the file cannot be read, otherwise as
    /// `from_toml_str`.
    pub fn load(path: impl AsRef<Path>) -> FxResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| FxError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("effects configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    ///
    /// Returns `FxError::Toml` if a value cannot be represented.
    pub fn to_toml_string(&self) -> FxResult<String> {
        toml::to_string_pretty(self).map_err(|e| FxError::Toml(e.to_string()))
    }

    /// Checks value ranges across every table.
    ///
    /// # Errors
    ///
    /// Returns the first `FxError::InvalidConfig` found.
    pub fn validate(&self) -> FxResult<()> {
        self.tween.validate()?;
        self.particles.validate()?;
        if self.frame.target_fps == 0 {
            return Err(FxError::InvalidConfig("frame.target_fps must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toybrawl_particles::BlendMode;
    use toybrawl_tween::Easing;

    #[test]
    fn test_empty_document_is_default() {
        let config = EffectsConfig::from_toml_str("").unwrap();
        assert_eq!(config, EffectsConfig::default());
        assert_eq!(config.frame.target_frame_ms(), 1000.0 / 60.0);
    }

    #[test]
    fn test_overrides_apply() {
        let config = EffectsConfig::from_toml_str(
            r#"
            [tween]
            default_easing = "easeOutBounce"

            [particles]
            seed = 42

            [device]
            mobile = true

            [presets.hit]
            count = 25
            blend = "additive"
            "#,
        )
        .unwrap();
        assert_eq!(config.tween.default_easing, Easing::EaseOutBounce);
        assert_eq!(config.tween.frame_clamp_ms, 33.0);
        assert_eq!(config.particles.seed, 42);
        assert_eq!(config.particles.max_particles, 5000);
        assert!(config.device.mobile);
        assert_eq!(config.presets.hit.count, 25);
        assert_eq!(config.presets.hit.blend, BlendMode::Additive);
        // untouched fields keep the preset's own values
        assert_eq!(config.presets.hit.spread, 15.0);
        assert_eq!(config.presets.hit.life_ms, 300.0);
        assert_eq!(config.presets.explosion.count, 50);
    }

    #[test]
    fn test_malformed_document() {
        let err = EffectsConfig::from_toml_str("[tween\nframe_clamp_ms = ").unwrap_err();
        assert!(matches!(err, FxError::Toml(_)));
    }

    #[test]
    fn test_unknown_easing_rejected_in_config() {
        let err = EffectsConfig::from_toml_str("[tween]\ndefault_easing = \"wobble\"").unwrap_err();
        assert!(matches!(err, FxError::Toml(_)));
    }

    #[test]
    fn test_invalid_ranges() {
        let err = EffectsConfig::from_toml_str("[frame]\ntarget_fps = 0").unwrap_err();
        assert!(matches!(err, FxError::InvalidConfig(_)));
        let err = EffectsConfig::from_toml_str("[tween]\nframe_clamp_ms = -1.0").unwrap_err();
        assert!(matches!(err, FxError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EffectsConfig::load("/definitely/not/here/fx.toml").unwrap_err();
        assert!(matches!(err, FxError::Io { .. }));
    }

    #[test]
    fn test_round_trip() {
        let mut config = EffectsConfig::default();
        config.particles.seed = 7;
        config.device.logical_cores = 2;
        let text = config.to_toml_string().unwrap();
        assert_eq!(EffectsConfig::from_toml_str(&text).unwrap(), config);
    }
}
