//! Scheduler configuration, loaded once at startup.

use serde::{Deserialize, Serialize};
use toybrawl_core::{FxError, FxResult, MAX_FRAME_DELTA_MS};

use crate::easing::Easing;

/// Tween scheduler settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenConfig {
    /// Upper bound on a single frame's delta, in milliseconds.
    pub frame_clamp_ms: f64,
    /// Easing used by requests that do not name one.
    pub default_easing: Easing,
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            frame_clamp_ms: MAX_FRAME_DELTA_MS,
            default_easing: Easing::EaseInOut,
        }
    }
}

impl TweenConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidConfig` if the frame clamp is not a positive number.
    pub fn validate(&self) -> FxResult<()> {
        if !self.frame_clamp_ms.is_finite() || self.frame_clamp_ms <= 0.0 {
            return Err(FxError::InvalidConfig(format!(
                "tween.frame_clamp_ms must be positive, got {}",
                self.frame_clamp_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TweenConfig::default();
        assert_eq!(config.frame_clamp_ms, 33.0);
        assert_eq!(config.default_easing, Easing::EaseInOut);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_clamp() {
        let config = TweenConfig {
            frame_clamp_ms: 0.0,
            ..TweenConfig::default()
        };
        assert!(matches!(config.validate(), Err(FxError::InvalidConfig(_))));
    }
}
