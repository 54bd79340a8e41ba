//! Pool configuration, loaded once at startup.

use serde::{Deserialize, Serialize};
use toybrawl_core::{FxError, FxResult};

/// Particle pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Per-category capacity ceiling on capable devices.
    pub max_particles: usize,
    /// Per-category capacity ceiling on constrained devices.
    pub constrained_ceiling: usize,
    /// Seed for emission jitter.
    pub seed: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_particles: 5000,
            constrained_ceiling: 500,
            seed: 0x5eed_f00d,
        }
    }
}

impl PoolConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `FxError::InvalidConfig` if either ceiling is zero.
    pub fn validate(&self) -> FxResult<()> {
        if self.max_particles == 0 {
            return Err(FxError::InvalidConfig(
                "particles.max_particles must be at least 1".into(),
            ));
        }
        if self.constrained_ceiling == 0 {
            return Err(FxError::InvalidConfig(
                "particles.constrained_ceiling must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
