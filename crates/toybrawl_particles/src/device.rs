//! Device capability profile.
//!
//! Capacity is decided once, at pool construction, from a profile the host
//! supplies. The pool never probes the machine itself.

use serde::{Deserialize, Serialize};

use crate::config::PoolConfig;

/// What the host knows about the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    /// Logical CPU cores.
    pub logical_cores: u32,
    /// Device memory in gigabytes.
    pub memory_gb: f32,
    /// Phone or tablet.
    pub mobile: bool,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::DESKTOP
    }
}

impl DeviceProfile {
    /// A mid-range desktop.
    pub const DESKTOP: Self = Self {
        logical_cores: 8,
        memory_gb: 8.0,
        mobile: false,
    };

    /// A typical phone.
    pub const MOBILE: Self = Self {
        logical_cores: 8,
        memory_gb: 4.0,
        mobile: true,
    };

    /// Mobile, or four cores or fewer, or 4 GB of memory or less.
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        self.mobile || self.logical_cores <= 4 || self.memory_gb <= 4.0
    }

    /// Largest capacity any one category may have on this device.
    #[must_use]
    pub fn capacity_ceiling(&self, config: &PoolConfig) -> usize {
        if self.is_constrained() {
            config.max_particles.min(config.constrained_ceiling)
        } else {
            config.max_particles
        }
    }
}
