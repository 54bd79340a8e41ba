//! Frame loop contract shared by every per-frame component.

/// Largest delta a single frame may advance by, in milliseconds.
///
/// A tab that was backgrounded and resumed produces one huge gap between
/// frames; stepping by this instead keeps the motion continuous.
pub const MAX_FRAME_DELTA_MS: f64 = 33.0;

/// Frame budget at 60 FPS, in milliseconds.
pub const TARGET_FRAME_MS: f64 = 1000.0 / 60.0;

/// Whether a component still wants frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Work remains; the host should schedule another frame.
    Running,
    /// Nothing is active; the host may stop requesting frames.
    #[default]
    Idle,
}

impl LoopState {
    /// Returns true if another frame is wanted.
    #[inline]
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Combines two components' states; running wins.
    #[inline]
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        if self.is_running() || other.is_running() {
            Self::Running
        } else {
            Self::Idle
        }
    }
}

/// Clamps a raw frame delta into `[0, max_ms]`.
///
/// Non-finite or negative gaps (clock went backwards) become zero.
#[inline]
#[must_use]
pub fn clamp_delta(raw_ms: f64, max_ms: f64) -> f64 {
    if raw_ms.is_finite() && raw_ms > 0.0 {
        raw_ms.min(max_ms)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_delta() {
        assert_eq!(clamp_delta(16.0, MAX_FRAME_DELTA_MS), 16.0);
        assert_eq!(clamp_delta(5_000.0, MAX_FRAME_DELTA_MS), 33.0);
        assert_eq!(clamp_delta(-4.0, MAX_FRAME_DELTA_MS), 0.0);
        assert_eq!(clamp_delta(f64::NAN, MAX_FRAME_DELTA_MS), 0.0);
    }

    #[test]
    fn test_loop_state_or() {
        assert_eq!(LoopState::Idle.or(LoopState::Idle), LoopState::Idle);
        assert_eq!(LoopState::Idle.or(LoopState::Running), LoopState::Running);
        assert!(LoopState::Running.or(LoopState::Idle).is_running());
    }
}
