//! # Effects Error Types
//!
//! Only strict parsing and configuration loading can fail. The per-frame
//! surface of the scheduler and pool never returns these.

use thiserror::Error;

/// Errors that can occur while configuring the effects core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    /// An easing name was parsed strictly and is not in the table.
    #[error("unknown easing function: {0}")]
    UnknownEasing(String),

    /// A configuration value is out of its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be read.
    #[error("failed to read {path}: {message}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },

    /// A configuration document is not valid TOML for the expected schema.
    #[error("malformed configuration: {0}")]
    Toml(String),
}

/// Result type for effects configuration.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FxError::UnknownEasing("wobble".into()).to_string(),
            "unknown easing function: wobble"
        );
        let io = FxError::Io {
            path: "fx.toml".into(),
            message: "not found".into(),
        };
        assert_eq!(io.to_string(), "failed to read fx.toml: not found");
    }
}
