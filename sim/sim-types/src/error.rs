//! Error types shared across the collision crates.

use thiserror::Error;

/// Errors raised by shared collision types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Invalid body ID referenced.
    #[error("invalid body ID: {0}")]
    InvalidBodyId(u64),

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// A pose or shape parameter contained `NaN` or `Inf`.
    #[error("non-finite value in {what}")]
    NonFinite {
        /// What held the non-finite value.
        what: String,
    },
}

impl SimError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a non-finite value error.
    #[must_use]
    pub fn non_finite(what: impl Into<String>) -> Self {
        Self::NonFinite { what: what.into() }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::InvalidBodyId(42);
        assert!(err.to_string().contains("42"));

        let err = SimError::non_finite("pose of Body(3)");
        assert_eq!(err.to_string(), "non-finite value in pose of Body(3)");
    }

    #[test]
    fn test_error_predicates() {
        assert!(SimError::invalid_config("bad value").is_config_error());
        assert!(!SimError::InvalidBodyId(1).is_config_error());
    }
}
