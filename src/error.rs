//! Error type shared by every fallible entry point
//!
//! Validation failures come in two kinds: the argument has the wrong shape
//! ([`StatsError::InvalidType`]) or the right shape with an unusable value
//! ([`StatsError::InvalidValue`]). Both are returned before any computation
//! starts.

use thiserror::Error;

/// Validation error raised by the batch functions and the dynamic API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// Argument is not of the expected kind (not a number, not an array, ...)
    #[error("invalid type: {0}")]
    InvalidType(String),
    /// Argument has the expected kind but a value that cannot be used
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl StatsError {
    pub(crate) fn invalid_type(msg: impl Into<String>) -> Self {
        Self::InvalidType(msg.into())
    }

    pub(crate) fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    /// The message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidType(msg) | Self::InvalidValue(msg) => msg,
        }
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::InvalidType(_))
    }

    pub fn is_value_error(&self) -> bool {
        matches!(self, Self::InvalidValue(_))
    }
}

/// Result alias for this crate
pub type Result<T> = core::result::Result<T, StatsError>;
