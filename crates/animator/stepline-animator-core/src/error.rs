//! Error types for animator construction and scheduling.

use crate::ids::AnimatorId;

/// Every failure the animator subsystem can surface.
///
/// None of these are transient: they indicate a configuration or programming
/// mistake and are never retried internally.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimatorError {
    /// Rejected at build time (negative delays, empty required lists, ...)
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// A leaf-only operation was invoked on a composite animator
    #[error("{kind} animators cannot {operation}")]
    UnsupportedOperation {
        operation: &'static str,
        kind: &'static str,
    },

    /// The animator is already registered with the scheduler
    #[error("Animator {id} is already allocated to the scheduler")]
    DuplicateRegistration { id: AnimatorId },

    /// A batch was enqueued for an animator that is not registered
    #[error("Animator {id} is not allocated to the scheduler")]
    MissingRegistration { id: AnimatorId },

    /// A configuration document could not be read
    #[error("Config error: {reason}")]
    Config { reason: String },
}

impl AnimatorError {
    /// Shorthand for [`AnimatorError::InvalidConfiguration`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } | Self::Config { .. } => "configuration",
            Self::UnsupportedOperation { .. } => "usage",
            Self::DuplicateRegistration { .. } | Self::MissingRegistration { .. } => "scheduler",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnimatorError>;
