//! Error types for the supervisor.
//!
//! Only recoverable conditions are represented here. Contract violations take
//! the abort path in [`crate::fatal`] and timing violations are reported
//! through the diagnostic handler; neither is an error value.

use thiserror::Error;

use crate::fram::FramError;
use crate::task::{MAX_TASKS, TaskId};

/// Errors that can occur while configuring or persisting the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SysMonError {
    /// Invalid channel configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Two channels monitor the same task.
    #[error("Task {0} is configured more than once")]
    DuplicateChannel(TaskId),

    /// More channels than notification slots.
    #[error("{count} channels configured, at most {max} supported", max = MAX_TASKS)]
    TooManyChannels {
        /// Number of channels supplied.
        count: usize,
    },

    /// Storage engine failure.
    #[error(transparent)]
    Fram(#[from] FramError),
}

impl SysMonError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// A specialized `Result` type for supervisor operations.
pub type SysMonResult<T> = std::result::Result<T, SysMonError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fram::FramBlockId;

    #[test]
    fn test_error_display() {
        let err = SysMonError::DuplicateChannel(TaskId::Cyclic10ms);
        assert!(err.to_string().contains("10ms"));

        let err = SysMonError::TooManyChannels { count: 6 };
        assert!(err.to_string().contains('6'));
    }

    #[test]
    fn test_fram_error_converts() {
        let err: SysMonError = FramError::BlockEmpty(FramBlockId::SysMonRecord).into();
        assert!(matches!(err, SysMonError::Fram(_)));
    }
}
