//! The abort path for contract violations.
//!
//! Calling the supervisor with an out-of-range task id, an unknown event kind
//! or a missing argument is a defect in the caller. Such calls never return an
//! error value: they are routed to a [`FatalHandler`] which, on the
//! controller, halts execution. Tests install a handler that records the
//! violation instead, so assertion-triggering inputs can be checked without
//! terminating the test process.
//!
//! No supervisor state is mutated on a call that reaches the abort path.

use core::panic::Location;
use thiserror::Error;

/// A broken precondition of the supervisor API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ContractViolation {
    /// Task number at or above `MAX_TASKS`.
    #[error("task id {raw} is outside the notification registry")]
    InvalidTaskId {
        /// The rejected task number.
        raw: u8,
    },

    /// Event code that is neither enter nor exit.
    #[error("notification event {raw} is neither enter nor exit")]
    InvalidEventKind {
        /// The rejected event code.
        raw: u8,
    },

    /// Record copy called without a source.
    #[error("violation record copy has no source")]
    MissingCopySource,

    /// Record copy called without a destination.
    #[error("violation record copy has no destination")]
    MissingCopyDestination,

    /// Violation query called without a response destination.
    #[error("violation query has no response destination")]
    MissingResponse,
}

/// Receiver of contract violations.
pub trait FatalHandler: Send + Sync {
    /// Report a contract violation detected at `location`.
    ///
    /// Production handlers do not return.
    fn contract_violated(&self, violation: ContractViolation, location: &'static Location<'static>);
}

impl<T: FatalHandler + ?Sized> FatalHandler for &T {
    fn contract_violated(&self, violation: ContractViolation, location: &'static Location<'static>) {
        (**self).contract_violated(violation, location);
    }
}

impl<T: FatalHandler + ?Sized> FatalHandler for std::sync::Arc<T> {
    fn contract_violated(&self, violation: ContractViolation, location: &'static Location<'static>) {
        (**self).contract_violated(violation, location);
    }
}

/// Handler used on the controller: halt on the first violation.
///
/// The release profile is built with `panic = "abort"`, so the panic raised
/// here stops the controller after the panic message has been reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct HaltOnViolation;

impl FatalHandler for HaltOnViolation {
    /// # Panics
    ///
    /// Always.
    #[expect(clippy::panic, reason = "contract violations halt the controller")]
    fn contract_violated(&self, violation: ContractViolation, location: &'static Location<'static>) {
        panic!("contract violation at {location}: {violation}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display() {
        let violation = ContractViolation::InvalidTaskId { raw: 6 };
        assert!(violation.to_string().contains('6'));

        let violation = ContractViolation::InvalidEventKind { raw: 127 };
        assert!(violation.to_string().contains("127"));
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_halt_handler_panics() {
        HaltOnViolation.contract_violated(ContractViolation::MissingResponse, Location::caller());
    }
}
