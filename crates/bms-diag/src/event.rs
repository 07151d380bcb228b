//! Diagnostic identifiers, severities and handler status codes.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of the diagnostic event being reported.
///
/// Each identifier is owned by exactly one reporting module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum DiagId {
    /// Task deadline supervision detected a cycle-time or jitter violation.
    SystemMonitoring,
}

impl fmt::Display for DiagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagId::SystemMonitoring => write!(f, "System monitoring"),
        }
    }
}

/// Severity of a single report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiagEvent {
    /// The monitored condition is fine.
    Ok,
    /// The monitored condition is violated.
    NotOk,
    /// The reporting module asks the handler to forget previous reports.
    Reset,
}

impl DiagEvent {
    /// Returns true if this event reports a problem.
    #[must_use]
    pub fn is_fault(self) -> bool {
        matches!(self, DiagEvent::NotOk)
    }
}

impl fmt::Display for DiagEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagEvent::Ok => write!(f, "ok"),
            DiagEvent::NotOk => write!(f, "not ok"),
            DiagEvent::Reset => write!(f, "reset"),
        }
    }
}

/// Where the reported problem originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiagImpact {
    /// The whole controller is affected.
    System,
    /// Only one battery string is affected.
    String,
}

impl fmt::Display for DiagImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagImpact::System => write!(f, "system"),
            DiagImpact::String => write!(f, "string"),
        }
    }
}

/// Status returned by a diagnostic handler.
///
/// Reporters forward or log this value; they never branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiagHandlerReturn {
    /// The report was accepted.
    #[default]
    Ok,
    /// The report was accepted and pushed the event over its error threshold.
    ErrorOccurred,
    /// The handler does not know the identifier.
    WrongId,
    /// The handler does not know the event kind.
    UnknownEvent,
    /// The context word is out of range for the identifier.
    InvalidContext,
}

impl DiagHandlerReturn {
    /// Returns true for [`DiagHandlerReturn::Ok`].
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, DiagHandlerReturn::Ok)
    }
}

/// A single diagnostic report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagReport {
    /// Event identifier.
    pub id: DiagId,
    /// Severity.
    pub event: DiagEvent,
    /// Origin of the problem.
    pub impact: DiagImpact,
    /// Reporter-defined context word (e.g. the offending task id).
    pub data: u32,
}

impl DiagReport {
    /// Create a report.
    #[must_use]
    pub fn new(id: DiagId, event: DiagEvent, impact: DiagImpact, data: u32) -> Self {
        Self {
            id,
            event,
            impact,
            data,
        }
    }

    /// Create a [`DiagEvent::NotOk`] report.
    #[must_use]
    pub fn not_ok(id: DiagId, impact: DiagImpact, data: u32) -> Self {
        Self::new(id, DiagEvent::NotOk, impact, data)
    }
}

impl fmt::Display for DiagReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, data {})",
            self.id, self.event, self.impact, self.data
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ok_constructor() {
        let report = DiagReport::not_ok(DiagId::SystemMonitoring, DiagImpact::System, 4);
        assert_eq!(report.event, DiagEvent::NotOk);
        assert_eq!(report.impact, DiagImpact::System);
        assert_eq!(report.data, 4);
        assert!(report.event.is_fault());
    }

    #[test]
    fn test_report_display() {
        let report = DiagReport::not_ok(DiagId::SystemMonitoring, DiagImpact::System, 2);
        assert_eq!(report.to_string(), "System monitoring not ok (system, data 2)");
    }

    #[test]
    fn test_handler_return_default_is_ok() {
        assert!(DiagHandlerReturn::default().is_ok());
        assert!(!DiagHandlerReturn::ErrorOccurred.is_ok());
    }
}
