//! The diagnostic handler trait.

use crate::event::{DiagHandlerReturn, DiagReport};

/// Receiver of diagnostic reports.
///
/// Implementations decide whether a report is debounced, counted, logged or
/// escalated into a safety action.
///
/// # Real-Time Safety
///
/// `handle` is called from real-time task contexts. Implementations must not
/// block or allocate.
pub trait DiagHandler: Send + Sync {
    /// Process one report and return the handler status.
    fn handle(&self, report: DiagReport) -> DiagHandlerReturn;
}

impl<T: DiagHandler + ?Sized> DiagHandler for &T {
    fn handle(&self, report: DiagReport) -> DiagHandlerReturn {
        (**self).handle(report)
    }
}

#[cfg(feature = "std")]
impl<T: DiagHandler + ?Sized> DiagHandler for std::sync::Arc<T> {
    fn handle(&self, report: DiagReport) -> DiagHandlerReturn {
        (**self).handle(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DiagId, DiagImpact};
    use core::sync::atomic::{AtomicU32, Ordering};

    struct LastData(AtomicU32);

    impl DiagHandler for LastData {
        fn handle(&self, report: DiagReport) -> DiagHandlerReturn {
            self.0.store(report.data, Ordering::Relaxed);
            DiagHandlerReturn::ErrorOccurred
        }
    }

    #[test]
    fn test_reference_forwards() {
        let handler = LastData(AtomicU32::new(0));
        let by_ref: &dyn DiagHandler = &handler;
        let status = (&by_ref).handle(DiagReport::not_ok(
            DiagId::SystemMonitoring,
            DiagImpact::System,
            7,
        ));
        assert_eq!(status, DiagHandlerReturn::ErrorOccurred);
        assert_eq!(handler.0.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn test_trait_bounds() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn DiagHandler>();
    }
}
