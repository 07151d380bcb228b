//! Diagnostic escalation contract for the BMS controller.
//!
//! Monitoring modules never decide how a detected problem is handled. They
//! report it to a [`DiagHandler`] with an event identifier, a severity, the
//! origin of the problem and a context word, and carry on. Interpretation,
//! debouncing and any resulting safety action (opening contactors, entering
//! an error state) belong to the handler implementation.
//!
//! # RT-Safety
//!
//! Every type in this crate is `Copy` and allocation-free, so reports can be
//! raised from real-time task contexts.
//!
//! # Example
//!
//! ```rust
//! use bms_diag::prelude::*;
//!
//! struct CountingHandler(core::sync::atomic::AtomicU32);
//!
//! impl DiagHandler for CountingHandler {
//!     fn handle(&self, report: DiagReport) -> DiagHandlerReturn {
//!         if report.event == DiagEvent::NotOk {
//!             self.0.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
//!         }
//!         DiagHandlerReturn::Ok
//!     }
//! }
//!
//! let handler = CountingHandler(core::sync::atomic::AtomicU32::new(0));
//! let status = handler.handle(DiagReport::not_ok(DiagId::SystemMonitoring, DiagImpact::System, 3));
//! assert!(status.is_ok());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod event;
mod handler;

pub mod prelude;

pub use event::{DiagEvent, DiagHandlerReturn, DiagId, DiagImpact, DiagReport};
pub use handler::DiagHandler;
