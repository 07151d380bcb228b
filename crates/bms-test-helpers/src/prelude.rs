//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use bms_test_helpers::prelude::*;
//! ```

pub use crate::{assert_escalations, assert_fatal, assert_no_fatal};

#[cfg(feature = "mock")]
pub use crate::mock::{MockDiag, MockFram, MockOs, RecordingFatalHandler};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
