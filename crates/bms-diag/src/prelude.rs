//! Prelude for convenient imports.
//!
//! ```rust
//! use bms_diag::prelude::*;
//! ```

pub use crate::{DiagEvent, DiagHandler, DiagHandlerReturn, DiagId, DiagImpact, DiagReport};
