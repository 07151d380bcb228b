//! Shared test utilities for the BMS supervisor crates.
//!
//! # Modules
//!
//! - [`mock`] - Recording implementations of every supervisor collaborator
//! - [`assertions`] - Assertion macros for the fatal path and escalations
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! bms-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use bms_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::panic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assertions;
pub mod prelude;

#[cfg(feature = "mock")]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;
