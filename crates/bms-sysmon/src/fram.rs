//! Contract of the non-volatile storage engine.
//!
//! The supervisor does not know how a block is laid out in FRAM. It hands the
//! logical [`ViolationRecord`] to a [`FramStore`] under a fixed block id and
//! forwards whatever status the store reports. There is no retry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::ViolationRecord;

/// FRAM block identifiers used by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FramBlockId {
    /// Persisted copy of the violation record.
    SysMonRecord,
}

impl core::fmt::Display for FramBlockId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FramBlockId::SysMonRecord => write!(f, "sys-mon-record"),
        }
    }
}

/// Errors reported by a storage engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramError {
    /// Writing the block failed.
    #[error("writing FRAM block {block} failed: {reason}")]
    WriteFailed {
        /// The block being written.
        block: FramBlockId,
        /// Engine-specific reason.
        reason: String,
    },

    /// Reading the block failed.
    #[error("reading FRAM block {block} failed: {reason}")]
    ReadFailed {
        /// The block being read.
        block: FramBlockId,
        /// Engine-specific reason.
        reason: String,
    },

    /// The block has never been written.
    #[error("FRAM block {0} is empty")]
    BlockEmpty(FramBlockId),
}

impl FramError {
    /// Create a write failure.
    #[must_use]
    pub fn write_failed(block: FramBlockId, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            block,
            reason: reason.into(),
        }
    }

    /// Create a read failure.
    #[must_use]
    pub fn read_failed(block: FramBlockId, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            block,
            reason: reason.into(),
        }
    }
}

/// A specialized `Result` type for storage operations.
pub type FramResult<T> = core::result::Result<T, FramError>;

/// Storage engine holding the persisted violation record.
pub trait FramStore {
    /// Persist `record` under `block`.
    ///
    /// # Errors
    ///
    /// Returns the engine's write failure.
    fn write(&mut self, block: FramBlockId, record: &ViolationRecord) -> FramResult<()>;

    /// Load the record stored under `block`.
    ///
    /// # Errors
    ///
    /// Returns [`FramError::BlockEmpty`] if nothing was stored yet, or the
    /// engine's read failure.
    fn read(&mut self, block: FramBlockId) -> FramResult<ViolationRecord>;
}

impl<T: FramStore + ?Sized> FramStore for &mut T {
    fn write(&mut self, block: FramBlockId, record: &ViolationRecord) -> FramResult<()> {
        (**self).write(block, record)
    }

    fn read(&mut self, block: FramBlockId) -> FramResult<ViolationRecord> {
        (**self).read(block)
    }
}
