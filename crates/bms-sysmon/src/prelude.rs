//! Prelude for bms-sysmon.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! ```rust
//! use bms_sysmon::prelude::*;
//!
//! let table = ChannelTable::controller_default();
//! assert_eq!(table.len(), MAX_TASKS);
//! assert_eq!(tick_delta(u32::MAX, 100), 101);
//! ```

pub use crate::config::{ChannelConfig, ChannelConfigBuilder, ChannelSpec, ChannelTable, HandlingAction};
pub use crate::error::{SysMonError, SysMonResult};
pub use crate::fatal::{ContractViolation, FatalHandler, HaltOnViolation};
pub use crate::fram::{FramBlockId, FramError, FramResult, FramStore};
pub use crate::monitor::{CheckSummary, SystemMonitor};
pub use crate::notification::{Notification, TaskPhase, tick_delta};
pub use crate::os::OsInterface;
pub use crate::record::{ViolationRecord, ViolationResponse};
pub use crate::task::{MAX_TASKS, NotifyEvent, TaskId};
