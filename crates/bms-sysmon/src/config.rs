//! Channel configuration: which tasks are supervised and how.
//!
//! A channel pairs one monitored task with its timing budget and the handling
//! applied when the budget is exceeded. The table is fixed when the monitor is
//! built; nothing in it changes at runtime.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{SysMonError, SysMonResult};
use crate::task::{MAX_TASKS, TaskId};

/// Callback invoked with the offending task after a violation was escalated.
pub type ViolationCallback = Arc<dyn Fn(TaskId) + Send + Sync>;

/// Safety action tag attached to a channel.
///
/// The tag is carried into the violation log; acting on it is up to the
/// diagnostic handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HandlingAction {
    /// Report only.
    #[default]
    None,
    /// Open the main contactors.
    SwitchOffContactor,
}

/// Configuration of one supervised task.
#[derive(Clone)]
pub struct ChannelConfig {
    /// The supervised task.
    pub task: TaskId,
    /// Disabled channels are never evaluated.
    pub enabled: bool,
    /// Expected period in ticks.
    pub cycle_time: u32,
    /// Allowed lateness on top of the period, in ticks.
    pub max_jitter: u32,
    /// Store violations in the persisted record.
    pub recording_enabled: bool,
    /// Action tag reported with violations.
    pub handling_action: HandlingAction,
    /// Optional per-channel callback.
    pub callback: Option<ViolationCallback>,
}

impl ChannelConfig {
    /// Configuration used on the controller for `task`.
    ///
    /// | task | cycle | jitter |
    /// |---|---|---|
    /// | engine | 1 | 1 |
    /// | 1 ms | 1 | 1 |
    /// | 10 ms | 10 | 2 |
    /// | 100 ms | 100 | 5 |
    /// | 100 ms algorithm | 100 | 5 |
    #[must_use]
    pub fn controller_default(task: TaskId) -> Self {
        let (cycle_time, max_jitter) = match task {
            TaskId::Engine | TaskId::Cyclic1ms => (1, 1),
            TaskId::Cyclic10ms => (10, 2),
            TaskId::Cyclic100ms | TaskId::CyclicAlgorithm100ms => (100, 5),
        };
        Self {
            task,
            enabled: true,
            cycle_time,
            max_jitter,
            recording_enabled: true,
            handling_action: HandlingAction::SwitchOffContactor,
            callback: None,
        }
    }

    /// Create a builder seeded with [`ChannelConfig::controller_default`].
    #[must_use]
    pub fn builder(task: TaskId) -> ChannelConfigBuilder {
        ChannelConfigBuilder {
            config: Self::controller_default(task),
        }
    }

    /// Largest elapsed time since enter that is not a violation.
    #[must_use]
    pub fn deadline(&self) -> u32 {
        self.cycle_time.saturating_add(self.max_jitter)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an enabled channel has a zero cycle time.
    pub fn validate(&self) -> SysMonResult<()> {
        if self.enabled && self.cycle_time == 0 {
            return Err(SysMonError::invalid_configuration(format!(
                "cycle_time of enabled task {} must be greater than 0",
                self.task
            )));
        }
        Ok(())
    }
}

impl core::fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("task", &self.task)
            .field("enabled", &self.enabled)
            .field("cycle_time", &self.cycle_time)
            .field("max_jitter", &self.max_jitter)
            .field("recording_enabled", &self.recording_enabled)
            .field("handling_action", &self.handling_action)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Builder for `ChannelConfig`.
#[derive(Debug)]
pub struct ChannelConfigBuilder {
    config: ChannelConfig,
}

impl ChannelConfigBuilder {
    /// Enable or disable supervision.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Set the expected period in ticks.
    #[must_use]
    pub fn cycle_time(mut self, ticks: u32) -> Self {
        self.config.cycle_time = ticks;
        self
    }

    /// Set the allowed jitter in ticks.
    #[must_use]
    pub fn max_jitter(mut self, ticks: u32) -> Self {
        self.config.max_jitter = ticks;
        self
    }

    /// Enable or disable recording into the persisted record.
    #[must_use]
    pub fn recording_enabled(mut self, enabled: bool) -> Self {
        self.config.recording_enabled = enabled;
        self
    }

    /// Set the action tag.
    #[must_use]
    pub fn handling_action(mut self, action: HandlingAction) -> Self {
        self.config.handling_action = action;
        self
    }

    /// Attach a violation callback.
    #[must_use]
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(TaskId) + Send + Sync + 'static,
    {
        self.config.callback = Some(Arc::new(callback));
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> SysMonResult<ChannelConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Serializable form of a channel, used to load tables from files.
///
/// Callbacks cannot be expressed here; attach them with the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelSpec {
    /// The supervised task.
    pub task: TaskId,
    /// Disabled channels are never evaluated.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Expected period in ticks.
    pub cycle_time: u32,
    /// Allowed lateness in ticks.
    #[serde(default)]
    pub max_jitter: u32,
    /// Store violations in the persisted record.
    #[serde(default = "default_true")]
    pub recording_enabled: bool,
    /// Action tag.
    #[serde(default)]
    pub handling_action: HandlingAction,
}

fn default_true() -> bool {
    true
}

impl From<ChannelSpec> for ChannelConfig {
    fn from(spec: ChannelSpec) -> Self {
        Self {
            task: spec.task,
            enabled: spec.enabled,
            cycle_time: spec.cycle_time,
            max_jitter: spec.max_jitter,
            recording_enabled: spec.recording_enabled,
            handling_action: spec.handling_action,
            callback: None,
        }
    }
}

/// The validated, ordered set of channels.
///
/// Channels are evaluated in the order given here.
#[derive(Debug, Clone)]
pub struct ChannelTable {
    channels: Vec<ChannelConfig>,
}

impl ChannelTable {
    /// Create a table.
    ///
    /// # Errors
    ///
    /// Returns an error if more than [`MAX_TASKS`] channels are given, if a
    /// task appears twice, or if a channel fails validation.
    pub fn new(channels: Vec<ChannelConfig>) -> SysMonResult<Self> {
        if channels.len() > MAX_TASKS {
            return Err(SysMonError::TooManyChannels {
                count: channels.len(),
            });
        }
        for (position, channel) in channels.iter().enumerate() {
            channel.validate()?;
            if channels
                .iter()
                .take(position)
                .any(|earlier| earlier.task == channel.task)
            {
                return Err(SysMonError::DuplicateChannel(channel.task));
            }
        }
        Ok(Self { channels })
    }

    /// Create a table from serializable channel specs.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ChannelTable::new`].
    pub fn from_specs(specs: impl IntoIterator<Item = ChannelSpec>) -> SysMonResult<Self> {
        Self::new(specs.into_iter().map(ChannelConfig::from).collect())
    }

    /// The table built into the controller: every task supervised with
    /// [`ChannelConfig::controller_default`].
    #[must_use]
    pub fn controller_default() -> Self {
        Self {
            channels: TaskId::ALL
                .into_iter()
                .map(ChannelConfig::controller_default)
                .collect(),
        }
    }

    /// Iterate channels in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &ChannelConfig> {
        self.channels.iter()
    }

    /// Channel supervising `task`, if configured.
    #[must_use]
    pub fn get(&self, task: TaskId) -> Option<&ChannelConfig> {
        self.channels.iter().find(|channel| channel.task == task)
    }

    /// Number of configured channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True if no channel is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::controller_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_default_table() {
        let table = ChannelTable::controller_default();
        assert_eq!(table.len(), MAX_TASKS);

        let ten_ms = table.get(TaskId::Cyclic10ms);
        assert!(ten_ms.is_some());
        if let Some(channel) = ten_ms {
            assert_eq!(channel.cycle_time, 10);
            assert_eq!(channel.max_jitter, 2);
            assert_eq!(channel.deadline(), 12);
            assert!(channel.enabled);
            assert!(channel.recording_enabled);
            assert_eq!(channel.handling_action, HandlingAction::SwitchOffContactor);
        }
    }

    #[test]
    fn test_builder() -> SysMonResult<()> {
        let channel = ChannelConfig::builder(TaskId::Engine)
            .cycle_time(10)
            .max_jitter(1)
            .recording_enabled(false)
            .handling_action(HandlingAction::None)
            .callback(|_task| {})
            .build()?;
        assert_eq!(channel.cycle_time, 10);
        assert_eq!(channel.max_jitter, 1);
        assert!(!channel.recording_enabled);
        assert!(channel.callback.is_some());
        Ok(())
    }

    #[test]
    fn test_zero_cycle_time_rejected_only_when_enabled() {
        let enabled = ChannelConfig::builder(TaskId::Engine).cycle_time(0).build();
        assert!(matches!(enabled, Err(SysMonError::InvalidConfiguration(_))));

        let disabled = ChannelConfig::builder(TaskId::Engine)
            .cycle_time(0)
            .enabled(false)
            .build();
        assert!(matches!(disabled, Ok(ChannelConfig { enabled: false, .. })));
    }

    #[test]
    fn test_deadline_saturates() {
        let channel = ChannelConfig {
            cycle_time: u32::MAX,
            max_jitter: 10,
            ..ChannelConfig::controller_default(TaskId::Engine)
        };
        assert_eq!(channel.deadline(), u32::MAX);
    }

    #[test]
    fn test_duplicate_task_rejected() {
        let result = ChannelTable::new(vec![
            ChannelConfig::controller_default(TaskId::Engine),
            ChannelConfig::controller_default(TaskId::Cyclic1ms),
            ChannelConfig::controller_default(TaskId::Engine),
        ]);
        assert!(matches!(
            result,
            Err(SysMonError::DuplicateChannel(TaskId::Engine))
        ));
    }

    #[test]
    fn test_too_many_channels_rejected() {
        let mut channels: Vec<_> = TaskId::ALL
            .into_iter()
            .map(ChannelConfig::controller_default)
            .collect();
        channels.push(ChannelConfig::controller_default(TaskId::Engine));
        let result = ChannelTable::new(channels);
        assert!(matches!(
            result,
            Err(SysMonError::TooManyChannels { count: 6 })
        ));
    }

    #[test]
    fn test_spec_defaults() -> Result<(), serde_json::Error> {
        let spec: ChannelSpec = serde_json::from_str(r#"{"task":"Cyclic100ms","cycle_time":100}"#)?;
        assert!(spec.enabled);
        assert!(spec.recording_enabled);
        assert_eq!(spec.max_jitter, 0);
        assert_eq!(spec.handling_action, HandlingAction::None);

        let config = ChannelConfig::from(spec);
        assert!(config.callback.is_none());
        Ok(())
    }

    #[test]
    fn test_spec_rejects_unknown_fields() {
        let result: Result<ChannelSpec, _> =
            serde_json::from_str(r#"{"task":"Engine","cycle_time":1,"period":3}"#);
        assert!(matches!(result, Err(ref err) if err.is_data()));
    }
}
