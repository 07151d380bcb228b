//! Error types for sysmon-sim

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Cannot read channel table {path}: {source}")]
    ChannelFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid channel table {path}: {source}")]
    ChannelParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] bms_sysmon::SysMonError),

    #[error("FRAM image error: {0}")]
    Fram(#[from] bms_sysmon::FramError),

    #[error("Simulation thread panicked: {0}")]
    ThreadPanicked(&'static str),
}

impl SimError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SimError::ChannelFile { .. } | SimError::ChannelParse { .. } => 3,
            SimError::InvalidConfiguration(_) => 4,
            SimError::Fram(_) => 5,
            SimError::ThreadPanicked(_) => 1,
        }
    }
}
