//! sysmon-sim - BMS task deadline supervisor simulator
//!
//! Runs the controller's periodic tasks as host threads, supervises them
//! with the deadline monitor and keeps the violation record in a JSON
//! FRAM image.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod diag;
mod error;
mod fram;
mod os;
mod output;
mod sim;

use anyhow::{Context, Result};
use bms_sysmon::{ChannelSpec, ChannelTable, SystemMonitor, TaskId};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::diag::LoggingDiag;
use crate::error::SimError;
use crate::fram::JsonFileFram;
use crate::os::SimulatedOs;
use crate::sim::{SimConfig, Stall};

#[derive(Parser)]
#[command(name = "sysmon-sim")]
#[command(about = "Simulate BMS real-time tasks under deadline supervision")]
#[command(version)]
struct Cli {
    /// Output in JSON format for machine parsing
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the periodic tasks and the checker
    Run(RunArgs),

    /// Show the violations stored in a FRAM image
    Show {
        /// FRAM image file
        #[arg(long)]
        fram: PathBuf,
    },

    /// Clear the violations stored in a FRAM image
    Clear {
        /// FRAM image file
        #[arg(long)]
        fram: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Simulated run time in milliseconds
    #[arg(long, default_value_t = 2000)]
    duration_ms: u64,

    /// Tick value at start; use a value near u32::MAX to exercise wraparound
    #[arg(long, default_value_t = 0)]
    start_tick: u32,

    /// Channel table as a JSON array (controller defaults when omitted)
    #[arg(long)]
    channels: Option<PathBuf>,

    /// FRAM image file to restore from and persist to
    #[arg(long)]
    fram: Option<PathBuf>,

    /// Interval between deadline checks in milliseconds
    #[arg(long, default_value_t = 1)]
    check_period_ms: u64,

    /// Minimum interval between FRAM writes in milliseconds
    #[arg(long, default_value_t = 100)]
    persist_every_ms: u64,

    /// Task to stall once
    #[arg(long, value_enum)]
    stall: Option<TaskArg>,

    /// Delay before the stall in milliseconds
    #[arg(long, default_value_t = 500, requires = "stall")]
    stall_after_ms: u64,

    /// Length of the stall in milliseconds
    #[arg(long, default_value_t = 300, requires = "stall")]
    stall_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TaskArg {
    Engine,
    #[value(name = "1ms")]
    Cyclic1ms,
    #[value(name = "10ms")]
    Cyclic10ms,
    #[value(name = "100ms")]
    Cyclic100ms,
    #[value(name = "100ms-algorithm")]
    CyclicAlgorithm100ms,
}

impl From<TaskArg> for TaskId {
    fn from(arg: TaskArg) -> Self {
        match arg {
            TaskArg::Engine => TaskId::Engine,
            TaskArg::Cyclic1ms => TaskId::Cyclic1ms,
            TaskArg::Cyclic10ms => TaskId::Cyclic10ms,
            TaskArg::Cyclic100ms => TaskId::Cyclic100ms,
            TaskArg::CyclicAlgorithm100ms => TaskId::CyclicAlgorithm100ms,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("sysmon_sim={log_level},bms_sysmon={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let code = e
                .downcast_ref::<SimError>()
                .map_or(1, SimError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Run(args) => run(args, cli.json),
        Commands::Show { fram } => show(fram, cli.json),
        Commands::Clear { fram } => clear(fram, cli.json),
    }
}

fn run(args: &RunArgs, json: bool) -> Result<()> {
    let table = match &args.channels {
        Some(path) => load_channels(path)?,
        None => ChannelTable::controller_default(),
    };

    let config = SimConfig {
        duration: Duration::from_millis(args.duration_ms),
        start_tick: args.start_tick,
        check_period: Duration::from_millis(args.check_period_ms),
        persist_every: Duration::from_millis(args.persist_every_ms),
        stall: args.stall.map(|task| Stall {
            task: task.into(),
            after: Duration::from_millis(args.stall_after_ms),
            length: Duration::from_millis(args.stall_ms),
        }),
    };

    let mut fram = args.fram.as_ref().map(JsonFileFram::new);
    let report = sim::run(table, &config, fram.as_mut()).context("Simulation failed")?;
    output::print_report(&report, json);
    Ok(())
}

fn load_channels(path: &Path) -> Result<ChannelTable, SimError> {
    let text = std::fs::read_to_string(path).map_err(|source| SimError::ChannelFile {
        path: path.to_path_buf(),
        source,
    })?;
    let specs: Vec<ChannelSpec> =
        serde_json::from_str(&text).map_err(|source| SimError::ChannelParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(ChannelTable::from_specs(specs)?)
}

fn offline_monitor() -> SystemMonitor<SimulatedOs, LoggingDiag> {
    SystemMonitor::new(
        ChannelTable::controller_default(),
        SimulatedOs::new(0),
        LoggingDiag::new(),
    )
}

fn show(path: &Path, json: bool) -> Result<()> {
    let monitor = offline_monitor();
    let mut fram = JsonFileFram::new(path);
    monitor
        .restore_from_fram(&mut fram)
        .map_err(SimError::from)
        .with_context(|| format!("Cannot load violation record from {}", path.display()))?;

    output::print_violations(
        &monitor.recorded_timing_violations(),
        &monitor.violation_record(),
        json,
    );
    Ok(())
}

fn clear(path: &Path, json: bool) -> Result<()> {
    let monitor = offline_monitor();
    let mut fram = JsonFileFram::new(path);
    monitor
        .clear_all_timing_violations(&mut fram)
        .map_err(SimError::from)
        .with_context(|| format!("Cannot clear violation record in {}", path.display()))?;

    output::print_violations(
        &monitor.recorded_timing_violations(),
        &monitor.violation_record(),
        json,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_run_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["sysmon-sim", "run"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        let Commands::Run(args) = cli.command else {
            return Err("expected run command".into());
        };
        assert_eq!(args.duration_ms, 2000);
        assert_eq!(args.start_tick, 0);
        assert!(args.stall.is_none());
        assert!(args.fram.is_none());
        Ok(())
    }

    #[test]
    fn parse_stall_task_names() -> TestResult {
        let cli = Cli::try_parse_from([
            "sysmon-sim",
            "-vv",
            "run",
            "--stall",
            "100ms-algorithm",
            "--stall-ms",
            "50",
        ])?;
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            return Err("expected run command".into());
        };
        assert_eq!(args.stall.map(TaskId::from), Some(TaskId::CyclicAlgorithm100ms));
        assert_eq!(args.stall_ms, 50);
        Ok(())
    }

    #[test]
    fn parse_stall_options_require_task() {
        let result = Cli::try_parse_from(["sysmon-sim", "run", "--stall-ms", "50"]);
        assert!(matches!(result, Err(ref err) if err.kind() == clap::error::ErrorKind::MissingRequiredArgument));
    }

    #[test]
    fn parse_show_requires_fram() {
        let result = Cli::try_parse_from(["sysmon-sim", "show"]);
        assert!(matches!(result, Err(ref err) if err.kind() == clap::error::ErrorKind::MissingRequiredArgument));
    }

    #[test]
    fn load_channels_reports_parse_errors() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("channels.json");
        std::fs::write(&path, r#"[{"task": "Engine"}]"#)?;

        let result = load_channels(&path);
        assert!(matches!(result, Err(SimError::ChannelParse { .. })));
        Ok(())
    }

    #[test]
    fn load_channels_rejects_duplicates() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("channels.json");
        std::fs::write(
            &path,
            r#"[{"task": "Engine", "cycle_time": 1}, {"task": "Engine", "cycle_time": 2}]"#,
        )?;

        let result = load_channels(&path);
        assert!(matches!(result, Err(SimError::InvalidConfiguration(_))));
        Ok(())
    }
}
