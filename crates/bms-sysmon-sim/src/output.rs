//! Output formatting for sysmon-sim

use anyhow::Error;
use bms_sysmon::{TaskId, ViolationRecord, ViolationResponse};
use colored::Colorize;
use serde_json::json;

use crate::sim::SimReport;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "chain": error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

/// Print a simulation report
pub fn print_report(report: &SimReport, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "report": report,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format report as JSON: {e}"),
        }
        return;
    }

    println!("{}", "Simulation finished".bold());
    println!(
        "  ticks {} -> {} ({} checks)",
        report.start_tick, report.end_tick, report.checks
    );
    println!("  {}", "Escalations:".bold());
    for entry in &report.escalations {
        let count = if entry.escalations == 0 {
            entry.escalations.to_string().green()
        } else {
            entry.escalations.to_string().red()
        };
        println!("    {:<16} {}", entry.task.as_str(), count);
    }
    print_violations_human(&report.violations, &report.record);
    if report.persisted {
        println!("  {}", "Violation record persisted".dimmed());
    }
}

/// Print the persisted violation state
pub fn print_violations(response: &ViolationResponse, record: &ViolationRecord, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "violations": response,
            "record": record,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format violations as JSON: {e}"),
        }
    } else {
        print_violations_human(response, record);
    }
}

fn print_violations_human(response: &ViolationResponse, record: &ViolationRecord) {
    if !response.recorded_violation_any {
        println!("  {}", "No timing violation recorded".green());
        return;
    }

    println!("  {}", "Recorded timing violations:".red().bold());
    for task in TaskId::ALL {
        if response.for_task(task) {
            let category = record.category(task);
            println!(
                "    {:<16} enter tick {}, {} ticks elapsed",
                task.as_str(),
                category.enter_timestamp,
                category.violating_duration
            );
        }
    }
}
