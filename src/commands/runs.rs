//! Run listing
//! Usage: ninout-dash runs

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};

use crate::api::RunSource;
use crate::config::DashConfig;
use crate::models::{RunSummary, StepStatus};

/// Status word colored like the dashboard.
pub fn status_colored(status: &str) -> ColoredString {
    match StepStatus::from(status.to_string()) {
        StepStatus::Done => status.green(),
        StepStatus::Running => status.blue().bold(),
        StepStatus::Failed => status.red().bold(),
        StepStatus::Skipped => status.yellow(),
        StepStatus::Pending | StepStatus::Unknown(_) => status.white().dimmed(),
    }
}

fn format_status_summary(run: &RunSummary) -> String {
    run.status_summary
        .iter()
        .map(|(status, count)| format!("{}={count}", status_colored(status)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human-readable listing of runs, one per line.
pub fn format_runs(runs: &[RunSummary]) -> String {
    if runs.is_empty() {
        return "(no runs found)".dimmed().to_string();
    }

    let name_width = runs
        .iter()
        .map(|r| r.label().chars().count())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for run in runs {
        let label = format!("{:<name_width$}", run.label());
        let mut line = format!(
            "{}  {}  {}  {} steps",
            label.bold(),
            run.run_id.dimmed(),
            run.created_at_utc,
            run.step_count
        );
        let summary = format_status_summary(run);
        if !summary.is_empty() {
            line.push_str("  ");
            line.push_str(&summary);
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

pub fn execute(config: &DashConfig) -> Result<()> {
    let client = super::client(config)?;
    let runs = client.list_runs().context("Failed to list runs")?;
    println!("{}", format_runs(&runs).trim_end());
    Ok(())
}
