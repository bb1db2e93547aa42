//! Row page of one step
//! Usage: ninout-dash rows <RUN> <STEP>

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::{RowWindow, RunSource};
use crate::config::DashConfig;
use crate::row_table::RowTable;

pub fn execute(config: &DashConfig, run_name: &str, step_name: &str) -> Result<()> {
    let client = super::client(config)?;
    let window = RowWindow {
        limit: config.row_limit,
        offset: 0,
    };
    let page = client
        .get_step_rows(run_name, step_name, window)
        .with_context(|| format!("Failed to fetch rows for '{run_name}/{step_name}'"))?;

    let table = RowTable::build(step_name, &page);
    let text = table.to_text();
    let mut lines = text.lines();

    if let Some(header) = lines.next() {
        println!("{}", header.bold());
    }
    for line in lines {
        println!("{line}");
    }

    Ok(())
}
