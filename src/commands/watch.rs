//! Live dashboard
//! Usage: ninout-dash watch [--run NAME] [--step NAME]

use anyhow::Result;

use crate::config::DashConfig;
use crate::dashboard::{run_dashboard, Selection};

pub fn execute(config: &DashConfig, run: Option<String>, step: Option<String>) -> Result<()> {
    if run.is_none() && step.is_some() {
        tracing::warn!("--step given without --run, ignoring");
    }
    run_dashboard(config, Selection::new(run, step))
}
