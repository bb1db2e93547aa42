use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::step::Step;

/// Entry of `GET /api/runs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_name: String,
    #[serde(default)]
    pub dag_name: String,
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub created_at_utc: String,
    #[serde(default)]
    pub step_count: usize,
    /// Step count per status, when the server provides it.
    #[serde(default)]
    pub status_summary: BTreeMap<String, usize>,
}

impl RunSummary {
    /// Label used by the run list: `run_name (dag_name)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.run_name, self.dag_name)
    }
}

/// Full snapshot of one run, as returned by `GET /api/runs/{run_name}`.
///
/// A newer fetch always yields a wholly new value; runs are never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub run_name: String,
    #[serde(default)]
    pub dag_name: String,
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub created_at_utc: String,
    #[serde(default)]
    pub step_count: usize,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Run {
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.step_name == name)
    }

    pub fn has_step(&self, name: &str) -> bool {
        self.step(name).is_some()
    }
}
