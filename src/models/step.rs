use serde::{Deserialize, Serialize};

/// Execution status of a step as reported by the pipeline engine.
///
/// The engine only emits the five known statuses, but the dashboard must
/// keep rendering if a newer engine reports something else. Unrecognised
/// values are kept verbatim in `Unknown` and styled like `Pending`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Done,
    Failed,
    Skipped,
    Unknown(String),
}

impl StepStatus {
    /// Wire representation, as the engine spells it.
    pub fn as_str(&self) -> &str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Done => "done",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
            StepStatus::Unknown(raw) => raw.as_str(),
        }
    }
}

impl From<String> for StepStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => StepStatus::Pending,
            "running" => StepStatus::Running,
            "done" => StepStatus::Done,
            "failed" => StepStatus::Failed,
            "skipped" => StepStatus::Skipped,
            _ => StepStatus::Unknown(raw),
        }
    }
}

impl From<StepStatus> for String {
    fn from(status: StepStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a run's DAG, with its runtime metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step_name: String,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default)]
    pub duration_ms: Option<f64>,
    #[serde(default)]
    pub input_lines: Option<u64>,
    #[serde(default)]
    pub output_lines: Option<u64>,
    #[serde(default)]
    pub throughput_in_lps: Option<f64>,
    #[serde(default)]
    pub throughput_out_lps: Option<f64>,
    /// Names of the steps this step depends on.
    #[serde(default)]
    pub deps: Vec<String>,
    /// Subset of `deps` that is currently inactive.
    #[serde(default)]
    pub disabled_deps: Vec<String>,
    /// The dependency whose boolean outcome gates this step, if any.
    #[serde(default)]
    pub when_name: Option<String>,
    #[serde(default)]
    pub condition_bool: Option<bool>,
    #[serde(default)]
    pub disabled_self: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default)]
    pub is_branch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            step_name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style helper used by fixtures and tests.
    pub fn with_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: StepStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_dep_disabled(&self, dep: &str) -> bool {
        self.disabled_deps.iter().any(|d| d == dep)
    }
}
