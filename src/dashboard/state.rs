//! State types for the dashboard.

use chrono::{DateTime, Local};

use super::widgets::{format_count, format_metric};
use crate::graph::Scene;
use crate::models::{Run, StepStatus};
use crate::row_table::RowTable;

/// Which run and step the user is looking at.
///
/// Transitions produce a new value; the controller swaps it in whole so a
/// cycle never observes a half-updated selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    run: Option<String>,
    step: Option<String>,
}

impl Selection {
    pub fn new(run: Option<String>, step: Option<String>) -> Self {
        // A step is only meaningful inside a run.
        let step = if run.is_some() { step } else { None };
        Self { run, step }
    }

    pub fn run(&self) -> Option<&str> {
        self.run.as_deref()
    }

    pub fn step(&self) -> Option<&str> {
        self.step.as_deref()
    }

    /// Select `run`, carrying the current step over.
    pub fn with_run(&self, run: &str) -> Self {
        Self {
            run: Some(run.to_string()),
            step: self.step.clone(),
        }
    }

    /// Select `step` within the current run.
    pub fn with_step(&self, step: &str) -> Self {
        Self::new(self.run.clone(), Some(step.to_string()))
    }

    /// Drop the step when the fresh snapshot no longer contains it.
    pub fn reconciled(&self, run: &Run) -> Self {
        match &self.step {
            Some(step) if !run.has_step(step) => Self {
                run: self.run.clone(),
                step: None,
            },
            _ => self.clone(),
        }
    }
}

/// Where a failed fetch is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorChannel {
    /// Shown in the run meta area. User-initiated loads.
    Loud,
    /// Logged only. Background refresh ticks.
    Silent,
}

/// Run meta block shown above the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMeta {
    pub run_name: String,
    pub dag_name: String,
    pub run_id: String,
    pub created_at_utc: String,
    pub step_count: usize,
}

impl RunMeta {
    pub fn from_run(run: &Run) -> Self {
        Self {
            run_name: run.run_name.clone(),
            dag_name: run.dag_name.clone(),
            run_id: run.run_id.clone(),
            created_at_utc: run.created_at_utc.clone(),
            step_count: run.step_count,
        }
    }

    /// `(label, value)` pairs in display order.
    pub fn fields(&self) -> [(&'static str, String); 5] {
        [
            ("run_name", self.run_name.clone()),
            ("dag_name", self.dag_name.clone()),
            ("run_id", self.run_id.clone()),
            ("created_at_utc", self.created_at_utc.clone()),
            ("step_count", self.step_count.to_string()),
        ]
    }
}

/// One line of the steps table.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRow {
    pub name: String,
    pub status: StepStatus,
    pub duration_ms: String,
    pub input_lines: String,
    pub output_lines: String,
    pub throughput_in: String,
    pub throughput_out: String,
    pub selected: bool,
}

/// Everything one load cycle renders, built from a single run snapshot.
#[derive(Debug, Clone)]
pub struct ViewModel {
    pub meta: RunMeta,
    pub scene: Scene,
    pub steps: Vec<StepRow>,
    /// Present only when a step is selected and its rows loaded.
    pub rows: Option<RowTable>,
    pub fetched_at: DateTime<Local>,
}

impl ViewModel {
    /// Build the run-level parts of the view for `selection`.
    pub fn build(run: &Run, selection: &Selection) -> Self {
        let selected = selection.step();
        let steps = run
            .steps
            .iter()
            .map(|step| StepRow {
                name: step.step_name.clone(),
                status: step.status.clone(),
                duration_ms: format_metric(step.duration_ms),
                input_lines: format_count(step.input_lines),
                output_lines: format_count(step.output_lines),
                throughput_in: format_metric(step.throughput_in_lps),
                throughput_out: format_metric(step.throughput_out_lps),
                selected: selected == Some(step.step_name.as_str()),
            })
            .collect();

        Self {
            meta: RunMeta::from_run(run),
            scene: Scene::build(&run.steps, selected),
            steps,
            rows: None,
            fetched_at: Local::now(),
        }
    }

    pub fn with_rows(mut self, rows: Option<RowTable>) -> Self {
        self.rows = rows;
        self
    }

    /// Index of a step in the table, for cursor placement.
    pub fn step_index(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name == name)
    }
}

/// Panel that receives cursor keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Runs,
    Steps,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Runs => Focus::Steps,
            Focus::Steps => Focus::Runs,
        }
    }
}

/// Cursor position within a list of `len` entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
}

impl Cursor {
    pub fn up(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn down(&mut self, len: usize) {
        if self.index + 1 < len {
            self.index += 1;
        }
    }

    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }

    /// First visible entry so the cursor stays inside `visible` rows.
    pub fn offset(&self, visible: usize) -> usize {
        if visible == 0 {
            return self.index;
        }
        self.index.saturating_sub(visible - 1)
    }
}

/// Graph viewport scroll position, in terminal cells.
#[derive(Default)]
pub struct GraphState {
    pub scroll_x: u16,
    pub scroll_y: u16,
    /// Size of the rasterised graph.
    pub total_cols: u16,
    pub total_lines: u16,
    /// Size of the visible graph area.
    pub viewport_width: u16,
    pub viewport_height: u16,
}

impl GraphState {
    /// Scroll vertically by a delta, clamping to bounds.
    pub fn scroll_by(&mut self, delta: i16) {
        if delta < 0 {
            self.scroll_y = self.scroll_y.saturating_sub(delta.unsigned_abs());
        } else {
            let max_scroll = self.total_lines.saturating_sub(self.viewport_height);
            self.scroll_y = self.scroll_y.saturating_add(delta as u16).min(max_scroll);
        }
    }

    /// Scroll horizontally by a delta, clamping to bounds.
    pub fn scroll_x_by(&mut self, delta: i16) {
        if delta < 0 {
            self.scroll_x = self.scroll_x.saturating_sub(delta.unsigned_abs());
        } else {
            let max_scroll = self.total_cols.saturating_sub(self.viewport_width);
            self.scroll_x = self.scroll_x.saturating_add(delta as u16).min(max_scroll);
        }
    }

    pub fn scroll_to_start(&mut self) {
        self.scroll_x = 0;
        self.scroll_y = 0;
    }

    pub fn scroll_to_end(&mut self) {
        self.scroll_y = self.total_lines.saturating_sub(self.viewport_height);
    }

    /// Re-clamp after the graph or viewport changed size.
    pub fn clamp(&mut self) {
        self.scroll_x = self
            .scroll_x
            .min(self.total_cols.saturating_sub(self.viewport_width));
        self.scroll_y = self
            .scroll_y
            .min(self.total_lines.saturating_sub(self.viewport_height));
    }
}
