//! Selection and refresh control.
//!
//! Every transition runs the same load cycle for the selected run:
//! fetch the snapshot, reconcile the selection against it, build the view
//! and, when a step is selected, fetch its rows. The resulting
//! [`ViewModel`] replaces the previous one in a single assignment.

use super::state::{ErrorChannel, Selection, ViewModel};
use crate::api::{FetchError, FetchResult, RowWindow, RunSource};
use crate::models::RunSummary;
use crate::row_table::RowTable;

/// Drives fetches against a [`RunSource`] and holds what they produced.
pub struct Controller<S: RunSource> {
    source: S,
    selection: Selection,
    runs: Vec<RunSummary>,
    view: Option<ViewModel>,
    /// Last loud failure; replaced by the meta of the next successful load.
    meta_error: Option<String>,
}

impl<S: RunSource> Controller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            selection: Selection::default(),
            runs: Vec::new(),
            view: None,
            meta_error: None,
        }
    }

    /// Start with a preselected run and step, e.g. from the command line.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn runs(&self) -> &[RunSummary] {
        &self.runs
    }

    pub fn view(&self) -> Option<&ViewModel> {
        self.view.as_ref()
    }

    pub fn meta_error(&self) -> Option<&str> {
        self.meta_error.as_deref()
    }

    /// First load on startup. Same as a manual refresh, except that a
    /// preselected run is loaded even when the list already has others.
    pub fn initial_load(&mut self) {
        let preselected = self.selection.run().map(str::to_string);
        let result = self.fetch_runs().and_then(|()| match preselected {
            Some(run) => self.load_run(&run),
            None => self.load_first_run_if_unselected(),
        });
        self.report(result, ErrorChannel::Loud);
    }

    /// Reload the run list; load the first run when none is selected.
    pub fn manual_refresh(&mut self) {
        let result = self
            .fetch_runs()
            .and_then(|()| self.load_first_run_if_unselected());
        self.report(result, ErrorChannel::Loud);
    }

    /// The user picked a run.
    pub fn select_run(&mut self, run_name: &str) {
        let result = self.load_run(run_name);
        self.report(result, ErrorChannel::Loud);
    }

    /// The user picked a step of the current run. Ignored with no run.
    pub fn select_step(&mut self, step_name: &str) {
        let Some(run_name) = self.selection.run().map(str::to_string) else {
            return;
        };
        self.selection = self.selection.with_step(step_name);
        let result = self.load_run(&run_name);
        self.report(result, ErrorChannel::Loud);
    }

    /// Background tick: reload the selected run, failures stay silent.
    pub fn periodic_refresh(&mut self) {
        self.reload(ErrorChannel::Silent);
    }

    /// Reload the selected run, reporting failures on `channel`.
    pub fn reload(&mut self, channel: ErrorChannel) {
        let Some(run_name) = self.selection.run().map(str::to_string) else {
            return;
        };
        let result = self.load_run(&run_name);
        self.report(result, channel);
    }

    fn fetch_runs(&mut self) -> FetchResult<()> {
        self.runs = self.source.list_runs()?;
        tracing::debug!(count = self.runs.len(), "run list loaded");
        Ok(())
    }

    fn load_first_run_if_unselected(&mut self) -> FetchResult<()> {
        if self.selection.run().is_some() {
            return Ok(());
        }
        match self.runs.first().map(|r| r.run_name.clone()) {
            Some(first) => self.load_run(&first),
            None => Ok(()),
        }
    }

    /// One load cycle. On a snapshot failure nothing changes. On a rows
    /// failure the run-level view is still committed, without rows.
    fn load_run(&mut self, run_name: &str) -> FetchResult<()> {
        let run = self.source.get_run(run_name)?;

        let selection = self.selection.with_run(run_name).reconciled(&run);
        if self.selection.step().is_some() && selection.step().is_none() {
            tracing::info!(run = run_name, "selected step no longer present, clearing");
        }
        self.selection = selection;
        self.meta_error = None;

        let view = ViewModel::build(&run, &self.selection);

        let (rows, result) = match self.selection.step() {
            Some(step) => match self.source.get_step_rows(run_name, step, RowWindow::FIRST_PAGE)
            {
                Ok(page) => (Some(RowTable::build(step, &page)), Ok(())),
                Err(e) => (None, Err(e)),
            },
            None => (None, Ok(())),
        };

        self.view = Some(view.with_rows(rows));
        tracing::debug!(run = run_name, step = ?self.selection.step(), "view updated");
        result
    }

    fn report(&mut self, result: FetchResult<()>, channel: ErrorChannel) {
        let Err(err) = result else {
            return;
        };
        match channel {
            ErrorChannel::Loud => {
                tracing::warn!(error = %err, "load failed");
                self.meta_error = Some(error_text(&err));
            }
            ErrorChannel::Silent => {
                tracing::debug!(error = %err, "background refresh failed");
            }
        }
    }
}

/// Text shown in place of the run meta after a loud failure.
fn error_text(err: &FetchError) -> String {
    format!("Error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RowPage, RowRecord, Run, Step};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory source whose contents and failures can be changed
    /// between calls.
    #[derive(Default)]
    struct FakeSource {
        runs: RefCell<Vec<RunSummary>>,
        snapshots: RefCell<HashMap<String, Run>>,
        rows: RefCell<HashMap<(String, String), RowPage>>,
        fail_all: RefCell<bool>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn add_run(&self, name: &str, steps: &[&str]) {
            self.runs.borrow_mut().push(RunSummary {
                run_name: name.to_string(),
                dag_name: "dag".to_string(),
                step_count: steps.len(),
                ..RunSummary::default()
            });
            self.set_steps(name, steps);
        }

        fn set_steps(&self, name: &str, steps: &[&str]) {
            self.snapshots.borrow_mut().insert(
                name.to_string(),
                Run {
                    run_name: name.to_string(),
                    dag_name: "dag".to_string(),
                    step_count: steps.len(),
                    steps: steps.iter().map(|s| Step::new(*s)).collect(),
                    ..Run::default()
                },
            );
        }

        fn add_rows(&self, run: &str, step: &str, total: u64) {
            let page = RowPage {
                total_rows: total,
                offset: 0,
                limit: Some(100),
                rows: vec![RowRecord::new(1, json!({"k": "v"}))],
            };
            self.rows
                .borrow_mut()
                .insert((run.to_string(), step.to_string()), page);
        }

        fn fail(&self, on: bool) {
            *self.fail_all.borrow_mut() = on;
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn check(&self, call: String) -> FetchResult<()> {
            self.calls.borrow_mut().push(call.clone());
            if *self.fail_all.borrow() {
                return Err(FetchError::Status {
                    url: call,
                    status: 500,
                    reason: "Internal Server Error".to_string(),
                });
            }
            Ok(())
        }

        fn not_found(call: String) -> FetchError {
            FetchError::Status {
                url: call,
                status: 404,
                reason: "Not Found".to_string(),
            }
        }
    }

    impl RunSource for FakeSource {
        fn list_runs(&self) -> FetchResult<Vec<RunSummary>> {
            self.check("runs".to_string())?;
            Ok(self.runs.borrow().clone())
        }

        fn get_run(&self, run_name: &str) -> FetchResult<Run> {
            let call = format!("run:{run_name}");
            self.check(call.clone())?;
            self.snapshots
                .borrow()
                .get(run_name)
                .cloned()
                .ok_or_else(|| Self::not_found(call))
        }

        fn get_step_rows(
            &self,
            run_name: &str,
            step_name: &str,
            window: RowWindow,
        ) -> FetchResult<RowPage> {
            assert_eq!(window, RowWindow::FIRST_PAGE);
            let call = format!("rows:{run_name}/{step_name}");
            self.check(call.clone())?;
            self.rows
                .borrow()
                .get(&(run_name.to_string(), step_name.to_string()))
                .cloned()
                .ok_or_else(|| Self::not_found(call))
        }
    }

    fn controller_with(runs: &[(&str, &[&str])]) -> Controller<FakeSource> {
        let source = FakeSource::default();
        for (name, steps) in runs {
            source.add_run(name, steps);
        }
        Controller::new(source)
    }

    #[test]
    fn test_manual_refresh_selects_first_run() {
        let mut c = controller_with(&[("r1", &["a"]), ("r2", &["b"])]);
        c.manual_refresh();

        assert_eq!(c.runs().len(), 2);
        assert_eq!(c.selection().run(), Some("r1"));
        assert_eq!(c.view().map(|v| v.meta.run_name.as_str()), Some("r1"));
        assert_eq!(c.source().calls(), ["runs", "run:r1"]);
    }

    #[test]
    fn test_manual_refresh_keeps_existing_selection() {
        let mut c = controller_with(&[("r1", &["a"]), ("r2", &["b"])]);
        c.select_run("r2");
        c.manual_refresh();

        assert_eq!(c.selection().run(), Some("r2"));
        // the list refresh alone does not reload the selected run
        assert_eq!(c.source().calls(), ["run:r2", "runs"]);
    }

    #[test]
    fn test_manual_refresh_with_no_runs() {
        let mut c = controller_with(&[]);
        c.manual_refresh();

        assert!(c.runs().is_empty());
        assert!(c.view().is_none());
        assert_eq!(c.selection(), &Selection::default());
        assert!(c.meta_error().is_none());
    }

    #[test]
    fn test_select_step_loads_run_then_rows() {
        let mut c = controller_with(&[("r1", &["a", "b"])]);
        c.source().add_rows("r1", "b", 7);
        c.select_run("r1");
        c.select_step("b");

        assert_eq!(c.selection().step(), Some("b"));
        assert_eq!(c.source().calls(), ["run:r1", "run:r1", "rows:r1/b"]);

        let view = c.view().unwrap();
        let rows = view.rows.as_ref().unwrap();
        assert_eq!(rows.header, "b: 7 rows (showing 1, offset 0)");
        assert!(view.scene.node("b").unwrap().selected);
    }

    #[test]
    fn test_select_step_without_run_is_ignored() {
        let mut c = controller_with(&[("r1", &["a"])]);
        c.select_step("a");

        assert_eq!(c.selection(), &Selection::default());
        assert!(c.source().calls().is_empty());
    }

    #[test]
    fn test_step_dropped_when_absent_after_refresh() {
        let mut c = controller_with(&[("r1", &["a", "b"])]);
        c.source().add_rows("r1", "b", 1);
        c.select_run("r1");
        c.select_step("b");

        c.source().set_steps("r1", &["a"]);
        c.periodic_refresh();

        assert_eq!(c.selection().run(), Some("r1"));
        assert_eq!(c.selection().step(), None);
        let view = c.view().unwrap();
        assert!(view.rows.is_none());
        assert!(view.steps.iter().all(|s| !s.selected));
        // no rows request for a dropped step
        assert_eq!(c.source().calls().last().unwrap(), "run:r1");
    }

    #[test]
    fn test_step_carries_over_to_other_run_when_present() {
        let mut c = controller_with(&[("r1", &["a", "b"]), ("r2", &["b"]), ("r3", &["c"])]);
        c.source().add_rows("r1", "b", 1);
        c.source().add_rows("r2", "b", 2);
        c.select_run("r1");
        c.select_step("b");

        c.select_run("r2");
        assert_eq!(c.selection().step(), Some("b"));
        assert_eq!(
            c.view().unwrap().rows.as_ref().unwrap().header,
            "b: 2 rows (showing 1, offset 0)"
        );

        c.select_run("r3");
        assert_eq!(c.selection().step(), None);
    }

    #[test]
    fn test_periodic_refresh_without_selection_does_nothing() {
        let mut c = controller_with(&[("r1", &["a"])]);
        c.periodic_refresh();
        assert!(c.source().calls().is_empty());
        assert!(c.view().is_none());
    }

    #[test]
    fn test_periodic_failure_is_silent_and_keeps_view() {
        let mut c = controller_with(&[("r1", &["a"])]);
        c.manual_refresh();
        let before = c.view().unwrap().fetched_at;

        c.source().fail(true);
        c.periodic_refresh();

        assert!(c.meta_error().is_none());
        assert_eq!(c.view().unwrap().fetched_at, before);
        assert_eq!(c.selection().run(), Some("r1"));
    }

    #[test]
    fn test_manual_failure_is_loud_then_cleared_by_success() {
        let mut c = controller_with(&[("r1", &["a"])]);
        c.source().fail(true);
        c.manual_refresh();

        let err = c.meta_error().unwrap();
        assert!(err.contains("Request failed: 500"), "got {err}");
        assert!(c.view().is_none());

        c.source().fail(false);
        c.manual_refresh();
        assert!(c.meta_error().is_none());
        assert!(c.view().is_some());
    }

    #[test]
    fn test_select_missing_run_reports_and_keeps_selection() {
        let mut c = controller_with(&[("r1", &["a"])]);
        c.select_run("r1");
        c.select_run("nope");

        assert_eq!(c.selection().run(), Some("r1"));
        assert!(c.meta_error().unwrap().contains("404"));
        assert_eq!(c.view().unwrap().meta.run_name, "r1");
    }

    #[test]
    fn test_rows_failure_commits_run_view_without_rows() {
        let mut c = controller_with(&[("r1", &["a"])]);
        c.select_run("r1");
        // no rows registered for "a"
        c.select_step("a");

        let view = c.view().unwrap();
        assert!(view.rows.is_none());
        assert!(view.scene.node("a").unwrap().selected);
        assert!(c.meta_error().is_some());
    }

    #[test]
    fn test_initial_load_honours_preselection() {
        let source = FakeSource::default();
        source.add_run("r1", &["a"]);
        source.add_run("r2", &["x", "y"]);
        source.add_rows("r2", "y", 3);
        let mut c = Controller::new(source).with_selection(Selection::new(
            Some("r2".to_string()),
            Some("y".to_string()),
        ));

        c.initial_load();

        assert_eq!(c.selection().run(), Some("r2"));
        assert_eq!(c.selection().step(), Some("y"));
        assert_eq!(c.source().calls(), ["runs", "run:r2", "rows:r2/y"]);
    }
}
