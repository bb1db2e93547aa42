//! Selection and refresh behaviour across scripted server states

use serde_json::json;

use ninout_dash::dashboard::{Controller, ErrorChannel, Selection};
use ninout_dash::graph::{EdgeClass, StatusClass};
use ninout_dash::models::{RowPage, RowRecord, StepStatus};
use ninout_dash::row_table::RowTableBody;

use super::helpers::{run, server_error, step, summary, ScriptedSource};

fn page(total: u64, rows: Vec<RowRecord>) -> RowPage {
    RowPage {
        total_rows: total,
        offset: 0,
        limit: Some(100),
        rows,
    }
}

#[test]
fn test_startup_loads_first_run_and_renders_graph() {
    let source = ScriptedSource::default();
    source
        .push_runs(Ok(vec![summary("nightly"), summary("adhoc")]))
        .push_snapshot(
            "nightly",
            Ok(run(
                "nightly",
                vec![
                    step("extract", &[], StepStatus::Done),
                    step("clean", &["extract"], StepStatus::Running),
                    step("load", &["clean"], StepStatus::Pending),
                ],
            )),
        );

    let mut controller = Controller::new(source);
    controller.initial_load();

    assert_eq!(controller.selection().run(), Some("nightly"));
    assert_eq!(controller.source().log(), ["runs", "run:nightly"]);

    let view = controller.view().expect("view after startup");
    assert_eq!(view.meta.run_name, "nightly");
    assert_eq!(view.scene.nodes().len(), 3);
    assert_eq!(view.scene.edges().len(), 2);
    assert!(view
        .scene
        .edges()
        .iter()
        .all(|e| e.class == EdgeClass::Normal));

    let clean = view.scene.node("clean").unwrap();
    assert_eq!(clean.status_class, StatusClass::Running);
    assert!(clean.rect.x > view.scene.node("extract").unwrap().rect.x);
}

#[test]
fn test_step_selection_survives_refresh_while_present() {
    let source = ScriptedSource::default();
    let steps = vec![
        step("extract", &[], StepStatus::Done),
        step("load", &["extract"], StepStatus::Running),
    ];
    source
        .push_runs(Ok(vec![summary("r1")]))
        .push_snapshot("r1", Ok(run("r1", steps)))
        .set_rows(
            "r1",
            "load",
            page(2, vec![RowRecord::new(1, json!({"id": 1, "name": "a"}))]),
        );

    let mut controller = Controller::new(source);
    controller.initial_load();
    controller.select_step("load");

    for _ in 0..3 {
        controller.periodic_refresh();
    }

    assert_eq!(controller.selection().step(), Some("load"));
    let rows = controller.view().unwrap().rows.clone().unwrap();
    assert_eq!(rows.header, "load: 2 rows (showing 1, offset 0)");
    match rows.body {
        RowTableBody::Rows { columns, cells } => {
            assert_eq!(columns, ["row_id", "id", "name"]);
            assert_eq!(cells, [["1", "1", "a"]]);
        }
        RowTableBody::Empty => panic!("expected rows"),
    }

    let log = controller.source().log();
    let rows_calls = log.iter().filter(|c| c.starts_with("rows:")).count();
    assert_eq!(rows_calls, 4, "one per cycle with the step selected: {log:?}");
}

#[test]
fn test_step_vanishing_from_snapshot_clears_selection() {
    let source = ScriptedSource::default();
    source
        .push_runs(Ok(vec![summary("r1")]))
        .push_snapshot(
            "r1",
            Ok(run(
                "r1",
                vec![
                    step("a", &[], StepStatus::Done),
                    step("b", &["a"], StepStatus::Done),
                ],
            )),
        )
        .push_snapshot(
            "r1",
            Ok(run(
                "r1",
                vec![
                    step("a", &[], StepStatus::Done),
                    step("b", &["a"], StepStatus::Done),
                ],
            )),
        )
        .push_snapshot("r1", Ok(run("r1", vec![step("a", &[], StepStatus::Running)])))
        .set_rows("r1", "b", page(0, vec![]));

    let mut controller = Controller::new(source);
    controller.initial_load();
    controller.select_step("b");
    assert!(controller.view().unwrap().rows.as_ref().unwrap().is_empty());

    controller.periodic_refresh();

    assert_eq!(controller.selection().step(), None);
    let view = controller.view().unwrap();
    assert!(view.rows.is_none());
    assert!(view.scene.node("b").is_none());
    assert_eq!(view.scene.node("a").unwrap().status_class, StatusClass::Running);
}

#[test]
fn test_background_failure_keeps_last_view_silently() {
    let source = ScriptedSource::default();
    source
        .push_runs(Ok(vec![summary("r1")]))
        .push_snapshot("r1", Ok(run("r1", vec![step("a", &[], StepStatus::Done)])))
        .push_snapshot("r1", Err(server_error("/api/runs/r1")));

    let mut controller = Controller::new(source);
    controller.initial_load();
    let before = controller.view().unwrap().meta.clone();

    controller.periodic_refresh();
    controller.periodic_refresh();

    assert!(controller.meta_error().is_none());
    assert_eq!(controller.view().unwrap().meta, before);
}

#[test]
fn test_loud_reload_reports_error_text() {
    let source = ScriptedSource::default();
    source
        .push_runs(Ok(vec![summary("r1")]))
        .push_snapshot("r1", Ok(run("r1", vec![step("a", &[], StepStatus::Done)])))
        .push_snapshot("r1", Err(server_error("/api/runs/r1")));

    let mut controller = Controller::new(source);
    controller.initial_load();
    controller.reload(ErrorChannel::Loud);

    assert_eq!(controller.meta_error(), Some("Error: Request failed: 503"));
    // the graph stays on the last good snapshot
    assert!(controller.view().unwrap().scene.node("a").is_some());
}

#[test]
fn test_run_list_failure_on_startup_is_loud() {
    let source = ScriptedSource::default();
    source.push_runs(Err(server_error("/api/runs")));

    let mut controller = Controller::new(source);
    controller.initial_load();

    assert_eq!(controller.meta_error(), Some("Error: Request failed: 503"));
    assert!(controller.runs().is_empty());
    assert!(controller.view().is_none());
}

#[test]
fn test_conditional_and_disabled_edges_reach_the_scene() {
    let mut gated = step("publish", &["check", "build"], StepStatus::Skipped);
    gated.when_name = Some("check".to_string());
    gated.condition_bool = Some(true);
    gated.disabled_deps = vec!["build".to_string()];

    let source = ScriptedSource::default();
    source.push_runs(Ok(vec![summary("r1")])).push_snapshot(
        "r1",
        Ok(run(
            "r1",
            vec![
                step("build", &[], StepStatus::Done),
                step("check", &[], StepStatus::Done),
                gated,
            ],
        )),
    );

    let mut controller = Controller::new(source);
    controller.initial_load();

    let scene = &controller.view().unwrap().scene;
    let class_of = |source: &str| {
        scene
            .edges()
            .iter()
            .find(|e| e.source == source && e.target == "publish")
            .map(|e| e.class)
    };
    assert_eq!(class_of("check"), Some(EdgeClass::ConditionSatisfied));
    assert_eq!(class_of("build"), Some(EdgeClass::Disabled));
}

#[test]
fn test_preselected_missing_step_is_dropped_on_first_load() {
    let source = ScriptedSource::default();
    source
        .push_runs(Ok(vec![summary("r1"), summary("r2")]))
        .push_snapshot("r2", Ok(run("r2", vec![step("a", &[], StepStatus::Done)])));

    let mut controller = Controller::new(source).with_selection(Selection::new(
        Some("r2".to_string()),
        Some("missing".to_string()),
    ));
    controller.initial_load();

    assert_eq!(controller.selection().run(), Some("r2"));
    assert_eq!(controller.selection().step(), None);
    assert_eq!(controller.source().log(), ["runs", "run:r2"]);
}
