//! HTTP client against a local canned server

use std::net::TcpListener;
use std::time::Duration;

use serde_json::json;

use ninout_dash::api::{ApiClient, FetchError, RowWindow, RunSource};
use ninout_dash::dashboard::Controller;
use ninout_dash::models::StepStatus;

use super::helpers::{Canned, TestServer};

fn client_for(server: &TestServer) -> ApiClient {
    ApiClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
}

fn run_detail() -> serde_json::Value {
    json!({
        "run_name": "r1",
        "dag_name": "etl",
        "run_id": "0a1b",
        "created_at_utc": "2024-05-01T10:00:00Z",
        "step_count": 2,
        "steps": [
            {
                "step_name": "extract",
                "status": "done",
                "duration_ms": 1200.5,
                "input_lines": 10,
                "output_lines": 10,
                "deps": []
            },
            {
                "step_name": "load",
                "status": "queued",
                "deps": ["extract"]
            }
        ]
    })
}

#[test]
fn test_list_runs_decodes_summaries() {
    let server = TestServer::start(vec![(
        "/api/runs",
        Canned::json(json!([
            {
                "run_name": "r1",
                "dag_name": "etl",
                "run_id": "0a1b",
                "created_at_utc": "2024-05-01T10:00:00Z",
                "step_count": 3,
                "status_summary": {"done": 2, "running": 1}
            },
            {"run_name": "r2"}
        ])),
    )]);

    let runs = client_for(&server).list_runs().unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].label(), "r1 (etl)");
    assert_eq!(runs[0].step_count, 3);
    assert_eq!(runs[0].status_summary.get("done"), Some(&2));
    assert_eq!(runs[1].dag_name, "");
    assert!(runs[1].status_summary.is_empty());
    assert_eq!(server.requests(), ["/api/runs"]);
}

#[test]
fn test_get_run_tolerates_unknown_status_and_missing_fields() {
    let server = TestServer::start(vec![("/api/runs/r1", Canned::json(run_detail()))]);

    let run = client_for(&server).get_run("r1").unwrap();

    assert_eq!(run.steps.len(), 2);
    let extract = run.step("extract").unwrap();
    assert_eq!(extract.status, StepStatus::Done);
    assert_eq!(extract.duration_ms, Some(1200.5));

    let load = run.step("load").unwrap();
    assert_eq!(load.status, StepStatus::Unknown("queued".to_string()));
    assert_eq!(load.deps, ["extract"]);
    assert!(load.disabled_deps.is_empty());
    assert_eq!(load.when_name, None);
    assert_eq!(load.throughput_in_lps, None);
}

#[test]
fn test_rows_request_uses_window_and_encodes_names() {
    let path = "/api/runs/a%20run/steps/s%2F1/rows?limit=100&offset=0";
    let server = TestServer::start(vec![(
        path,
        Canned::json(json!({
            "total_rows": 1,
            "offset": 0,
            "limit": 100,
            "rows": [{"row_id": 7, "payload": {"k": "v"}}]
        })),
    )]);

    let page = client_for(&server)
        .get_step_rows("a run", "s/1", RowWindow::FIRST_PAGE)
        .unwrap();

    assert_eq!(page.total_rows, 1);
    assert_eq!(page.rows[0].row_id, json!(7));
    assert_eq!(page.rows[0].payload, json!({"k": "v"}));
    assert_eq!(server.requests(), [path]);
}

#[test]
fn test_non_success_status_is_reported() {
    let server = TestServer::start(vec![]);

    let err = client_for(&server).get_run("missing").unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Request failed: 404");
    assert!(err.url().ends_with("/api/runs/missing"));
}

#[test]
fn test_malformed_body_is_decode_error() {
    let server = TestServer::start(vec![("/api/runs", Canned::raw("<html>oops</html>"))]);

    let err = client_for(&server).list_runs().unwrap_err();

    assert!(matches!(err, FetchError::Decode { .. }), "got {err:?}");
    assert_eq!(err.status(), None);
}

#[test]
fn test_connection_refused_is_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = ApiClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();

    let err = client.list_runs().unwrap_err();

    assert!(matches!(err, FetchError::Transport { .. }), "got {err:?}");
}

#[test]
fn test_controller_over_http_loads_first_run_and_reports_errors() {
    let server = TestServer::start(vec![
        (
            "/api/runs",
            Canned::json(json!([{"run_name": "r1", "dag_name": "etl"}])),
        ),
        ("/api/runs/r1", Canned::json(run_detail())),
        ("/api/runs/r1/steps/load/rows?limit=100&offset=0", Canned::status(500)),
    ]);

    let mut controller = Controller::new(client_for(&server));
    controller.manual_refresh();

    assert_eq!(controller.selection().run(), Some("r1"));
    assert!(controller.meta_error().is_none());
    let view = controller.view().unwrap();
    assert_eq!(view.meta.dag_name, "etl");
    assert_eq!(view.scene.nodes().len(), 2);

    // rows failure: graph committed, rows absent, error shown
    controller.select_step("load");
    assert_eq!(controller.selection().step(), Some("load"));
    assert!(controller.view().unwrap().rows.is_none());
    assert_eq!(controller.meta_error(), Some("Error: Request failed: 500"));

    assert_eq!(
        server.requests(),
        [
            "/api/runs",
            "/api/runs/r1",
            "/api/runs/r1",
            "/api/runs/r1/steps/load/rows?limit=100&offset=0",
        ]
    );
}
