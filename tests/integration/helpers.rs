//! Shared test helpers: a scripted run source and a canned-response HTTP server

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value};
use tiny_http::{Header, Response, Server};

use ninout_dash::api::{FetchError, FetchResult, RowWindow, RunSource};
use ninout_dash::models::{RowPage, Run, RunSummary, Step, StepStatus};

/// Build a step with dependencies and a status.
pub fn step(name: &str, deps: &[&str], status: StepStatus) -> Step {
    Step::new(name)
        .with_deps(deps.iter().copied())
        .with_status(status)
}

/// Build a run snapshot.
pub fn run(name: &str, steps: Vec<Step>) -> Run {
    Run {
        run_name: name.to_string(),
        dag_name: "etl".to_string(),
        run_id: format!("{name}-id"),
        created_at_utc: "2024-05-01T10:00:00Z".to_string(),
        step_count: steps.len(),
        steps,
    }
}

pub fn summary(name: &str) -> RunSummary {
    RunSummary {
        run_name: name.to_string(),
        dag_name: "etl".to_string(),
        ..RunSummary::default()
    }
}

pub fn server_error(url: &str) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status: 503,
        reason: "Service Unavailable".to_string(),
    }
}

/// Run source that replays queued responses per endpoint.
///
/// Each `get_run` pops the next queued snapshot for that run; the last one
/// is sticky so a script only needs to list the changes it cares about.
#[derive(Default)]
pub struct ScriptedSource {
    runs: RefCell<VecDeque<FetchResult<Vec<RunSummary>>>>,
    snapshots: RefCell<HashMap<String, VecDeque<FetchResult<Run>>>>,
    rows: RefCell<HashMap<(String, String), RowPage>>,
    log: RefCell<Vec<String>>,
}

fn pop_sticky<T: Clone>(queue: &mut VecDeque<FetchResult<T>>) -> Option<FetchResult<T>> {
    if queue.len() > 1 {
        return queue.pop_front();
    }
    queue.front().map(|entry| match entry {
        Ok(value) => Ok(value.clone()),
        Err(e) => Err(server_error(e.url())),
    })
}

impl ScriptedSource {
    pub fn push_runs(&self, result: FetchResult<Vec<RunSummary>>) -> &Self {
        self.runs.borrow_mut().push_back(result);
        self
    }

    pub fn push_snapshot(&self, name: &str, result: FetchResult<Run>) -> &Self {
        self.snapshots
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn set_rows(&self, run: &str, step: &str, page: RowPage) -> &Self {
        self.rows
            .borrow_mut()
            .insert((run.to_string(), step.to_string()), page);
        self
    }

    /// Calls made so far, e.g. `["runs", "run:r1", "rows:r1/a"]`.
    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl RunSource for ScriptedSource {
    fn list_runs(&self) -> FetchResult<Vec<RunSummary>> {
        self.record("runs".to_string());
        pop_sticky(&mut self.runs.borrow_mut()).unwrap_or_else(|| Ok(Vec::new()))
    }

    fn get_run(&self, run_name: &str) -> FetchResult<Run> {
        let call = format!("run:{run_name}");
        self.record(call.clone());
        let mut snapshots = self.snapshots.borrow_mut();
        snapshots
            .get_mut(run_name)
            .and_then(pop_sticky)
            .unwrap_or_else(|| {
                Err(FetchError::Status {
                    url: call,
                    status: 404,
                    reason: "Not Found".to_string(),
                })
            })
    }

    fn get_step_rows(
        &self,
        run_name: &str,
        step_name: &str,
        window: RowWindow,
    ) -> FetchResult<RowPage> {
        let call = format!("rows:{run_name}/{step_name}");
        self.record(call.clone());
        assert_eq!(window, RowWindow::FIRST_PAGE, "dashboard always asks for the first page");
        self.rows
            .borrow()
            .get(&(run_name.to_string(), step_name.to_string()))
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: call,
                status: 404,
                reason: "Not Found".to_string(),
            })
    }
}

/// Canned response for one request path (query string included).
#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
}

impl Canned {
    pub fn json(value: Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: json!({"detail": "error"}).to_string(),
        }
    }

    pub fn raw(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }
}

/// Local HTTP server answering from a fixed route table.
pub struct TestServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Serve `routes` on an ephemeral port. Unknown paths get 404.
    pub fn start(routes: Vec<(&str, Canned)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("Failed to bind test server");
        let addr = server
            .server_addr()
            .to_ip()
            .expect("Test server should listen on an IP address");

        let routes: HashMap<String, Canned> = routes
            .into_iter()
            .map(|(path, canned)| (path.to_string(), canned))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        thread::spawn(move || {
            for request in server.incoming_requests() {
                let url = request.url().to_string();
                seen.lock().unwrap().push(url.clone());

                let canned = routes.get(&url).cloned().unwrap_or(Canned::status(404));
                let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .expect("valid header");
                let response = Response::from_string(canned.body)
                    .with_status_code(canned.status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request paths received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}
