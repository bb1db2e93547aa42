//! Dashboard application state and main loop.

use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use super::controller::Controller;
use super::event_handler::{
    handle_key_event, handle_mouse_event, page_step, KeyAction, MouseAction,
};
use super::graph_widget::{CellProjection, Viewport};
use super::renderer::{
    dashboard_layout, render_footer, render_graph, render_header, render_inspection,
    render_row_table, render_run_list, render_run_meta, render_steps_table, run_index_at,
    step_index_at, DashboardAreas,
};
use super::state::{Cursor, Focus, GraphState};
use crate::api::RunSource;
use crate::graph::SceneNode;

/// Poll timeout for event loop (100ms for responsive UI).
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Full-screen dashboard over a [`Controller`].
pub struct TuiApp<S: RunSource> {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    running: Arc<AtomicBool>,
    controller: Controller<S>,
    refresh_interval: Duration,
    last_refresh: Instant,
    focus: Focus,
    run_cursor: Cursor,
    step_cursor: Cursor,
    /// Node under the mouse pointer.
    hovered: Option<String>,
    graph_state: GraphState,
    /// Regions from the last frame, for mouse hit-testing.
    areas: DashboardAreas,
    graph_inner: Rect,
    spinner_frame: usize,
    mouse_enabled: bool,
    exiting: bool,
    /// Flag to prevent double cleanup in Drop.
    cleaned_up: bool,
}

impl<S: RunSource> TuiApp<S> {
    /// Take over the terminal.
    pub fn new(controller: Controller<S>, refresh_interval: Duration) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

        crate::utils::install_crossterm_panic_hook();

        let mouse_enabled =
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture).is_ok();

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        Ok(Self {
            terminal,
            running: Arc::new(AtomicBool::new(true)),
            controller,
            refresh_interval,
            last_refresh: Instant::now(),
            focus: Focus::default(),
            run_cursor: Cursor::default(),
            step_cursor: Cursor::default(),
            hovered: None,
            graph_state: GraphState::default(),
            areas: DashboardAreas::default(),
            graph_inner: Rect::default(),
            spinner_frame: 0,
            mouse_enabled,
            exiting: false,
            cleaned_up: false,
        })
    }

    /// Load the initial view and run until the user quits.
    pub fn run(&mut self) -> Result<()> {
        // Install Ctrl+C handler to ensure terminal cleanup on signal
        let running = self.running.clone();

        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);

            // Drop may not run on process exit
            crate::utils::cleanup_terminal_crossterm();

            std::process::exit(0);
        })
        .context("Failed to set Ctrl+C handler")?;

        self.render()?;
        self.controller.initial_load();
        self.last_refresh = Instant::now();
        self.sync_cursors(true);

        let result = self.run_event_loop();

        self.cleanup_terminal();

        result
    }

    /// Main event loop - returns on quit.
    fn run_event_loop(&mut self) -> Result<()> {
        while self.running.load(Ordering::SeqCst) {
            if self.exiting {
                break;
            }

            if self.last_refresh.elapsed() >= self.refresh_interval {
                self.controller.periodic_refresh();
                self.last_refresh = Instant::now();
                self.sync_cursors(false);
            }

            if event::poll(POLL_TIMEOUT)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        let action = handle_key_event(key.code, key.modifiers);
                        self.apply_key(action);
                    }
                    Event::Mouse(mouse) => {
                        let action = handle_mouse_event(mouse.kind, mouse.column, mouse.row);
                        self.apply_mouse(action);
                    }
                    _ => {}
                }
            }

            self.spinner_frame = (self.spinner_frame + 1) % 10;

            self.render()?;
        }

        Ok(())
    }

    fn apply_key(&mut self, action: KeyAction) {
        match action {
            KeyAction::Exit => self.exiting = true,
            KeyAction::Refresh => {
                self.controller.manual_refresh();
                self.sync_cursors(false);
            }
            KeyAction::FocusNext | KeyAction::FocusPrev => self.focus = self.focus.toggle(),
            KeyAction::CursorUp => match self.focus {
                Focus::Runs => self.run_cursor.up(),
                Focus::Steps => self.step_cursor.up(),
            },
            KeyAction::CursorDown => match self.focus {
                Focus::Runs => self.run_cursor.down(self.controller.runs().len()),
                Focus::Steps => self.step_cursor.down(self.step_count()),
            },
            KeyAction::Activate => self.activate_cursor(),
            KeyAction::Scroll { dx, dy } => {
                self.graph_state.scroll_x_by(dx);
                self.graph_state.scroll_by(dy);
            }
            KeyAction::Page { down } => {
                let step = page_step(self.graph_state.viewport_height);
                self.graph_state.scroll_by(if down { step } else { -step });
            }
            KeyAction::ScrollHome => self.graph_state.scroll_to_start(),
            KeyAction::ScrollEnd => self.graph_state.scroll_to_end(),
            KeyAction::None => {}
        }
    }

    fn apply_mouse(&mut self, action: MouseAction) {
        match action {
            MouseAction::Click { column, row } => self.click(column, row),
            MouseAction::Hover { column, row } => {
                self.hovered = self.graph_node_at(column, row).map(|n| n.name.clone());
            }
            MouseAction::Scroll { dy } => self.graph_state.scroll_by(dy),
            MouseAction::None => {}
        }
    }

    fn click(&mut self, column: u16, row: u16) {
        if let Some(name) = self.graph_node_at(column, row).map(|n| n.name.clone()) {
            self.focus = Focus::Steps;
            self.controller.select_step(&name);
            self.sync_cursors(true);
            return;
        }

        let runs_len = self.controller.runs().len();
        if let Some(index) = run_index_at(self.areas.runs, self.run_cursor, runs_len, column, row) {
            self.focus = Focus::Runs;
            self.run_cursor.index = index;
            self.activate_cursor();
            return;
        }

        let steps_len = self.step_count();
        if let Some(index) =
            step_index_at(self.areas.steps, self.step_cursor, steps_len, column, row)
        {
            self.focus = Focus::Steps;
            self.step_cursor.index = index;
            self.activate_cursor();
        }
    }

    /// Select whatever the focused cursor points at.
    fn activate_cursor(&mut self) {
        match self.focus {
            Focus::Runs => {
                let name = self
                    .controller
                    .runs()
                    .get(self.run_cursor.index)
                    .map(|r| r.run_name.clone());
                if let Some(name) = name {
                    self.controller.select_run(&name);
                    self.graph_state.scroll_to_start();
                }
            }
            Focus::Steps => {
                let name = self
                    .controller
                    .view()
                    .and_then(|v| v.steps.get(self.step_cursor.index))
                    .map(|s| s.name.clone());
                if let Some(name) = name {
                    self.controller.select_step(&name);
                }
            }
        }
        self.sync_cursors(true);
    }

    /// Keep cursors inside the current lists; optionally move them onto the
    /// current selection.
    fn sync_cursors(&mut self, follow_selection: bool) {
        let selection = self.controller.selection().clone();

        if follow_selection {
            if let Some(index) = selection.run().and_then(|run| {
                self.controller
                    .runs()
                    .iter()
                    .position(|r| r.run_name == run)
            }) {
                self.run_cursor.index = index;
            }
            if let Some(index) = selection
                .step()
                .and_then(|step| self.controller.view().and_then(|v| v.step_index(step)))
            {
                self.step_cursor.index = index;
            }
        }

        self.run_cursor.clamp(self.controller.runs().len());
        self.step_cursor.clamp(self.step_count());
    }

    fn step_count(&self) -> usize {
        self.controller.view().map_or(0, |v| v.steps.len())
    }

    /// Graph node under a screen cell of the last frame.
    fn graph_node_at(&self, column: u16, row: u16) -> Option<&SceneNode> {
        let inner = self.graph_inner;
        if column < inner.x
            || row < inner.y
            || column >= inner.x + inner.width
            || row >= inner.y + inner.height
        {
            return None;
        }
        let scene = &self.controller.view()?.scene;
        let x = usize::from(column - inner.x) + usize::from(self.graph_state.scroll_x);
        let y = usize::from(row - inner.y) + usize::from(self.graph_state.scroll_y);
        CellProjection::default().node_at(scene, x, y)
    }

    /// Node shown on the inspection line: hovered, else the step cursor
    /// while the steps table has focus, else the selected step.
    fn inspected_name(&self) -> Option<String> {
        if let Some(name) = &self.hovered {
            return Some(name.clone());
        }
        let view = self.controller.view()?;
        match self.focus {
            Focus::Steps => view.steps.get(self.step_cursor.index).map(|s| s.name.clone()),
            Focus::Runs => self.controller.selection().step().map(str::to_string),
        }
    }

    /// Cleanup terminal state (leave alternate screen, disable raw mode).
    /// Sets cleaned_up flag to prevent double cleanup in Drop.
    fn cleanup_terminal(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;

        let _ = disable_raw_mode();
        if self.mouse_enabled {
            let _ = crossterm::execute!(
                self.terminal.backend_mut(),
                crossterm::event::DisableMouseCapture
            );
        }
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }

    /// Render the UI.
    fn render(&mut self) -> Result<()> {
        let spinner = self.spinner_char();
        let inspected = self.inspected_name();
        let viewport = Viewport::new(self.graph_state.scroll_x, self.graph_state.scroll_y);

        let controller = &self.controller;
        let view = controller.view();
        let focus = self.focus;
        let run_cursor = self.run_cursor;
        let step_cursor = self.step_cursor;

        let mut areas = DashboardAreas::default();
        let mut graph_inner = Rect::default();
        let mut graph_result = None;

        self.terminal.draw(|frame| {
            areas = dashboard_layout(frame.area());

            render_header(
                frame,
                areas.header,
                spinner,
                controller.runs(),
                view.map(|v| v.fetched_at),
            );
            render_run_list(
                frame,
                areas.runs,
                controller.runs(),
                controller.selection().run(),
                run_cursor,
                focus == Focus::Runs,
            );
            render_run_meta(
                frame,
                areas.meta,
                view.map(|v| &v.meta),
                controller.meta_error(),
            );

            let (inner, result) =
                render_graph(frame, areas.graph, view.map(|v| &v.scene), viewport);
            graph_inner = inner;
            graph_result = Some(result);

            let node = inspected
                .as_deref()
                .and_then(|name| view.and_then(|v| v.scene.node(name)));
            render_inspection(frame, areas.inspect, node);

            render_steps_table(
                frame,
                areas.steps,
                view.map_or(&[][..], |v| v.steps.as_slice()),
                step_cursor,
                focus == Focus::Steps,
            );
            render_row_table(frame, areas.rows, view.and_then(|v| v.rows.as_ref()));
            render_footer(frame, areas.footer, controller.meta_error());
        })?;

        self.areas = areas;
        self.graph_inner = graph_inner;
        if let Some(result) = graph_result {
            self.graph_state.total_cols = result.total_width;
            self.graph_state.total_lines = result.total_height;
        }
        self.graph_state.viewport_width = graph_inner.width;
        self.graph_state.viewport_height = graph_inner.height;
        self.graph_state.clamp();

        Ok(())
    }

    /// Get spinner character for current frame.
    fn spinner_char(&self) -> char {
        const SPINNER: [char; 10] = [
            '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}',
            '\u{2827}', '\u{2807}', '\u{280F}',
        ];
        SPINNER[self.spinner_frame % SPINNER.len()]
    }
}

impl<S: RunSource> Drop for TuiApp<S> {
    fn drop(&mut self) {
        self.cleanup_terminal();
    }
}
