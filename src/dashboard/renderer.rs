//! Rendering functions for dashboard panels.

use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::graph_widget::{GraphRenderResult, GraphWidget, Viewport};
use super::state::{Cursor, RunMeta, StepRow};
use super::theme::{StatusColors, Theme};
use super::widgets::{progress_bar_compact, status_indicator};
use crate::graph::{Scene, SceneNode, StatusClass};
use crate::models::RunSummary;
use crate::row_table::{RowTable, RowTableBody, NO_ROWS};

/// Header height: logo plus one status line.
pub const HEADER_HEIGHT: u16 = 4;

/// Width of the run list column.
pub const RUN_LIST_WIDTH: u16 = 34;

/// Meta panel height: five fields plus borders.
pub const META_HEIGHT: u16 = 7;

/// Widest a row table column is allowed to get.
const MAX_COLUMN_WIDTH: usize = 40;

/// Screen regions of every panel, recomputed each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardAreas {
    pub header: Rect,
    pub runs: Rect,
    pub meta: Rect,
    pub graph: Rect,
    pub inspect: Rect,
    pub steps: Rect,
    pub rows: Rect,
    pub footer: Rect,
}

/// Split the frame into panels.
pub fn dashboard_layout(area: Rect) -> DashboardAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Percentage(55),
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(RUN_LIST_WIDTH), Constraint::Min(40)])
        .split(rows[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(META_HEIGHT), Constraint::Min(6)])
        .split(top[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[3]);

    DashboardAreas {
        header: rows[0],
        runs: top[0],
        meta: right[0],
        graph: right[1],
        inspect: rows[2],
        steps: bottom[0],
        rows: bottom[1],
        footer: rows[4],
    }
}

fn panel(title: impl Into<String>, focused: bool) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title.into()))
        .title_style(Theme::header())
        .borders(Borders::ALL)
        .border_style(Theme::border(focused))
}

/// Render header with logo, spinner, run count and refresh time.
pub fn render_header(
    frame: &mut Frame,
    area: Rect,
    spinner: char,
    runs: &[RunSummary],
    fetched_at: Option<DateTime<Local>>,
) {
    let mut lines: Vec<Line> = crate::LOGO
        .lines()
        .map(|l| Line::from(Span::styled(l, Theme::header())))
        .collect();

    let refreshed = fetched_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let status = vec![
        Span::styled(format!("   {spinner} "), Theme::header()),
        Span::raw(format!("{} runs", runs.len())),
        Span::styled(" \u{2502} ", Theme::dimmed()),
        Span::raw(format!("refreshed {refreshed}")),
    ];

    lines.push(Line::from(status));
    frame.render_widget(Paragraph::new(lines), area);
}

/// Render the run list. The selected run is marked, the cursor highlighted
/// while the list has focus.
pub fn render_run_list(
    frame: &mut Frame,
    area: Rect,
    runs: &[RunSummary],
    selected: Option<&str>,
    cursor: Cursor,
    focused: bool,
) {
    let block = panel(format!("Runs ({})", runs.len()), focused);
    let visible = block.inner(area).height as usize;

    if runs.is_empty() {
        let empty = Paragraph::new("No runs").style(Theme::dimmed()).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let offset = cursor.offset(visible);
    let lines: Vec<Line> = runs
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, run)| {
            let is_selected = selected == Some(run.run_name.as_str());
            let marker = if is_selected { "\u{25B8} " } else { "  " };
            let mut style = if is_selected {
                Theme::selected()
            } else {
                Style::default()
            };
            if focused && i == cursor.index {
                style = style.patch(Theme::cursor());
            }
            Line::from(Span::styled(format!("{marker}{}", run.label()), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Index of the run under a screen row, if any.
pub fn run_index_at(area: Rect, cursor: Cursor, len: usize, column: u16, row: u16) -> Option<usize> {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    if !contains(inner, column, row) {
        return None;
    }
    let index = cursor.offset(inner.height as usize) + (row - inner.y) as usize;
    (index < len).then_some(index)
}

/// Render run meta, or the last loud error in its place.
pub fn render_run_meta(frame: &mut Frame, area: Rect, meta: Option<&RunMeta>, error: Option<&str>) {
    let block = panel("Run", false);

    let paragraph = match (error, meta) {
        (Some(err), _) => Paragraph::new(Span::styled(err.to_string(), Theme::error()))
            .wrap(Wrap { trim: false }),
        (None, Some(meta)) => {
            let lines: Vec<Line> = meta
                .fields()
                .into_iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{label:<15}"), Theme::dimmed()),
                        Span::raw(value),
                    ])
                })
                .collect();
            Paragraph::new(lines)
        }
        (None, None) => Paragraph::new(Span::styled("No run selected", Theme::dimmed())),
    };

    frame.render_widget(paragraph.block(block), area);
}

/// Render the execution graph and report the inner area and graph size.
pub fn render_graph(
    frame: &mut Frame,
    area: Rect,
    scene: Option<&Scene>,
    viewport: Viewport,
) -> (Rect, GraphRenderResult) {
    let block = panel("Execution Graph", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(scene) = scene else {
        return (inner, GraphRenderResult::empty());
    };

    let widget = GraphWidget::new(scene).viewport(viewport);
    let result = if scene.is_empty() {
        GraphRenderResult::empty()
    } else {
        widget.render_graph(inner, frame.buffer_mut())
    };
    (inner, result)
}

/// One-line summary of the inspected node: the hover text on a single line.
pub fn render_inspection(frame: &mut Frame, area: Rect, node: Option<&SceneNode>) {
    let line = match node {
        Some(node) => {
            let mut spans = vec![Span::styled(" \u{25C6} ", Theme::status(node.status_class))];
            for (i, part) in node.tooltip().lines().enumerate() {
                if i > 0 {
                    spans.push(Span::styled("  \u{00B7}  ", Theme::dimmed()));
                }
                let style = if i == 0 {
                    Theme::header()
                } else {
                    Style::default()
                };
                spans.push(Span::styled(part.to_string(), style));
            }
            if node.disabled {
                spans.push(Span::styled("  (disabled)", Theme::dimmed()));
            }
            Line::from(spans)
        }
        None => Line::from(Span::styled(
            " hover a node or move the step cursor to inspect it",
            Theme::dimmed(),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the steps table.
pub fn render_steps_table(
    frame: &mut Frame,
    area: Rect,
    steps: &[StepRow],
    cursor: Cursor,
    focused: bool,
) {
    let done = steps
        .iter()
        .filter(|s| StatusClass::from(&s.status) == StatusClass::Done)
        .count();
    let pct = if steps.is_empty() {
        0.0
    } else {
        done as f64 / steps.len() as f64
    };
    let block = panel(
        format!(
            "Steps ({done}/{}) {}",
            steps.len(),
            progress_bar_compact(pct, 10)
        ),
        focused,
    );

    if steps.is_empty() {
        let empty = Paragraph::new("No steps").style(Theme::dimmed()).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        "", "Step", "Status", "Duration ms", "In", "Out", "In/s", "Out/s",
    ])
    .style(Theme::header());

    let visible = steps_visible_rows(area);
    let offset = cursor.offset(visible);

    let rows: Vec<Row> = steps
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, step)| {
            let class = StatusClass::from(&step.status);
            let mut style = if step.selected {
                Theme::selected()
            } else {
                Theme::status(class)
            };
            if focused && i == cursor.index {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Row::new(vec![
                status_indicator(&step.status).content.to_string(),
                step.name.clone(),
                step.status.to_string(),
                step.duration_ms.clone(),
                step.input_lines.clone(),
                step.output_lines.clone(),
                step.throughput_in.clone(),
                step.throughput_out.clone(),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Min(12),
        Constraint::Length(8),
        Constraint::Length(11),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(8),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths).block(block).header(header);
    frame.render_widget(table, area);
}

fn steps_visible_rows(area: Rect) -> usize {
    // borders and the header row
    area.height.saturating_sub(3) as usize
}

/// Index of the step under a screen row, if any.
pub fn step_index_at(area: Rect, cursor: Cursor, len: usize, column: u16, row: u16) -> Option<usize> {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let body_y = inner.y + 1;
    if !contains(inner, column, row) || row < body_y {
        return None;
    }
    let index = cursor.offset(steps_visible_rows(area)) + (row - body_y) as usize;
    (index < len).then_some(index)
}

/// Render the selected step's row page.
pub fn render_row_table(frame: &mut Frame, area: Rect, table: Option<&RowTable>) {
    let Some(table) = table else {
        let block = panel("Rows", false);
        let hint = Paragraph::new("Select a step to view its rows")
            .style(Theme::dimmed())
            .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let block = panel(table.header.clone(), false);

    match &table.body {
        RowTableBody::Empty => {
            let empty = Paragraph::new(NO_ROWS).style(Theme::dimmed()).block(block);
            frame.render_widget(empty, area);
        }
        RowTableBody::Rows { columns, cells } => {
            let widths: Vec<Constraint> = columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let widest = cells
                        .iter()
                        .filter_map(|row| row.get(i))
                        .map(|c| c.chars().count())
                        .chain(std::iter::once(col.chars().count()))
                        .max()
                        .unwrap_or(0);
                    Constraint::Length(widest.min(MAX_COLUMN_WIDTH) as u16)
                })
                .collect();

            let header = Row::new(columns.clone()).style(Theme::header());
            let rows: Vec<Row> = cells.iter().map(|row| Row::new(row.clone())).collect();

            let table = Table::new(rows, widths).block(block).header(header);
            frame.render_widget(table, area);
        }
    }
}

/// Render footer with keybinds, or the last error.
pub fn render_footer(frame: &mut Frame, area: Rect, last_error: Option<&str>) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let line = if let Some(err) = last_error {
        Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(StatusColors::ERROR),
        ))
    } else {
        Line::from(vec![
            Span::styled("q", bold),
            Span::raw(" quit \u{2502} "),
            Span::styled("Tab", bold),
            Span::raw(" focus \u{2502} "),
            Span::styled("\u{2191}\u{2193}", bold),
            Span::raw(" move \u{2502} "),
            Span::styled("Enter", bold),
            Span::raw(" select \u{2502} "),
            Span::styled("r", bold),
            Span::raw(" refresh \u{2502} "),
            Span::styled("hjkl", bold),
            Span::raw(" scroll graph"),
        ])
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}
