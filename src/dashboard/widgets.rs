use ratatui::text::Span;

use super::theme::Theme;
use crate::graph::StatusClass;
use crate::models::StepStatus;

/// Get status indicator symbol with color
pub fn status_indicator(status: &StepStatus) -> Span<'static> {
    let class = StatusClass::from(status);
    Span::styled(status_char(class).to_string(), Theme::status(class))
}

/// Status indicator character for a node class
pub fn status_char(class: StatusClass) -> char {
    match class {
        StatusClass::Done => '✓',
        StatusClass::Running => '●',
        StatusClass::Pending => '○',
        StatusClass::Failed => '✗',
        StatusClass::Skipped => '⊘',
    }
}

/// Format an optional metric for the steps table; absent values are blank.
///
/// Whole numbers print without a fraction, others with at most three
/// decimals.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => {
            let text = format!("{v:.3}");
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        }
    }
}

pub fn format_count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Compact progress bar string
pub fn progress_bar_compact(pct: f64, width: usize) -> String {
    let filled = (pct.clamp(0.0, 1.0) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "\u{2588}".repeat(filled), "\u{2591}".repeat(empty))
}
