use ratatui::style::{Color, Modifier, Style};

use crate::graph::{EdgeClass, StatusClass};

/// Color scheme for status indicators
pub struct StatusColors;

impl StatusColors {
    // Step status colors
    pub const RUNNING: Color = Color::Blue;
    pub const DONE: Color = Color::Green;
    pub const FAILED: Color = Color::Red;
    pub const PENDING: Color = Color::Gray;
    pub const SKIPPED: Color = Color::Yellow;

    // UI chrome
    pub const HEADER: Color = Color::White;
    pub const DIMMED: Color = Color::DarkGray;
    pub const BORDER: Color = Color::Gray;
    pub const FOCUS: Color = Color::Cyan;
    pub const SELECTED: Color = Color::Rgb(11, 94, 215);
    pub const ERROR: Color = Color::Red;

    // Graph edge colors
    pub const EDGE_NORMAL: Color = Color::Rgb(107, 114, 128);
    pub const EDGE_DISABLED: Color = Color::Rgb(154, 160, 166);
    pub const EDGE_SATISFIED: Color = Color::Rgb(31, 138, 76);
    pub const EDGE_UNSATISFIED: Color = Color::Rgb(192, 57, 43);
}

/// Theme provides pre-built styles
pub struct Theme;

impl Theme {
    pub fn header() -> Style {
        Style::default().fg(StatusColors::HEADER).add_modifier(Modifier::BOLD)
    }

    pub fn dimmed() -> Style {
        Style::default().fg(StatusColors::DIMMED)
    }

    pub fn border(focused: bool) -> Style {
        if focused {
            Style::default().fg(StatusColors::FOCUS)
        } else {
            Style::default().fg(StatusColors::BORDER)
        }
    }

    pub fn error() -> Style {
        Style::default().fg(StatusColors::ERROR)
    }

    pub fn cursor() -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(StatusColors::SELECTED)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status(class: StatusClass) -> Style {
        match class {
            StatusClass::Running => Style::default()
                .fg(StatusColors::RUNNING)
                .add_modifier(Modifier::BOLD),
            StatusClass::Done => Style::default().fg(StatusColors::DONE),
            StatusClass::Failed => Style::default()
                .fg(StatusColors::FAILED)
                .add_modifier(Modifier::BOLD),
            StatusClass::Skipped => Style::default().fg(StatusColors::SKIPPED),
            StatusClass::Pending => Style::default().fg(StatusColors::PENDING),
        }
    }

    /// Node styling for steps that are disabled themselves.
    pub fn disabled_node() -> Style {
        Style::default()
            .fg(StatusColors::DIMMED)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn node_border(selected: bool) -> Style {
        if selected {
            Self::selected()
        } else {
            Style::default().fg(StatusColors::BORDER)
        }
    }

    pub fn edge(class: EdgeClass) -> Style {
        let color = match class {
            EdgeClass::Normal => StatusColors::EDGE_NORMAL,
            EdgeClass::Disabled => StatusColors::EDGE_DISABLED,
            EdgeClass::ConditionSatisfied => StatusColors::EDGE_SATISFIED,
            EdgeClass::ConditionUnsatisfied => StatusColors::EDGE_UNSATISFIED,
        };
        let style = Style::default().fg(color);
        if class == EdgeClass::Disabled {
            style.add_modifier(Modifier::DIM)
        } else {
            style
        }
    }
}
