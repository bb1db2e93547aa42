//! Event handling for keyboard and mouse input.

use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEventKind};

/// Scroll step for graph navigation, in cells.
pub const SCROLL_STEP: i16 = 2;

/// Page scroll multiplier (viewport size * this factor).
pub const PAGE_SCROLL_FACTOR: f64 = 0.8;

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Exit,
    Refresh,
    FocusNext,
    FocusPrev,
    CursorUp,
    CursorDown,
    Activate,
    /// Scroll the graph by whole cells.
    Scroll { dx: i16, dy: i16 },
    /// Scroll the graph by a fraction of the viewport height.
    Page { down: bool },
    ScrollHome,
    ScrollEnd,
    None,
}

/// What a mouse event asks the app to do. Positions are terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Click { column: u16, row: u16 },
    Hover { column: u16, row: u16 },
    Scroll { dy: i16 },
    None,
}

/// Map a key press to an action.
pub fn handle_key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    match code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Exit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Exit,

        KeyCode::Char('r') | KeyCode::F(5) => KeyAction::Refresh,
        KeyCode::Tab => KeyAction::FocusNext,
        KeyCode::BackTab => KeyAction::FocusPrev,
        KeyCode::Enter | KeyCode::Char(' ') => KeyAction::Activate,

        KeyCode::Up if shift => KeyAction::Scroll { dx: 0, dy: -SCROLL_STEP },
        KeyCode::Down if shift => KeyAction::Scroll { dx: 0, dy: SCROLL_STEP },
        KeyCode::Left if shift => KeyAction::Scroll { dx: -SCROLL_STEP * 2, dy: 0 },
        KeyCode::Right if shift => KeyAction::Scroll { dx: SCROLL_STEP * 2, dy: 0 },

        KeyCode::Up => KeyAction::CursorUp,
        KeyCode::Down => KeyAction::CursorDown,
        KeyCode::Left | KeyCode::Char('h') => KeyAction::Scroll { dx: -SCROLL_STEP * 2, dy: 0 },
        KeyCode::Right | KeyCode::Char('l') => KeyAction::Scroll { dx: SCROLL_STEP * 2, dy: 0 },
        KeyCode::Char('k') => KeyAction::Scroll { dx: 0, dy: -SCROLL_STEP },
        KeyCode::Char('j') => KeyAction::Scroll { dx: 0, dy: SCROLL_STEP },

        KeyCode::Home => KeyAction::ScrollHome,
        KeyCode::End => KeyAction::ScrollEnd,
        KeyCode::PageUp => KeyAction::Page { down: false },
        KeyCode::PageDown => KeyAction::Page { down: true },

        _ => KeyAction::None,
    }
}

/// Map a mouse event to an action.
pub fn handle_mouse_event(kind: MouseEventKind, column: u16, row: u16) -> MouseAction {
    match kind {
        MouseEventKind::Down(MouseButton::Left) => MouseAction::Click { column, row },
        MouseEventKind::Moved => MouseAction::Hover { column, row },
        MouseEventKind::ScrollUp => MouseAction::Scroll { dy: -SCROLL_STEP * 2 },
        MouseEventKind::ScrollDown => MouseAction::Scroll { dy: SCROLL_STEP * 2 },
        _ => MouseAction::None,
    }
}

/// Rows to scroll for one page of a viewport.
pub fn page_step(viewport_height: u16) -> i16 {
    ((viewport_height as f64 * PAGE_SCROLL_FACTOR) as i16).max(1)
}
