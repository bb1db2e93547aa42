use std::io;
use std::sync::Once;

use crossterm::{
    event::DisableMouseCapture,
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Restore the terminal after the full-screen dashboard.
///
/// Leaves the alternate screen, releases mouse capture, disables raw mode
/// and shows the cursor. Errors are ignored; this runs on exit paths where
/// nothing better can be done.
pub fn cleanup_terminal_crossterm() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        DisableMouseCapture,
        LeaveAlternateScreen,
        crossterm::cursor::Show
    );
}

/// Install a panic hook that restores terminal state before panicking.
///
/// Without it a panic inside the draw loop leaves the shell in raw mode on
/// the alternate screen. Safe to call multiple times.
pub fn install_crossterm_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            cleanup_terminal_crossterm();
            default_hook(panic_info);
        }));
    });
}

/// Truncate a string safely by character count, not byte count.
/// This ensures we don't break UTF-8 encoding by cutting mid-character.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        ".".repeat(max_chars)
    } else {
        let truncated: String = s.chars().take(max_chars - 1).collect();
        format!("{truncated}…")
    }
}
