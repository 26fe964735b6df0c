#![forbid(unsafe_code)]

//! Terminal lifecycle guard.
//!
//! Entering the UI takes the terminal into raw mode on the alternate screen
//! with the cursor hidden; every exit path must undo all three or the user's
//! shell is left unusable. The guard restores on drop, and a panic hook
//! restores before the panic message prints so it lands on the primary
//! screen.

use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor;
use crossterm::execute;
use crossterm::style::ResetColor;
use crossterm::terminal::{
    self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

/// Guards against double restore (drop after panic-hook restore).
static RESTORED: AtomicBool = AtomicBool::new(false);

/// Best-effort terminal restore; safe to call more than once.
fn restore() {
    if RESTORED.swap(true, Ordering::SeqCst) {
        return;
    }
    let _ = disable_raw_mode();
    let _ = execute!(
        io::stdout(),
        LeaveAlternateScreen,
        cursor::Show,
        ResetColor
    );
    let _ = io::stdout().flush();
}

/// RAII terminal session: raw mode + alternate screen + hidden cursor.
#[derive(Debug)]
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    /// Enter the session and install the restoring panic hook.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, cursor::Hide) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        RESTORED.store(false, Ordering::SeqCst);

        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore();
            previous(info);
        }));

        Ok(Self { _private: () })
    }

    /// Current terminal size in cells.
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore();
    }
}
