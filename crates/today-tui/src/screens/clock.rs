#![forbid(unsafe_code)]

//! The clock screen: cycling time / percent-of-year / day-of-year readout.
//!
//! The readout refreshes on a timer whose cadence depends on the mode (the
//! percent display moves fast enough to warrant 100 ms). Every refresh and
//! every mode change mirrors the text into the terminal title.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use time::{OffsetDateTime, UtcOffset};
use unicode_width::UnicodeWidthStr;

use crate::geometry::Rect;
use crate::msg::Msg;
use crate::readout::{self, ReadoutMode};
use crate::render::Surface;
use crate::runtime::Cmd;
use crate::theme;

/// State of the clock screen.
pub struct ClockScreen {
    mode: ReadoutMode,
    offset: UtcOffset,
    now: OffsetDateTime,
}

impl ClockScreen {
    /// Create the screen with the process-wide local offset.
    #[must_use]
    pub fn new(offset: UtcOffset) -> Self {
        Self {
            mode: ReadoutMode::default(),
            offset,
            now: OffsetDateTime::now_utc().to_offset(offset),
        }
    }

    /// Current refresh cadence.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.mode.tick_interval()
    }

    /// The current readout text.
    #[must_use]
    pub fn readout(&self) -> String {
        readout::readout_text(self.mode, self.now)
    }

    /// Refresh the clock and mirror it into the title.
    pub fn on_tick(&mut self) -> Cmd<Msg> {
        self.now = OffsetDateTime::now_utc().to_offset(self.offset);
        Cmd::set_title(self.readout())
    }

    /// Handle a key press.
    pub fn on_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Cmd::quit(),
            KeyCode::Char('t') | KeyCode::Char(' ') => {
                self.mode = self.mode.next();
                // Retitle immediately rather than waiting out the old cadence.
                self.on_tick()
            }
            _ => Cmd::none(),
        }
    }

    /// Render the screen.
    pub fn view(&self, surface: &mut Surface) {
        let outer = Rect::from_size(surface.width(), surface.height());

        // Mode toggle hint in the top-right corner.
        let hint = self.mode.toggle_hint();
        if outer.width > 4 {
            surface.text(outer.width - 3, 1, hint, theme::hint());
        }

        let text = self.readout();
        let area = outer.centered(text.width() as u16, 1);
        surface.text(area.x, area.y, &text, theme::readout());

        let help = "t: toggle · q: quit";
        if outer.height > 2 {
            let x = outer.x + (outer.width.saturating_sub(help.width() as u16)) / 2;
            surface.text(x, outer.height - 2, help, theme::hint());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn toggle_cycles_modes_and_retitles() {
        let mut screen = ClockScreen::new(UtcOffset::UTC);
        assert_eq!(screen.tick_interval(), Duration::from_millis(1000));
        let cmd = screen.on_key(key(KeyCode::Char('t')));
        assert!(matches!(cmd, Cmd::SetTitle(_)));
        assert_eq!(screen.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn quit_keys_quit() {
        let mut screen = ClockScreen::new(UtcOffset::UTC);
        assert!(matches!(screen.on_key(key(KeyCode::Esc)), Cmd::Quit));
        assert!(matches!(screen.on_key(key(KeyCode::Char('q'))), Cmd::Quit));
    }

    #[test]
    fn tick_mirrors_readout_into_title() {
        let mut screen = ClockScreen::new(UtcOffset::UTC);
        let cmd = screen.on_tick();
        match cmd {
            Cmd::SetTitle(title) => assert_eq!(title, screen.readout()),
            other => panic!("expected SetTitle, got {other:?}"),
        }
    }

    #[test]
    fn view_renders_at_many_sizes() {
        let screen = ClockScreen::new(UtcOffset::UTC);
        for (w, h) in [(0, 0), (5, 2), (40, 12), (200, 60)] {
            let mut surface = Surface::new(w, h);
            screen.view(&mut surface);
        }
    }
}
