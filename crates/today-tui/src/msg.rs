#![forbid(unsafe_code)]

//! Application messages.

use crossterm::event::KeyEvent;

use crate::runtime::Event;

/// Everything that can drive an update.
#[derive(Debug)]
pub enum Msg {
    /// A key press or repeat.
    Key(KeyEvent),
    /// Terminal resized.
    Resize { width: u16, height: u16 },
    /// Splash animation frame tick (login screen only).
    AnimTick,
    /// Clock readout tick (clock screen only).
    ClockTick,
    /// The simulated login finished.
    LoginDone,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Msg::Key(key),
            Event::Resize { width, height } => Msg::Resize { width, height },
        }
    }
}
