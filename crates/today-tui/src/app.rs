#![forbid(unsafe_code)]

//! Application model: screen routing and subscriptions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::msg::Msg;
use crate::readout;
use crate::render::Surface;
use crate::runtime::subscription::{Every, Subscription};
use crate::runtime::{Cmd, Model};
use crate::screen::ActiveScreen;
use crate::screens::clock::ClockScreen;
use crate::screens::login::LoginScreen;

/// Subscription id for the splash animation ticker.
const SUB_ANIM: u64 = 1;
/// Subscription id for the clock readout ticker.
const SUB_CLOCK: u64 = 2;

/// Splash animation frame cadence.
const ANIM_INTERVAL: std::time::Duration = std::time::Duration::from_millis(16);

/// The Today application.
pub struct TodayApp {
    screen: ActiveScreen,
    /// Present while the login screen is mounted; dropped (after splash
    /// cancellation) when the view switches away.
    login: Option<LoginScreen>,
    clock: ClockScreen,
    term: (u16, u16),
}

impl TodayApp {
    /// Build the app. Captures the local UTC offset now, before the runtime
    /// spawns any threads.
    #[must_use]
    pub fn new() -> Self {
        let offset = readout::capture_local_offset();
        Self {
            screen: ActiveScreen::Login,
            login: Some(LoginScreen::new()),
            clock: ClockScreen::new(offset),
            term: (0, 0),
        }
    }

    /// Cancel the splash (if still mounted) ahead of shutdown or a screen
    /// switch, then drop the login screen.
    fn unmount_login(&mut self) {
        if let Some(mut login) = self.login.take() {
            login.cancel();
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        // Ctrl+C always quits; raw mode delivers it as a plain key event.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.unmount_login();
            return Cmd::quit();
        }
        match self.screen {
            ActiveScreen::Login => {
                let cmd = match self.login.as_mut() {
                    Some(login) => login.on_key(key),
                    None => Cmd::none(),
                };
                if matches!(cmd, Cmd::Quit) {
                    // The login screen has already cancelled its splash.
                    self.login = None;
                }
                cmd
            }
            ActiveScreen::Clock => self.clock.on_key(key),
        }
    }
}

impl Default for TodayApp {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for TodayApp {
    type Message = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        Cmd::set_title("Today")
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Key(key) => self.on_key(key),
            Msg::Resize { width, height } => {
                self.term = (width, height);
                Cmd::none()
            }
            Msg::AnimTick => {
                if let Some(login) = self.login.as_mut() {
                    login.on_anim_tick(self.term);
                }
                Cmd::none()
            }
            Msg::ClockTick => {
                if self.screen == ActiveScreen::Clock {
                    self.clock.on_tick()
                } else {
                    Cmd::none()
                }
            }
            Msg::LoginDone => {
                debug!(screen = ActiveScreen::Clock.label(), "switching screen");
                self.unmount_login();
                self.screen = ActiveScreen::Clock;
                self.clock.on_tick()
            }
        }
    }

    fn view(&self, surface: &mut Surface) {
        match self.screen {
            ActiveScreen::Login => {
                if let Some(login) = self.login.as_ref() {
                    login.view(surface);
                }
            }
            ActiveScreen::Clock => self.clock.view(surface),
        }
    }

    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Msg>>> {
        match self.screen {
            ActiveScreen::Login => vec![Box::new(Every::new(SUB_ANIM, ANIM_INTERVAL, || {
                Msg::AnimTick
            }))],
            ActiveScreen::Clock => vec![Box::new(Every::new(
                SUB_CLOCK,
                self.clock.tick_interval(),
                || Msg::ClockTick,
            ))],
        }
    }
}
