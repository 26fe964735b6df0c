#![forbid(unsafe_code)]

//! The login screen: splash grid, wordmark, and the email/password form.
//!
//! The splash sequencer is driven by the animation tick while this screen is
//! mounted; a successful (simulated) submit or a quit cancels it before the
//! screen goes away. If the terminal is too small to host the grid the
//! sequencer simply is not ticked; it stays in its idle state until there
//! is room.

use std::cell::RefCell;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use today_core::{Splash, SplashConfig};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::form;
use crate::geometry::Rect;
use crate::msg::Msg;
use crate::render::Surface;
use crate::runtime::Cmd;
use crate::theme;
use crate::widgets::grid::{SplashGrid, SplashGridState};
use crate::widgets::input::TextInput;
use crate::widgets::{StatefulWidget, Widget};

/// Simulated authentication delay; stands in for a real backend call.
const LOGIN_DELAY: Duration = Duration::from_secs(5);

/// Form field column width.
const FIELD_WIDTH: u16 = 24;

/// Minimum terminal size that fits the grid and the form.
const MIN_WIDTH: u16 = 30;
const MIN_HEIGHT: u16 = 17;

/// Loading spinner frames, advanced on animation ticks.
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
/// Animation ticks per spinner frame.
const SPINNER_SLOWDOWN: usize = 5;

/// Which form field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Email,
    Password,
}

/// State of the login screen.
pub struct LoginScreen {
    splash: Splash,
    /// Reveal timestamps live across frames; `view` takes `&self`.
    grid_state: RefCell<SplashGridState>,
    email: TextInput,
    password: TextInput,
    focus: Field,
    submitting: bool,
    error: Option<&'static str>,
    last_tick: Instant,
    spinner_tick: usize,
}

impl LoginScreen {
    /// Fresh screen with a fresh splash run.
    #[must_use]
    pub fn new() -> Self {
        let mut email = TextInput::new()
            .with_placeholder("email")
            .with_style(theme::field())
            .with_placeholder_style(theme::placeholder());
        email.set_focused(true);
        let password = TextInput::new()
            .with_mask('•')
            .with_placeholder("password")
            .with_style(theme::field())
            .with_placeholder_style(theme::placeholder());
        Self {
            splash: Splash::new(SplashConfig::default()),
            grid_state: RefCell::new(SplashGridState::default()),
            email,
            password,
            focus: Field::Email,
            submitting: false,
            error: None,
            last_tick: Instant::now(),
            spinner_tick: 0,
        }
    }

    /// Cancel the splash run. Must be called before the screen is dropped.
    pub fn cancel(&mut self) {
        self.splash.cancel();
    }

    /// Advance the splash by the wall-clock time since the last tick.
    ///
    /// With no room for the grid the sequencer is left untouched, so a run
    /// in a tiny terminal never starts.
    pub fn on_anim_tick(&mut self, term: (u16, u16)) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        if term.0 >= MIN_WIDTH && term.1 >= MIN_HEIGHT {
            self.splash.tick(dt);
        }
        if self.submitting {
            self.spinner_tick = self.spinner_tick.wrapping_add(1);
        }
    }

    /// Handle a key press.
    pub fn on_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        match key.code {
            KeyCode::Esc => {
                self.cancel();
                return Cmd::quit();
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
                // Two fields: forward and backward are the same toggle.
                self.set_focus(match self.focus {
                    Field::Email => Field::Password,
                    Field::Password => Field::Email,
                });
                return Cmd::none();
            }
            KeyCode::Enter => return self.submit(),
            _ => {}
        }
        if self.submitting {
            return Cmd::none();
        }
        let field = match self.focus {
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        };
        if field.handle_key(key) {
            self.error = None;
        }
        Cmd::none()
    }

    /// Whether both fields pass validation.
    #[must_use]
    pub fn form_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate(&self) -> Result<(), form::ValidationError> {
        form::required(self.email.value())?;
        form::email(self.email.value())?;
        form::required(self.password.value())?;
        Ok(())
    }

    fn submit(&mut self) -> Cmd<Msg> {
        if self.submitting {
            return Cmd::none();
        }
        if let Err(err) = self.validate() {
            self.error = Some(err.message);
            return Cmd::none();
        }
        self.error = None;
        self.submitting = true;
        debug!("login submitted");
        Cmd::task(|| {
            // Simulated network/auth delay; replace with a real call later.
            thread::sleep(LOGIN_DELAY);
            Msg::LoginDone
        })
    }

    fn set_focus(&mut self, focus: Field) {
        self.focus = focus;
        self.email.set_focused(focus == Field::Email);
        self.password.set_focused(focus == Field::Password);
    }

    /// Render the screen.
    pub fn view(&self, surface: &mut Surface) {
        let outer = Rect::from_size(surface.width(), surface.height());
        if outer.width < MIN_WIDTH || outer.height < MIN_HEIGHT {
            let hint = "Resize the terminal to log in";
            let area = outer.centered(hint.len() as u16, 1);
            surface.text(area.x, area.y, hint, theme::hint());
            return;
        }

        let side = self.splash.population().side();
        let grid_w = SplashGrid::width(side);
        let grid_h = SplashGrid::height(side);
        // Grid, wordmark, two fields, submit row, error row, plus spacing.
        let block_h = grid_h + 9;
        let block = outer.centered(FIELD_WIDTH.max(grid_w), block_h);

        let grid_area = Rect::new(
            block.x + (block.width - grid_w) / 2,
            block.y,
            grid_w,
            grid_h,
        );
        let grid = SplashGrid::new(self.splash.cells(), side, Instant::now());
        grid.render(grid_area, surface, &mut self.grid_state.borrow_mut());

        let center =
            |text: &str| block.x + (block.width.saturating_sub(text.width() as u16)) / 2;
        let wordmark_y = block.y + grid_h + 1;
        surface.text(center("Today"), wordmark_y, "Today", theme::wordmark());

        let field_x = block.x + (block.width - FIELD_WIDTH) / 2;
        let email_y = wordmark_y + 2;
        let password_y = email_y + 2;
        self.email
            .render(Rect::new(field_x, email_y, FIELD_WIDTH, 1), surface);
        self.password
            .render(Rect::new(field_x, password_y, FIELD_WIDTH, 1), surface);

        let submit_y = password_y + 2;
        if self.submitting {
            let frame = SPINNER[(self.spinner_tick / SPINNER_SLOWDOWN) % SPINNER.len()];
            surface.set(block.x + block.width / 2, submit_y, frame, theme::submit_ready());
        } else if self.form_valid() {
            let label = "→ enter to sign in";
            surface.text(center(label), submit_y, label, theme::submit_ready());
        } else {
            let label = "→";
            surface.text(center(label), submit_y, label, theme::hint());
        }

        if let Some(message) = self.error {
            let error_y = submit_y + 1;
            surface.text(center(message), error_y, message, theme::error());
        }
    }
}

impl Default for LoginScreen {
    fn default() -> Self {
        Self::new()
    }
}
