#![forbid(unsafe_code)]

//! Active screen of the application.

/// Which view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveScreen {
    /// Splash grid and login form.
    Login,
    /// Clock / year-progress readout.
    Clock,
}

impl ActiveScreen {
    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Clock => "Clock",
        }
    }
}
