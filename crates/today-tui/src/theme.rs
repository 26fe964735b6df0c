#![forbid(unsafe_code)]

//! App colors and text styles.

use today_core::Rgb;

use crate::render::Style;

/// Muted gray for hints, placeholders, and the disabled submit arrow.
pub const DIM: Rgb = Rgb::new(0x6B, 0x72, 0x80);
/// Validation error text.
pub const ERROR: Rgb = Rgb::new(0xD6, 0x45, 0x50);
/// Input field background.
pub const FIELD_BG: Rgb = Rgb::new(0x24, 0x29, 0x33);
/// Accent (matches the splash highlight).
pub const ACCENT: Rgb = today_core::palette::HIGHLIGHT;

/// The "Today" wordmark under the grid.
#[must_use]
pub const fn wordmark() -> Style {
    Style::new().bold()
}

/// Secondary text.
#[must_use]
pub const fn hint() -> Style {
    Style::new().fg(DIM)
}

/// Validation errors.
#[must_use]
pub const fn error() -> Style {
    Style::new().fg(ERROR)
}

/// Input field body.
#[must_use]
pub const fn field() -> Style {
    Style::new().bg(FIELD_BG)
}

/// Input placeholder text.
#[must_use]
pub const fn placeholder() -> Style {
    Style::new().fg(DIM).bg(FIELD_BG)
}

/// Submit affordance when the form is ready.
#[must_use]
pub const fn submit_ready() -> Style {
    Style::new().fg(ACCENT).bold()
}

/// The big clock readout.
#[must_use]
pub const fn readout() -> Style {
    Style::new().bold()
}
