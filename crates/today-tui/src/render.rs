#![forbid(unsafe_code)]

//! Cell surface and presenter.
//!
//! `view` code draws styled characters into a [`Surface`]; [`present`]
//! repaints the whole surface through crossterm. The UI here is a handful of
//! small screens, so there is no damage tracking; a full repaint at the
//! frame cadence is far below what a terminal handles comfortably.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use today_core::Rgb;
use unicode_width::UnicodeWidthChar;

/// Character style: colors fall back to the terminal defaults when unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub bold: bool,
    pub reverse: bool,
}

impl Style {
    /// Terminal-default style.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: false,
            reverse: false,
        }
    }

    /// Set the foreground color (builder).
    #[must_use]
    pub const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color (builder).
    #[must_use]
    pub const fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    /// Enable bold (builder).
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Enable reverse video (builder).
    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// One terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermCell {
    pub ch: char,
    pub style: Style,
}

impl Default for TermCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::new(),
        }
    }
}

/// A write-only grid of styled characters, rebuilt every frame by `view`.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u16,
    height: u16,
    cells: Vec<TermCell>,
}

impl Surface {
    /// Create a blank surface.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![TermCell::default(); usize::from(width) * usize::from(height)],
        }
    }

    /// Width in cells.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Reset every cell to the default blank.
    pub fn clear(&mut self) {
        self.cells.fill(TermCell::default());
    }

    /// Resize to the new terminal dimensions, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), TermCell::default());
    }

    /// Write one character. Out-of-bounds writes are clipped.
    pub fn set(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if x < self.width && y < self.height {
            let index = usize::from(y) * usize::from(self.width) + usize::from(x);
            self.cells[index] = TermCell { ch, style };
        }
    }

    /// Read one cell, if in bounds.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&TermCell> {
        if x < self.width && y < self.height {
            self.cells
                .get(usize::from(y) * usize::from(self.width) + usize::from(x))
        } else {
            None
        }
    }

    /// Write a string starting at `(x, y)`, clipping at the right edge.
    /// Wide characters occupy two cells (the trailing cell stays blank).
    pub fn text(&mut self, x: u16, y: u16, text: &str, style: Style) {
        let mut col = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if col >= self.width.saturating_sub(w - 1) {
                break;
            }
            self.set(col, y, ch, style);
            if w == 2 {
                self.set(col + 1, y, ' ', style);
            }
            col += w;
        }
    }

    /// Fill a span of `len` cells on row `y` with `ch`.
    pub fn fill(&mut self, x: u16, y: u16, len: u16, ch: char, style: Style) {
        for dx in 0..len {
            self.set(x + dx, y, ch, style);
        }
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Repaint the whole surface.
///
/// Styles are batched: escape sequences are only emitted where consecutive
/// cells differ, which keeps a full repaint of this UI to a few hundred
/// bytes.
pub fn present(out: &mut impl Write, surface: &Surface) -> io::Result<()> {
    let mut current: Option<Style> = None;
    for y in 0..surface.height() {
        queue!(out, MoveTo(0, y))?;
        let mut skip_filler = false;
        for x in 0..surface.width() {
            let Some(cell) = surface.get(x, y) else {
                continue;
            };
            if skip_filler {
                // The previous wide character already covered this column.
                skip_filler = false;
                continue;
            }
            if current != Some(cell.style) {
                apply_style(out, cell.style)?;
                current = Some(cell.style);
            }
            queue!(out, Print(cell.ch))?;
            skip_filler = cell.ch.width() == Some(2);
        }
    }
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    out.flush()
}

fn apply_style(out: &mut impl Write, style: Style) -> io::Result<()> {
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    if let Some(fg) = style.fg {
        queue!(out, SetForegroundColor(color(fg)))?;
    }
    if let Some(bg) = style.bg {
        queue!(out, SetBackgroundColor(color(bg)))?;
    }
    if style.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.reverse {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_surface_is_spaces() {
        let surface = Surface::new(4, 2);
        for y in 0..2 {
            for x in 0..4 {
                assert_eq!(surface.get(x, y).map(|c| c.ch), Some(' '));
            }
        }
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut surface = Surface::new(4, 2);
        let style = Style::new().bold();
        surface.set(1, 1, 'x', style);
        let cell = surface.get(1, 1).copied();
        assert_eq!(cell, Some(TermCell { ch: 'x', style }));
    }

    #[test]
    fn out_of_bounds_writes_are_clipped() {
        let mut surface = Surface::new(4, 2);
        surface.set(4, 0, 'x', Style::new());
        surface.set(0, 2, 'x', Style::new());
        assert!(surface.get(4, 0).is_none());
        assert!(surface.cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn text_clips_at_right_edge() {
        let mut surface = Surface::new(4, 1);
        surface.text(2, 0, "hello", Style::new());
        assert_eq!(surface.get(2, 0).map(|c| c.ch), Some('h'));
        assert_eq!(surface.get(3, 0).map(|c| c.ch), Some('e'));
        // Nothing wrapped to a following row.
        assert_eq!(surface.get(0, 0).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let mut surface = Surface::new(6, 1);
        surface.text(0, 0, "今x", Style::new());
        assert_eq!(surface.get(0, 0).map(|c| c.ch), Some('今'));
        assert_eq!(surface.get(1, 0).map(|c| c.ch), Some(' '));
        assert_eq!(surface.get(2, 0).map(|c| c.ch), Some('x'));
    }

    #[test]
    fn resize_clears_content() {
        let mut surface = Surface::new(4, 2);
        surface.set(0, 0, 'x', Style::new());
        surface.resize(5, 3);
        assert_eq!(surface.width(), 5);
        assert_eq!(surface.height(), 3);
        assert_eq!(surface.get(0, 0).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn present_emits_every_row() {
        let mut surface = Surface::new(3, 2);
        surface.text(0, 0, "ab", Style::new().fg(Rgb::new(1, 2, 3)));
        let mut out: Vec<u8> = Vec::new();
        present(&mut out, &surface).expect("writing to a Vec cannot fail");
        let rendered = String::from_utf8_lossy(&out);
        assert!(rendered.contains('a'));
        assert!(rendered.contains('b'));
    }
}
