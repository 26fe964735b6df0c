#![forbid(unsafe_code)]

//! The splash grid widget.
//!
//! Maps the sequencer's cell population onto the terminal: each logical cell
//! is a 2-column block so the grid reads roughly square. A cell's entry
//! direction shows as a directional half-block glyph for a short window
//! right after it is revealed, standing in for the sub-pixel slide a pixel
//! canvas would do; after the window the cell is a solid block of its color.
//!
//! Cells may overlap after the cluster-move phase; later cells in id order
//! simply paint over earlier ones.

use std::time::{Duration, Instant};

use today_core::{EntryDirection, GridCell};

use super::StatefulWidget;
use crate::geometry::Rect;
use crate::render::{Style, Surface};

/// Terminal columns per logical grid cell.
pub const CELL_COLS: u16 = 2;

/// How long the entry glyph lingers after a reveal.
const ENTRY_WINDOW: Duration = Duration::from_millis(120);

/// The splash grid for one frame.
pub struct SplashGrid<'a> {
    cells: &'a [GridCell],
    side: u8,
    now: Instant,
}

impl<'a> SplashGrid<'a> {
    /// Wrap the current population snapshot.
    #[must_use]
    pub fn new(cells: &'a [GridCell], side: u8, now: Instant) -> Self {
        Self { cells, side, now }
    }

    /// Terminal width of the rendered grid.
    #[must_use]
    pub fn width(side: u8) -> u16 {
        u16::from(side) * CELL_COLS
    }

    /// Terminal height of the rendered grid.
    #[must_use]
    pub fn height(side: u8) -> u16 {
        u16::from(side)
    }
}

/// Per-cell reveal timestamps, kept across frames to time entry glyphs.
#[derive(Debug, Default)]
pub struct SplashGridState {
    entered: Vec<Option<Instant>>,
}

impl StatefulWidget for SplashGrid<'_> {
    type State = SplashGridState;

    fn render(&self, area: Rect, surface: &mut Surface, state: &mut Self::State) {
        if state.entered.len() != self.cells.len() {
            state.entered = vec![None; self.cells.len()];
        }
        for cell in self.cells {
            if !cell.visible {
                continue;
            }
            let entered = *state.entered[usize::from(cell.id)].get_or_insert(self.now);

            let x = area.x + u16::from(cell.col) * CELL_COLS;
            let y = area.y + u16::from(cell.row);
            if x + CELL_COLS > area.right() || y >= area.bottom() {
                continue;
            }

            if self.now.duration_since(entered) < ENTRY_WINDOW {
                let [left, right] = entry_glyphs(cell.entry);
                let style = Style::new().fg(cell.color);
                surface.set(x, y, left, style);
                surface.set(x + 1, y, right, style);
            } else {
                let style = Style::new().bg(cell.color);
                surface.set(x, y, ' ', style);
                surface.set(x + 1, y, ' ', style);
            }
        }
    }
}

/// Half-block pair suggesting the direction a cell slides in from.
fn entry_glyphs(entry: EntryDirection) -> [char; 2] {
    match entry {
        EntryDirection::Up => ['▀', '▀'],
        EntryDirection::Down => ['▄', '▄'],
        EntryDirection::Left => ['▌', ' '],
        EntryDirection::Right => [' ', '▐'],
        EntryDirection::UpLeft => ['▘', ' '],
        EntryDirection::DownRight => [' ', '▗'],
        EntryDirection::DownLeft => ['▖', ' '],
        EntryDirection::UpRight => [' ', '▝'],
    }
}
