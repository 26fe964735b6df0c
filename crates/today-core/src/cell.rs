#![forbid(unsafe_code)]

//! Cell and population types.
//!
//! A [`Population`] is the full, fixed-size set of grid cells for one splash
//! run. The sequencer is its only writer; everything else reads snapshots.
//!
//! # Invariants
//!
//! 1. A population holds exactly `side × side` cells for its whole lifetime.
//! 2. `cells()[id as usize].id == id`: ids are assigned once, densely, in
//!    row-major creation order, and never reused.
//! 3. `row` and `col` stay within `[0, side)`.
//! 4. `visible` only ever flips false → true.

use crate::palette::{self, Rgb};

/// Direction a cell visually enters from when it is revealed.
///
/// Assigned cyclically at creation (`id % 8`) and immutable afterwards; only
/// the presentation layer interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDirection {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    DownRight,
    DownLeft,
    UpRight,
}

impl EntryDirection {
    /// All directions in cyclic assignment order.
    pub const ALL: [Self; 8] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::UpLeft,
        Self::DownRight,
        Self::DownLeft,
        Self::UpRight,
    ];

    /// Direction for a given cell id.
    #[must_use]
    pub const fn for_id(id: u16) -> Self {
        Self::ALL[(id % 8) as usize]
    }
}

/// One grid position.
///
/// Plain data; all behavior lives in the sequencer. Identity (and equality)
/// is the `id`; positional and visual fields are animation state.
#[derive(Debug, Clone, Copy)]
pub struct GridCell {
    /// Stable identity, assigned once at population creation.
    pub id: u16,
    /// Current row in `[0, side)`.
    pub row: u8,
    /// Current column in `[0, side)`.
    pub col: u8,
    /// Current color.
    pub color: Rgb,
    /// Whether the cell has been revealed yet.
    pub visible: bool,
    /// Visual entry direction tag.
    pub entry: EntryDirection,
}

impl PartialEq for GridCell {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GridCell {}

/// The full grid for one splash run.
#[derive(Debug, Clone)]
pub struct Population {
    side: u8,
    cells: Vec<GridCell>,
}

impl Population {
    /// Create a `side × side` population: every cell invisible, placeholder
    /// colored, sitting on its home coordinates.
    #[must_use]
    pub fn new(side: u8) -> Self {
        let mut cells = Vec::with_capacity(usize::from(side) * usize::from(side));
        for row in 0..side {
            for col in 0..side {
                let id = cells.len() as u16;
                cells.push(GridCell {
                    id,
                    row,
                    col,
                    color: palette::PLACEHOLDER,
                    visible: false,
                    entry: EntryDirection::for_id(id),
                });
            }
        }
        Self { side, cells }
    }

    /// Grid side length.
    #[must_use]
    pub fn side(&self) -> u8 {
        self.side
    }

    /// Number of cells (`side²`), constant for the lifetime of the run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the population is empty (only for a zero-sided grid).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read-only snapshot of every cell.
    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Mutable access by id. Ids are dense (invariant 2), so this is an
    /// index, not a search.
    pub(crate) fn cell_mut(&mut self, id: u16) -> &mut GridCell {
        &mut self.cells[usize::from(id)]
    }

    /// Mutable access to every cell, for whole-population updates.
    pub(crate) fn cells_mut(&mut self) -> &mut [GridCell] {
        &mut self.cells
    }
}
