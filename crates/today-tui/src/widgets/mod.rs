#![forbid(unsafe_code)]

//! Widgets for the splash and clock screens.

pub mod grid;
pub mod input;

use crate::geometry::Rect;
use crate::render::Surface;

/// A `Widget` renders itself into a surface within a given area.
pub trait Widget {
    fn render(&self, area: Rect, surface: &mut Surface);
}

/// A `StatefulWidget` renders with mutable state that outlives one frame.
pub trait StatefulWidget {
    type State;

    fn render(&self, area: Rect, surface: &mut Surface, state: &mut Self::State);
}
