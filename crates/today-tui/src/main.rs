#![forbid(unsafe_code)]

//! Today: a splash login screen and a year-progress clock for the terminal.

mod app;
mod form;
mod geometry;
mod msg;
mod readout;
mod render;
mod runtime;
mod screen;
mod screens;
mod terminal;
mod theme;
mod widgets;

use runtime::Program;

fn main() -> std::io::Result<()> {
    let app = app::TodayApp::new();
    Program::new(app)?.run()
}
