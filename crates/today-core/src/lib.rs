#![forbid(unsafe_code)]

//! Splash-grid choreography engine.
//!
//! This crate owns the animated login grid: a fixed population of cells that
//! a time-driven sequencer walks through a scripted, randomized multi-phase
//! run (reveal → grouping → color-assign → cluster-move → reset → spotlight).
//!
//! The engine is deliberately free of timers, threads, and I/O. All progress
//! happens through [`Splash::tick`], which consumes a `Duration` of elapsed
//! time and applies every mutation that became due inside it. A host runtime
//! feeds it real frame deltas; a test feeds it arbitrary durations and
//! fast-forwards an entire run synchronously.
//!
//! [`Splash::tick`]: sequencer::Splash::tick

pub mod cell;
pub mod palette;
pub mod rng;
pub mod sequencer;

pub use cell::{EntryDirection, GridCell, Population};
pub use palette::{Rgb, pick_palette};
pub use rng::Rng;
pub use sequencer::{Phase, Splash, SplashConfig};
