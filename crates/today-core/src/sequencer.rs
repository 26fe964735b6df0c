#![forbid(unsafe_code)]

//! The splash choreography state machine.
//!
//! One [`Splash`] owns one [`Population`] and drives it through a fixed
//! phase script with randomized ordering and delays:
//!
//! 1. **Idle**: population created, nothing visible.
//! 2. **Reveal**: cells become visible one at a time in a shuffled order,
//!    5–20 ms apart, then a 100 ms settle.
//! 3. **Grouping**: `k ∈ [3, 10]` buckets are drawn by round-robin over a
//!    shuffled id order, one palette color per bucket (single step, no time
//!    passes).
//! 4. **Color-assign**: bucket by bucket, each cell takes its bucket color,
//!    8–20 ms apart, then a 150 ms settle.
//! 5. **Cluster-move**: every bucket gets a centroid in the inner 70% of
//!    the container; every cell gets a polar target around its centroid and
//!    an independent delay below 150 ms. Moves apply as their delays expire,
//!    in no guaranteed order; the phase ends only when all have applied.
//! 6. **Reset**: 200 ms pause, then every color back to the placeholder in
//!    one step.
//! 7. **Spotlight**: 100 ms pause, then `m ∈ [5, 10]` cells drawn from the
//!    full id range turn the highlight color. Terminal: the grid stays like
//!    this until the run is dropped.
//!
//! # Advancement model
//!
//! There are no timers in here. [`Splash::tick`] consumes elapsed time:
//! a single countdown guards the next sequential step, and `tick` keeps
//! applying due steps until the budget runs out, so an arbitrarily large
//! `dt` fast-forwards the whole script losslessly, which is also how the
//! tests drive it. Only cluster-move holds multiple armed deadlines at once;
//! it shares one phase clock and completes as a barrier.
//!
//! # Cancellation
//!
//! [`Splash::cancel`] is cooperative: the flag is checked before every step
//! application, a cancelled sequencer never mutates or advances again, and
//! the last snapshot stays frozen for as long as the host keeps it around.
//!
//! # Invariants
//!
//! 1. `cells().len()` is constant for the run.
//! 2. `visible` never reverts to false.
//! 3. `row`/`col` stay in `[0, side)`; targets are clamped after the
//!    pixel-to-grid conversion.
//! 4. Every color is the placeholder, a base-palette entry, or the
//!    highlight.

use std::time::Duration;

use tracing::debug;

use crate::cell::{GridCell, Population};
use crate::palette::{self, Rgb, pick_palette};
use crate::rng::Rng;

// ---------------------------------------------------------------------------
// Timing and geometry constants
// ---------------------------------------------------------------------------

/// Per-cell reveal delay bounds, microseconds.
const REVEAL_DELAY_US: (u64, u64) = (5_000, 20_000);
/// Settle after the last reveal.
const REVEAL_SETTLE: Duration = Duration::from_millis(100);
/// Bucket count bounds, inclusive.
const GROUPS: (u64, u64) = (3, 10);
/// Per-cell color-assign delay bounds, microseconds.
const ASSIGN_DELAY_US: (u64, u64) = (8_000, 20_000);
/// Settle after the last color assignment.
const ASSIGN_SETTLE: Duration = Duration::from_millis(150);
/// Upper bound for the independent per-cell move delay, microseconds.
const MOVE_DELAY_MAX_US: u64 = 150_000;
/// Pause between the move barrier and the color reset.
const RESET_DELAY: Duration = Duration::from_millis(200);
/// Pause between the reset and the spotlight.
const SPOTLIGHT_DELAY: Duration = Duration::from_millis(100);
/// Spotlight pick count bounds, inclusive.
const SPOTLIGHT_PICKS: (u64, u64) = (5, 10);

/// Centroids land in the middle 70% of the container…
const CENTROID_SPAN: f32 = 0.70;
/// …offset 15% from the edge on each axis.
const CENTROID_MARGIN: f32 = 0.15;
/// Base scatter radius around a centroid.
const RADIUS_BASE: f32 = 2.0;
/// Radius growth per step of bucket membership.
const RADIUS_STEP: f32 = 3.0;
/// Membership positions per radius step cycle.
const RADIUS_CYCLE: usize = 4;
/// Random radius jitter upper bound.
const RADIUS_JITTER: f32 = 3.0;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Grid geometry for a splash run.
///
/// `cell_size` and `cell_gap` are logical units used only to convert the
/// continuous cluster-move targets back to grid coordinates.
#[derive(Debug, Clone, Copy)]
pub struct SplashConfig {
    /// Grid side length N (N×N cells).
    pub side: u8,
    /// Logical size of one cell.
    pub cell_size: f32,
    /// Logical gap between cells.
    pub cell_gap: f32,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            side: 7,
            cell_size: 4.0,
            cell_gap: 1.0,
        }
    }
}

impl SplashConfig {
    /// Logical edge length of the whole grid.
    #[must_use]
    pub fn container(&self) -> f32 {
        let side = f32::from(self.side);
        side * self.cell_size + (side - 1.0).max(0.0) * self.cell_gap
    }

    /// Center-to-center distance between neighbouring cells.
    fn pitch(&self) -> f32 {
        self.cell_size + self.cell_gap
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Public phase of the choreography, for diagnostics and traces.
///
/// `Grouping` is computed in a single step, so it is only ever observed
/// through traces; after the terminal spotlight the phase stays `Spotlight`
/// (check [`Splash::finished`] to tell the two apart).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Reveal,
    Grouping,
    ColorAssign,
    ClusterMove,
    Reset,
    Spotlight,
}

/// One scheduled cluster-move mutation.
#[derive(Debug, Clone, Copy)]
struct PendingMove {
    due: Duration,
    id: u16,
    row: u8,
    col: u8,
}

/// Internal step of the state machine.
///
/// Sequential steps are guarded by the shared `wait` countdown; `Move` keeps
/// its own phase clock because its deadlines are armed concurrently.
#[derive(Debug)]
enum Step {
    Begin,
    Reveal {
        order: Vec<u16>,
        next: usize,
    },
    Group,
    Assign {
        queue: Vec<(u16, Rgb)>,
        next: usize,
        buckets: Vec<Vec<u16>>,
    },
    Move {
        pending: Vec<PendingMove>,
        clock: Duration,
        applied: usize,
    },
    Reset,
    Spotlight,
    Done,
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// The splash sequencer: exclusive owner of one grid population.
#[derive(Debug)]
pub struct Splash {
    config: SplashConfig,
    population: Population,
    rng: Rng,
    step: Step,
    /// Time left until the next sequential step applies.
    wait: Duration,
    cancelled: bool,
}

impl Splash {
    /// Start a fresh run with entropy seeding.
    #[must_use]
    pub fn new(config: SplashConfig) -> Self {
        Self::with_rng(config, Rng::from_entropy())
    }

    /// Start a fresh run with a caller-provided generator (tests pin seeds
    /// through this).
    #[must_use]
    pub fn with_rng(config: SplashConfig, rng: Rng) -> Self {
        Self {
            config,
            population: Population::new(config.side),
            rng,
            step: Step::Begin,
            wait: Duration::ZERO,
            cancelled: false,
        }
    }

    /// Read-only snapshot of the current population.
    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        self.population.cells()
    }

    /// The owned population.
    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.step {
            Step::Begin => Phase::Idle,
            Step::Reveal { .. } => Phase::Reveal,
            Step::Group => Phase::Grouping,
            Step::Assign { .. } => Phase::ColorAssign,
            Step::Move { .. } => Phase::ClusterMove,
            Step::Reset => Phase::Reset,
            Step::Spotlight | Step::Done => Phase::Spotlight,
        }
    }

    /// Whether the terminal spotlight state has been reached.
    #[must_use]
    pub fn finished(&self) -> bool {
        matches!(self.step, Step::Done)
    }

    /// Request cancellation. Idempotent; takes effect before the next step
    /// application, freezing the snapshot as it is now.
    pub fn cancel(&mut self) {
        if !self.cancelled {
            self.cancelled = true;
            debug!(phase = ?self.phase(), "splash cancelled");
        }
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Advance the choreography by `dt`.
    ///
    /// Applies every mutation that becomes due within `dt`, crossing as many
    /// step and phase boundaries as the budget covers. A no-op once the run
    /// is finished or cancelled.
    pub fn tick(&mut self, dt: Duration) {
        let mut budget = dt;
        loop {
            if self.cancelled || matches!(self.step, Step::Done) {
                return;
            }
            if matches!(self.step, Step::Move { .. }) {
                budget = self.advance_moves(budget);
                if matches!(self.step, Step::Move { .. }) {
                    // Budget exhausted inside the move phase.
                    return;
                }
                continue;
            }
            if budget < self.wait {
                self.wait -= budget;
                return;
            }
            budget -= self.wait;
            self.wait = Duration::ZERO;
            self.advance_step();
        }
    }

    /// Apply the next sequential step. Called with the countdown expired;
    /// leaves the next countdown armed.
    fn advance_step(&mut self) {
        let step = std::mem::replace(&mut self.step, Step::Done);
        match step {
            Step::Begin => {
                let mut order: Vec<u16> = (0..self.population.len() as u16).collect();
                self.rng.shuffle(&mut order);
                debug!(cells = order.len(), "reveal starting");
                self.step = Step::Reveal { order, next: 0 };
            }
            Step::Reveal { order, mut next } => {
                if let Some(&id) = order.get(next) {
                    self.population.cell_mut(id).visible = true;
                    next += 1;
                    self.wait = if next < order.len() {
                        self.delay(REVEAL_DELAY_US)
                    } else {
                        REVEAL_SETTLE
                    };
                    self.step = Step::Reveal { order, next };
                } else {
                    self.step = Step::Group;
                }
            }
            Step::Group => {
                let k = self.rng.range_u64(GROUPS.0, GROUPS.1) as usize;
                let colors = pick_palette(k, &mut self.rng);
                let mut ids: Vec<u16> = (0..self.population.len() as u16).collect();
                self.rng.shuffle(&mut ids);
                let mut buckets: Vec<Vec<u16>> = vec![Vec::new(); k];
                for (i, &id) in ids.iter().enumerate() {
                    buckets[i % k].push(id);
                }
                // Flatten to bucket-sequential assignment order up front; the
                // modulo matches color to bucket even though k never exceeds
                // the palette draw here.
                let queue: Vec<(u16, Rgb)> = buckets
                    .iter()
                    .enumerate()
                    .flat_map(|(gi, bucket)| {
                        let color = colors[gi % colors.len()];
                        bucket.iter().map(move |&id| (id, color))
                    })
                    .collect();
                debug!(groups = k, "groups drawn");
                self.step = Step::Assign {
                    queue,
                    next: 0,
                    buckets,
                };
            }
            Step::Assign {
                queue,
                mut next,
                buckets,
            } => {
                if let Some(&(id, color)) = queue.get(next) {
                    self.population.cell_mut(id).color = color;
                    next += 1;
                    self.wait = if next < queue.len() {
                        self.delay(ASSIGN_DELAY_US)
                    } else {
                        ASSIGN_SETTLE
                    };
                    self.step = Step::Assign {
                        queue,
                        next,
                        buckets,
                    };
                } else {
                    let mut pending = self.plan_moves(&buckets);
                    pending.sort_by_key(|m| m.due);
                    debug!(moves = pending.len(), "cluster move starting");
                    self.step = Step::Move {
                        pending,
                        clock: Duration::ZERO,
                        applied: 0,
                    };
                }
            }
            Step::Move { .. } => {
                unreachable!("cluster move advances through advance_moves")
            }
            Step::Reset => {
                for cell in self.population.cells_mut() {
                    cell.color = palette::PLACEHOLDER;
                }
                debug!("colors reset");
                self.wait = SPOTLIGHT_DELAY;
                self.step = Step::Spotlight;
            }
            Step::Spotlight => {
                let m = self.rng.range_u64(SPOTLIGHT_PICKS.0, SPOTLIGHT_PICKS.1) as usize;
                // Always drawn over the full id range; the id set is
                // invariant for the run, regardless of any snapshot.
                let mut ids: Vec<u16> = (0..self.population.len() as u16).collect();
                self.rng.shuffle(&mut ids);
                let picked = m.min(ids.len());
                for &id in ids.iter().take(picked) {
                    self.population.cell_mut(id).color = palette::HIGHLIGHT;
                }
                debug!(picked, "spotlight applied");
                self.step = Step::Done;
            }
            Step::Done => {}
        }
    }

    /// Advance the cluster-move phase clock by `budget`, applying every move
    /// whose deadline passes. Returns the unused remainder once the barrier
    /// is crossed, `ZERO` otherwise.
    fn advance_moves(&mut self, budget: Duration) -> Duration {
        if self.cancelled {
            return Duration::ZERO;
        }
        let Step::Move {
            pending,
            clock,
            applied,
        } = &mut self.step
        else {
            return budget;
        };
        let target = clock.saturating_add(budget);
        while *applied < pending.len() && pending[*applied].due <= target {
            let mv = pending[*applied];
            let cell = self.population.cell_mut(mv.id);
            cell.row = mv.row;
            cell.col = mv.col;
            *applied += 1;
        }
        if *applied == pending.len() {
            let last_due = pending.last().map(|m| m.due).unwrap_or_default();
            debug!("cluster move complete");
            self.wait = RESET_DELAY;
            self.step = Step::Reset;
            target.saturating_sub(last_due)
        } else {
            *clock = target;
            Duration::ZERO
        }
    }

    /// Plan one move per cell: a polar offset around the owning bucket's
    /// centroid, converted to grid coordinates and clamped, with an
    /// independent delay.
    fn plan_moves(&mut self, buckets: &[Vec<u16>]) -> Vec<PendingMove> {
        let container = self.config.container();
        let pitch = self.config.pitch();
        let hi = i32::from(self.config.side.saturating_sub(1));
        let mut pending = Vec::with_capacity(self.population.len());
        for bucket in buckets {
            let cx = container * CENTROID_MARGIN + self.rng.range_f32(0.0, container * CENTROID_SPAN);
            let cy = container * CENTROID_MARGIN + self.rng.range_f32(0.0, container * CENTROID_SPAN);
            for (member, &id) in bucket.iter().enumerate() {
                let angle = self.rng.range_f32(0.0, std::f32::consts::TAU);
                let radius = RADIUS_BASE
                    + (member % RADIUS_CYCLE) as f32 * RADIUS_STEP
                    + self.rng.range_f32(0.0, RADIUS_JITTER);
                let x = cx + angle.cos() * radius;
                let y = cy + angle.sin() * radius;
                let col = ((x / pitch).round() as i32).clamp(0, hi) as u8;
                let row = ((y / pitch).round() as i32).clamp(0, hi) as u8;
                let due = Duration::from_micros(self.rng.range_u64(0, MOVE_DELAY_MAX_US));
                pending.push(PendingMove { due, id, row, col });
            }
        }
        pending
    }

    /// Draw a random delay from inclusive microsecond bounds.
    fn delay(&mut self, bounds_us: (u64, u64)) -> Duration {
        Duration::from_micros(self.rng.range_u64(bounds_us.0, bounds_us.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{BASE_PALETTE, HIGHLIGHT, PLACEHOLDER};
    use std::collections::HashSet;

    const STEP: Duration = Duration::from_millis(1);
    /// Comfortably longer than any possible full run.
    const FOREVER: Duration = Duration::from_secs(10);

    fn splash(seed: u64) -> Splash {
        Splash::with_rng(SplashConfig::default(), Rng::from_seed(seed))
    }

    /// Tick in 1ms steps until the phase changes, collecting nothing.
    fn tick_until(s: &mut Splash, phase: Phase) {
        for _ in 0..20_000 {
            if s.phase() == phase {
                return;
            }
            s.tick(STEP);
        }
        panic!("phase {phase:?} never reached (stuck at {:?})", s.phase());
    }

    #[test]
    fn idle_until_first_tick() {
        let s = splash(1);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.cells().len(), 49);
        assert!(s.cells().iter().all(|c| !c.visible));
        assert!(s.cells().iter().all(|c| c.color == PLACEHOLDER));
    }

    #[test]
    fn ids_unique_and_in_range() {
        let s = splash(2);
        let ids: HashSet<u16> = s.cells().iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 49);
        assert!(ids.iter().all(|&id| id < 49));
    }

    #[test]
    fn first_tick_reveals_a_cell() {
        let mut s = splash(3);
        s.tick(Duration::from_micros(1));
        assert_eq!(s.phase(), Phase::Reveal);
        assert_eq!(s.cells().iter().filter(|c| c.visible).count(), 1);
    }

    #[test]
    fn reveal_completes_with_all_visible() {
        let mut s = splash(4);
        tick_until(&mut s, Phase::ColorAssign);
        assert!(s.cells().iter().all(|c| c.visible));
    }

    #[test]
    fn visibility_is_monotonic() {
        let mut s = splash(5);
        let mut seen = vec![false; 49];
        while !s.finished() {
            s.tick(STEP);
            for cell in s.cells() {
                let was = seen[usize::from(cell.id)];
                assert!(!(was && !cell.visible), "cell {} went invisible", cell.id);
                seen[usize::from(cell.id)] = cell.visible;
            }
        }
        assert!(seen.iter().all(|&v| v));
    }

    #[test]
    fn color_assign_paints_balanced_groups() {
        let mut s = splash(6);
        tick_until(&mut s, Phase::ClusterMove);
        // At the cluster-move boundary every cell carries its bucket color.
        let mut by_color: std::collections::HashMap<Rgb, usize> = std::collections::HashMap::new();
        for cell in s.cells() {
            assert_ne!(cell.color, PLACEHOLDER);
            assert!(BASE_PALETTE.contains(&cell.color));
            *by_color.entry(cell.color).or_default() += 1;
        }
        let k = by_color.len();
        assert!((3..=10).contains(&k), "distinct colors: {k}");
        // Round-robin balance: sizes differ by at most one and sum to 49.
        let max = by_color.values().max().copied().unwrap_or(0);
        let min = by_color.values().min().copied().unwrap_or(0);
        assert!(max - min <= 1, "bucket sizes {min}..{max}");
        assert_eq!(by_color.values().sum::<usize>(), 49);
    }

    #[test]
    fn coordinates_stay_in_bounds_throughout() {
        let mut s = splash(7);
        while !s.finished() {
            s.tick(STEP);
            for cell in s.cells() {
                assert!(cell.row < 7, "row {} out of range", cell.row);
                assert!(cell.col < 7, "col {} out of range", cell.col);
            }
        }
    }

    #[test]
    fn reset_restores_placeholder_everywhere() {
        let mut s = splash(8);
        tick_until(&mut s, Phase::Reset);
        // During the pre-reset pause the group colors are still up.
        assert!(s.cells().iter().any(|c| c.color != PLACEHOLDER));
        // The wipe lands in a single step: at the first Spotlight observation
        // (its own pause still pending) every cell is already placeholder.
        tick_until(&mut s, Phase::Spotlight);
        assert!(!s.finished());
        assert!(s.cells().iter().all(|c| c.color == PLACEHOLDER));
    }

    #[test]
    fn spotlight_highlights_five_to_ten_cells() {
        let mut s = splash(9);
        s.tick(FOREVER);
        assert!(s.finished());
        let lit = s.cells().iter().filter(|c| c.color == HIGHLIGHT).count();
        assert!((5..=10).contains(&lit), "spotlight count: {lit}");
        let rest = s.cells().iter().filter(|c| c.color == PLACEHOLDER).count();
        assert_eq!(lit + rest, 49, "non-spotlight cells keep the placeholder");
    }

    #[test]
    fn spotlight_varies_across_seeds() {
        let picks = |seed| {
            let mut s = splash(seed);
            s.tick(FOREVER);
            let mut ids: Vec<u16> = s
                .cells()
                .iter()
                .filter(|c| c.color == HIGHLIGHT)
                .map(|c| c.id)
                .collect();
            ids.sort_unstable();
            ids
        };
        let distinct: HashSet<_> = (0..6).map(picks).collect();
        assert!(distinct.len() > 1, "six seeds drew identical spotlights");
    }

    #[test]
    fn single_large_tick_fast_forwards_to_terminal() {
        let mut s = splash(10);
        s.tick(FOREVER);
        assert!(s.finished());
        assert_eq!(s.phase(), Phase::Spotlight);
        assert!(s.cells().iter().all(|c| c.visible));
        // Terminal state is stable.
        let before: Vec<GridCell> = s.cells().to_vec();
        s.tick(FOREVER);
        assert!(snapshots_equal(&before, s.cells()));
    }

    #[test]
    fn phases_run_in_script_order() {
        let mut s = splash(11);
        let mut order = vec![s.phase()];
        while !s.finished() {
            s.tick(STEP);
            if *order.last().expect("seeded with Idle") != s.phase() {
                order.push(s.phase());
            }
        }
        // Grouping is instantaneous and never observable between ticks.
        assert_eq!(
            order,
            vec![
                Phase::Idle,
                Phase::Reveal,
                Phase::ColorAssign,
                Phase::ClusterMove,
                Phase::Reset,
                Phase::Spotlight,
            ]
        );
    }

    #[test]
    fn cancel_freezes_the_snapshot() {
        for target in [Phase::Reveal, Phase::ColorAssign, Phase::ClusterMove] {
            let mut s = splash(12);
            tick_until(&mut s, target);
            s.cancel();
            let frozen: Vec<GridCell> = s.cells().to_vec();
            let phase = s.phase();
            s.tick(FOREVER);
            assert!(snapshots_equal(&frozen, s.cells()), "mutated after cancel in {target:?}");
            assert_eq!(s.phase(), phase);
            assert!(!s.finished());
        }
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut s = splash(13);
        s.tick(Duration::from_millis(50));
        s.cancel();
        s.cancel();
        assert!(s.is_cancelled());
    }

    #[test]
    fn fresh_runs_draw_fresh_randomness() {
        let run = |seed| {
            let mut s = splash(seed);
            tick_until(&mut s, Phase::ColorAssign);
            s.cells()
                .iter()
                .filter(|c| c.visible)
                .map(|c| c.id)
                .collect::<Vec<_>>()
        };
        assert_ne!(run(100), run(101), "reveal orders should differ by seed");
    }

    #[test]
    fn small_grid_completes() {
        let config = SplashConfig {
            side: 3,
            ..SplashConfig::default()
        };
        let mut s = Splash::with_rng(config, Rng::from_seed(14));
        s.tick(FOREVER);
        assert!(s.finished());
        assert_eq!(s.cells().len(), 9);
        assert!(s.cells().iter().all(|c| c.visible));
        let lit = s.cells().iter().filter(|c| c.color == HIGHLIGHT).count();
        assert!((5..=9).contains(&lit));
    }

    /// Full-field comparison; `GridCell` equality alone is identity.
    fn snapshots_equal(a: &[GridCell], b: &[GridCell]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| {
                x.id == y.id
                    && x.row == y.row
                    && x.col == y.col
                    && x.color == y.color
                    && x.visible == y.visible
            })
    }
}
