#![forbid(unsafe_code)]

//! Colors: the base palette and the per-run group palette draw.

use crate::rng::Rng;

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel (0–255).
    pub r: u8,
    /// Green channel (0–255).
    pub g: u8,
    /// Blue channel (0–255).
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Resting color of a cell before any group color is assigned (and after the
/// reset phase wipes the groups away).
pub const PLACEHOLDER: Rgb = Rgb::new(0xE6, 0xEE, 0xF8);

/// Accent color used for the final spotlight picks.
pub const HIGHLIGHT: Rgb = Rgb::new(0xFF, 0x7A, 0xA2);

/// Fixed base palette the group colors are drawn from.
pub const BASE_PALETTE: [Rgb; 10] = [
    Rgb::new(0x2C, 0x9A, 0xFF),
    Rgb::new(0x8B, 0xD1, 0x7F),
    Rgb::new(0xFF, 0xB8, 0x6B),
    Rgb::new(0x9B, 0x7B, 0xFF),
    Rgb::new(0x4F, 0xD1, 0xC5),
    Rgb::new(0xFF, 0x8F, 0xB8),
    Rgb::new(0xFF, 0xD3, 0x6B),
    Rgb::new(0x7E, 0xC0, 0xFF),
    Rgb::new(0xC4, 0x8C, 0xFF),
    Rgb::new(0x7E, 0xE1, 0xA6),
];

/// Draw `k` distinct colors in random order.
///
/// Shuffles a copy of the whole base palette and keeps the first `k`, which
/// selects and orders the subset in one pass. Callers keep `k` within
/// `[1, BASE_PALETTE.len()]`; larger values are a caller bug.
#[must_use]
pub fn pick_palette(k: usize, rng: &mut Rng) -> Vec<Rgb> {
    debug_assert!(
        (1..=BASE_PALETTE.len()).contains(&k),
        "palette draw of {k} from {} colors",
        BASE_PALETTE.len()
    );
    let mut colors = BASE_PALETTE;
    rng.shuffle(&mut colors);
    colors[..k.min(colors.len())].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_requested_count() {
        let mut rng = Rng::from_seed(1);
        for k in 3..=10 {
            assert_eq!(pick_palette(k, &mut rng).len(), k);
        }
    }

    #[test]
    fn picks_are_distinct() {
        let mut rng = Rng::from_seed(2);
        for _ in 0..50 {
            let picked = pick_palette(10, &mut rng);
            for (i, a) in picked.iter().enumerate() {
                for b in &picked[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn picks_come_from_base_palette() {
        let mut rng = Rng::from_seed(3);
        for _ in 0..50 {
            for color in pick_palette(5, &mut rng) {
                assert!(BASE_PALETTE.contains(&color));
            }
        }
    }

    #[test]
    fn order_varies_between_draws() {
        let mut rng = Rng::from_seed(4);
        let draws: Vec<_> = (0..8).map(|_| pick_palette(10, &mut rng)).collect();
        let all_same = draws.windows(2).all(|w| w[0] == w[1]);
        assert!(!all_same, "palette order should vary");
    }
}
