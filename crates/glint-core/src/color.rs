//! Randomized two-palette color schemes for trail bursts.

use glint_platform::Rgb;

/// Channel weights for the scaled palettes; each channel is multiplied by an
/// independent factor in `150..250` and clamped.
const RAINBOW: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [1.0, 0.5, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
];
const BLUE: [[f32; 3]; 3] = [[0.4, 0.4, 1.5], [0.2, 0.2, 1.5], [0.3, 0.3, 1.5]];
const RED: [[f32; 3]; 3] = [[1.4, 0.4, 0.4], [1.4, 0.2, 0.2], [1.5, 0.3, 0.3]];
const YELLOW: [[f32; 3]; 3] = [[1.4, 1.4, 0.4], [1.4, 1.2, 0.2], [1.5, 1.3, 0.3]];

const GOLD_VARIANTS: usize = 4;
const SILVER_VARIANTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Gold,
    Silver,
    Rainbow,
    Blue,
    Red,
    Yellow,
}

impl Palette {
    pub fn generators(self) -> Vec<ColorGenerator> {
        let scaled = |weights: &[[f32; 3]]| {
            weights
                .iter()
                .copied()
                .map(ColorGenerator::Scaled)
                .collect::<Vec<_>>()
        };
        match self {
            Palette::Gold => vec![ColorGenerator::Gold; GOLD_VARIANTS],
            Palette::Silver => vec![ColorGenerator::Silver; SILVER_VARIANTS],
            Palette::Rainbow => scaled(&RAINBOW),
            Palette::Blue => scaled(&BLUE),
            Palette::Red => scaled(&RED),
            Palette::Yellow => scaled(&YELLOW),
        }
    }
}

/// Yields a fresh color inside its palette's band on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorGenerator {
    /// `(s, 0.8 s, 100)` with `s` in `150..235`.
    Gold,
    /// Every channel in `200..255`.
    Silver,
    Scaled([f32; 3]),
}

impl ColorGenerator {
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Rgb {
        match *self {
            ColorGenerator::Gold => {
                let s = 150.0 + rng.f32() * 85.0;
                Rgb::from_f32(s, 0.8 * s, 100.0)
            }
            ColorGenerator::Silver => {
                let mut channel = || 200.0 + rng.f32() * 55.0;
                Rgb::from_f32(channel(), channel(), channel())
            }
            ColorGenerator::Scaled([r, g, b]) => {
                let mut factor = || 150.0 + rng.f32() * 100.0;
                Rgb::from_f32(r * factor(), g * factor(), b * factor())
            }
        }
    }
}

/// Fixed catalog of (base, explosion tint) pairings.
pub const CATALOG: [(Palette, Palette); 7] = [
    (Palette::Gold, Palette::Yellow),
    (Palette::Gold, Palette::Red),
    (Palette::Silver, Palette::Silver),
    (Palette::Silver, Palette::Blue),
    (Palette::Silver, Palette::Yellow),
    (Palette::Rainbow, Palette::Rainbow),
    (Palette::Gold, Palette::Gold),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    pub base_palette: Palette,
    pub tint_palette: Palette,
    pub base: Vec<ColorGenerator>,
    pub tint: Vec<ColorGenerator>,
}

impl ColorScheme {
    /// Picks one catalog entry uniformly at random.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        let (base_palette, tint_palette) = CATALOG[rng.usize(..CATALOG.len())];
        Self {
            base_palette,
            tint_palette,
            base: base_palette.generators(),
            tint: tint_palette.generators(),
        }
    }

    /// Samples a (base, tint) pair for one particle of the burst.
    pub fn pick(&self, rng: &mut fastrand::Rng) -> (Rgb, Rgb) {
        let base = self.base[rng.usize(..self.base.len())].sample(rng);
        let tint = self.tint[rng.usize(..self.tint.len())].sample(rng);
        (base, tint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_palette_has_generators() {
        for (base, tint) in CATALOG {
            assert!(!base.generators().is_empty());
            assert!(!tint.generators().is_empty());
        }
    }

    #[test]
    fn gold_stays_in_band() {
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..200 {
            let c = ColorGenerator::Gold.sample(&mut rng);
            assert!((150..=235).contains(&c.r));
            assert_eq!(c.b, 100);
            let expected_g = (0.8 * c.r as f32) as i32;
            assert!((c.g as i32 - expected_g).abs() <= 1);
        }
    }

    #[test]
    fn silver_stays_bright() {
        let mut rng = fastrand::Rng::with_seed(4);
        for _ in 0..200 {
            let c = ColorGenerator::Silver.sample(&mut rng);
            assert!(c.r >= 200 && c.g >= 200 && c.b >= 200);
        }
    }

    #[test]
    fn scaled_generators_resample_each_call() {
        let mut rng = fastrand::Rng::with_seed(5);
        let generator = ColorGenerator::Scaled([1.0, 0.5, 0.0]);
        let samples: Vec<Rgb> = (0..20).map(|_| generator.sample(&mut rng)).collect();
        assert!(samples.iter().all(|c| c.b == 0 && c.r >= 150));
        assert!(samples.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn blue_channel_clamps_at_full_intensity() {
        let mut rng = fastrand::Rng::with_seed(6);
        for _ in 0..50 {
            let c = ColorGenerator::Scaled(BLUE[0]).sample(&mut rng);
            assert!(c.b >= 225);
        }
    }

    #[test]
    fn random_scheme_covers_catalog() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let scheme = ColorScheme::random(&mut rng);
            seen.insert(format!("{:?}/{:?}", scheme.base_palette, scheme.tint_palette));
        }
        assert_eq!(seen.len(), CATALOG.len());
    }
}
