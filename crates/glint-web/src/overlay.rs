//! Host-independent pieces of the overlay setup.

use glint_core::GlintConfig;

use crate::error::WebError;

const EMBEDDED_CONFIG: &str = include_str!("../glint.toml");

/// Settings compiled into the content script.
pub fn embedded_config() -> Result<GlintConfig, WebError> {
    Ok(GlintConfig::from_toml_str(EMBEDDED_CONFIG)?)
}

/// Inline style of the overlay canvas: pinned to the viewport, transparent
/// and never intercepting pointer input.
pub fn canvas_css(z_index: i32) -> String {
    format!(
        "position: fixed; left: 0; top: 0; z-index: {z_index}; \
         background-color: transparent; pointer-events: none;"
    )
}

/// Seed for the particle RNG, mixed from a `Math.random()` draw and the
/// page clock in milliseconds.
pub fn rng_seed(unit: f64, now_ms: f64) -> u64 {
    let draw = (unit.clamp(0.0, 1.0) * u64::MAX as f64) as u64;
    draw ^ (now_ms as u64).rotate_left(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_matches_defaults() {
        let config = embedded_config().unwrap();
        assert_eq!(config, GlintConfig::default());
    }

    #[test]
    fn canvas_ignores_pointer() {
        let css = canvas_css(10000);
        assert!(css.contains("z-index: 10000;"));
        assert!(css.contains("pointer-events: none;"));
    }

    #[test]
    fn rng_seed_follows_the_draw() {
        let now = 1_760_000_000_000.0;
        let seeds: Vec<u64> = [0.0, 0.25, 0.5, 0.999].iter().map(|&u| rng_seed(u, now)).collect();
        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_ne!(rng_seed(0.5, now), rng_seed(0.5, now + 1.0));

        let mut a = fastrand::Rng::with_seed(rng_seed(0.1, now));
        let mut b = fastrand::Rng::with_seed(rng_seed(0.9, now));
        assert_ne!(a.u64(..), b.u64(..));
    }
}
