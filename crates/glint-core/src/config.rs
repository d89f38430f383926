//! Tunables for every effect, loadable from TOML or JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Inclusive float range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> f32 {
        self.min + rng.f32() * (self.max - self.min)
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange { field })
        }
    }
}

/// Inclusive integer range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSpan {
    pub min: usize,
    pub max: usize,
}

impl CountSpan {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> usize {
        rng.usize(self.min..=self.max)
    }

    pub fn contains(&self, value: usize) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange { field })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub friction: f32,
    pub trail_count: CountSpan,
    pub trail_speed_primary: f32,
    pub trail_speed_secondary: f32,
    pub trail_decay: Span,
    pub trail_history: CountSpan,
    /// Upward drift per unit of decay while a spark is fresh.
    pub trail_lift: f32,
    /// Downward drift per unit of decay once a spark has cooled.
    pub trail_sink: f32,
    pub explosion_count: CountSpan,
    pub explosion_speed: Span,
    pub explosion_decay: Span,
    pub explosion_radius: f32,
    pub gravity: f32,
    pub aim_decay: f32,
    pub aim_start_distance: Span,
    pub aim_radius: f32,
    pub blip_decay: f32,
    pub blip_radius: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            friction: 0.98,
            trail_count: CountSpan::new(15, 40),
            trail_speed_primary: 0.8,
            trail_speed_secondary: 0.4,
            trail_decay: Span::new(0.007, 0.012),
            trail_history: CountSpan::new(5, 15),
            trail_lift: 25.0,
            trail_sink: 2.0,
            explosion_count: CountSpan::new(40, 60),
            explosion_speed: Span::new(1.0, 5.0),
            explosion_decay: Span::new(0.015, 0.03),
            explosion_radius: 2.0,
            gravity: 0.06,
            aim_decay: 1.0 / 60.0,
            aim_start_distance: Span::new(80.0, 160.0),
            aim_radius: 14.0,
            blip_decay: 1.0 / 12.0,
            blip_radius: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordConfig {
    /// Key that never enters the history and never changes the intent.
    pub modifier: String,
    pub select_one: String,
    pub select_all: String,
    /// Joined two-key history that must precede `select_all`.
    pub select_all_chord: String,
    pub archive: String,
    pub mark_as_read: String,
    pub history_reset_ms: u64,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self {
            modifier: "shift".into(),
            select_one: "x".into(),
            select_all: "a".into(),
            select_all_chord: "*a".into(),
            archive: "e".into(),
            mark_as_read: "i".into(),
            history_reset_ms: 1000,
        }
    }
}

impl ChordConfig {
    pub fn history_reset(&self) -> Duration {
        Duration::from_millis(self.history_reset_ms)
    }
}

/// Selectors describing the host mail client's message list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub row_selector: String,
    pub select_cell_selector: String,
    pub checkbox_selector: String,
    pub selection_attribute: String,
    pub observed_attributes: Vec<String>,
    /// Cell whose first `div` reads "selected…" on clients without a checkbox role.
    pub fallback_cell_index: u32,
    pub fallback_text_prefix: String,
    pub background: Option<String>,
    pub canvas_id: String,
    pub canvas_z_index: i32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            row_selector: "tr".into(),
            select_cell_selector: r#"td[data-tooltip="Select"]"#.into(),
            checkbox_selector: r#"td[role="gridcell"] div[role="checkbox"]"#.into(),
            selection_attribute: "aria-checked".into(),
            observed_attributes: vec!["aria-checked".into(), "class".into()],
            fallback_cell_index: 4,
            fallback_text_prefix: "selected".into(),
            background: Some("black".into()),
            canvas_id: "fireworks".into(),
            canvas_z_index: 10000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeConfig {
    pub duration_ms: u64,
    pub row_offset: f32,
    pub body_offset: f32,
    pub max_rotation_deg: f32,
    pub transition: String,
    /// How long the transition outlives the transform so the reset eases back.
    pub settle_ms: u64,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            duration_ms: 80,
            row_offset: 6.0,
            body_offset: 2.0,
            max_rotation_deg: 1.5,
            transition: "transform 0.1s ease-in-out".into(),
            settle_ms: 100,
        }
    }
}

impl ShakeConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn transition_hold(&self) -> Duration {
        Duration::from_millis(self.duration_ms.saturating_add(self.settle_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub box_shadow: String,
    pub duration_ms: u64,
    /// Horizontal inset of the aim target from the row's left edge.
    pub aim_offset_x: f32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            box_shadow: "inset 0 0 0 2px rgba(255, 215, 0, 0.9)".into(),
            duration_ms: 250,
            aim_offset_x: 20.0,
        }
    }
}

impl HighlightConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuseConfig {
    pub row_stagger_ms: u64,
    pub step_interval_ms: u64,
    pub step_px: f32,
}

impl Default for FuseConfig {
    fn default() -> Self {
        Self {
            row_stagger_ms: 120,
            step_interval_ms: 40,
            step_px: 48.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub bursts: CountSpan,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            bursts: CountSpan::new(10, 25),
        }
    }
}

/// Keys used with the extension's storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub effects_key: String,
    pub effects_default: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            effects_key: "effectsEnabled".into(),
            effects_default: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlintConfig {
    pub particles: ParticleConfig,
    pub chord: ChordConfig,
    pub page: PageConfig,
    pub shake: ShakeConfig,
    pub highlight: HighlightConfig,
    pub fuse: FuseConfig,
    pub archive: ArchiveConfig,
    pub storage: StorageConfig,
}

impl GlintConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.particles;
        p.trail_count.check("particles.trail_count")?;
        p.trail_decay.check("particles.trail_decay")?;
        p.trail_history.check("particles.trail_history")?;
        p.explosion_count.check("particles.explosion_count")?;
        p.explosion_speed.check("particles.explosion_speed")?;
        p.explosion_decay.check("particles.explosion_decay")?;
        p.aim_start_distance.check("particles.aim_start_distance")?;
        self.archive.bursts.check("archive.bursts")?;

        for (field, decay) in [
            ("particles.trail_decay", p.trail_decay.min),
            ("particles.explosion_decay", p.explosion_decay.min),
            ("particles.aim_decay", p.aim_decay),
            ("particles.blip_decay", p.blip_decay),
        ] {
            if decay <= 0.0 || !decay.is_finite() {
                return Err(ConfigError::NonPositiveDecay { field });
            }
        }
        if !(0.0..=1.0).contains(&p.friction) {
            return Err(ConfigError::Invalid(format!(
                "particles.friction must be within 0..=1, got {}",
                p.friction
            )));
        }
        if self.fuse.step_px <= 0.0 {
            return Err(ConfigError::Invalid("fuse.step_px must be positive".into()));
        }
        if self.page.selection_attribute.is_empty() {
            return Err(ConfigError::Invalid("page.selection_attribute is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        GlintConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = GlintConfig::from_toml_str(
            r#"
            [chord]
            archive = "y"

            [particles]
            explosion_count = { min = 5, max = 8 }
            "#,
        )
        .unwrap();
        assert_eq!(config.chord.archive, "y");
        assert_eq!(config.chord.select_one, "x");
        assert_eq!(config.particles.explosion_count, CountSpan::new(5, 8));
        assert_eq!(config.particles.friction, 0.98);
        assert_eq!(config.page, PageConfig::default());
    }

    #[test]
    fn json_round_trips_through_loader() {
        let json = serde_json::to_string(&GlintConfig::default()).unwrap();
        assert_eq!(GlintConfig::from_json_str(&json).unwrap(), GlintConfig::default());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = GlintConfig::from_toml_str(
            r#"
            [archive]
            bursts = { min = 9, max = 3 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { field: "archive.bursts" }));
    }

    #[test]
    fn zero_decay_is_rejected() {
        let err = GlintConfig::from_toml_str("[particles]\naim_decay = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveDecay { field: "particles.aim_decay" }));
    }

    #[test]
    fn malformed_toml_surfaces_parse_error() {
        let err = GlintConfig::from_toml_str("[chord\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn span_sampling_stays_in_range() {
        let mut rng = fastrand::Rng::with_seed(7);
        let span = Span::new(1.0, 5.0);
        let counts = CountSpan::new(40, 60);
        for _ in 0..500 {
            let v = span.sample(&mut rng);
            assert!((1.0..=5.0).contains(&v));
            assert!(counts.contains(counts.sample(&mut rng)));
        }
    }
}
