use std::path::Path;

use glint_app::{replay, ReplayOptions, Scenario};
use glint_core::{GlintConfig, Intent};

fn sample(name: &str) -> Scenario {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name);
    Scenario::load(&path).unwrap()
}

#[test]
fn select_and_archive_session() {
    let summary = replay(
        &sample("select_and_archive.toml"),
        &GlintConfig::default(),
        ReplayOptions::default(),
    );
    assert_eq!(summary.effects.aims_fired, 2);
    assert_eq!(summary.effects.aims_landed, 2);
    assert_eq!(summary.effects.archive_bursts, 1);
    assert_eq!(summary.final_intent, Intent::Archive);
    assert_eq!(summary.surfaces_created, summary.surfaces_removed);
    assert!(summary.completed);
}

#[test]
fn disabled_effects_keep_the_page_untouched() {
    let mut config = GlintConfig::default();
    config.storage.effects_default = false;
    let summary = replay(&sample("select_and_archive.toml"), &config, ReplayOptions::default());
    assert_eq!(summary.frames, 0);
    assert_eq!(summary.surfaces_created, 0);
    assert_eq!(summary.final_intent, Intent::Archive);
}

#[test]
fn missing_scenario_reports_path() {
    let err = Scenario::load(Path::new("does/not/exist.toml")).unwrap_err();
    assert!(err.to_string().contains("does/not/exist.toml"));
}
