//! Scripted sessions for the replay harness.

use std::path::Path;

use glint_core::Intent;
use glint_platform::{ElementRect, Viewport};
use serde::Deserialize;

use crate::ReplayError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub rows: Vec<ScenarioRow>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioRow {
    #[serde(flatten)]
    pub rect: ElementRect,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// One key press.
    Key { key: String },
    /// Flips the listed rows in a single mutation batch.
    Select {
        rows: Vec<usize>,
        #[serde(default = "selected_default")]
        selected: bool,
    },
    /// An intent delivered as an extension message.
    Command { intent: Intent },
    EffectsEnabled { enabled: bool },
}

fn selected_default() -> bool {
    true
}

impl Scenario {
    pub fn from_toml_str(source: &str) -> Result<Self, ReplayError> {
        let scenario: Self = toml::from_str(source)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let source = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ReplayError> {
        for event in &self.events {
            if let Action::Select { rows, .. } = &event.action {
                if let Some(&row) = rows.iter().find(|&&row| row >= self.rows.len()) {
                    return Err(ReplayError::UnknownRow {
                        row,
                        rows: self.rows.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Events in delivery order; ties keep file order.
    pub fn timeline(&self) -> Vec<&ScenarioEvent> {
        let mut events: Vec<_> = self.events.iter().collect();
        events.sort_by_key(|event| event.at_ms);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [viewport]
        width = 800.0
        height = 600.0

        [[rows]]
        x = 10.0
        y = 20.0
        width = 300.0
        height = 30.0

        [[events]]
        at_ms = 200
        action = "command"
        intent = "markAsRead"

        [[events]]
        at_ms = 0
        action = "key"
        key = "x"

        [[events]]
        at_ms = 50
        action = "select"
        rows = [0]
    "#;

    #[test]
    fn parses_actions_and_orders_timeline() {
        let scenario = Scenario::from_toml_str(SAMPLE).unwrap();
        assert_eq!(scenario.viewport.width, 800.0);
        assert_eq!(scenario.rows[0].rect.height, 30.0);
        assert!(!scenario.rows[0].selected);
        let actions: Vec<_> = scenario.timeline().into_iter().map(|e| e.action.clone()).collect();
        assert_eq!(
            actions,
            vec![
                Action::Key { key: "x".into() },
                Action::Select {
                    rows: vec![0],
                    selected: true
                },
                Action::Command {
                    intent: Intent::MarkAsRead
                },
            ]
        );
    }

    #[test]
    fn rejects_unknown_rows() {
        let source = r#"
            [[events]]
            at_ms = 0
            action = "select"
            rows = [3]
        "#;
        assert!(matches!(
            Scenario::from_toml_str(source),
            Err(ReplayError::UnknownRow { row: 3, rows: 0 })
        ));
    }
}
