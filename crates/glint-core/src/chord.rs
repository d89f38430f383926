//! Flat key-chord recognizer turning raw key presses into a mail intent.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ChordConfig;

const HISTORY_LEN: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    #[default]
    None,
    SelectOne,
    SelectAll,
    MarkAsRead,
    Archive,
}

impl Intent {
    pub fn is_selection(self) -> bool {
        matches!(self, Intent::SelectOne | Intent::SelectAll)
    }

    fn allows_archive(self) -> bool {
        matches!(self, Intent::SelectOne | Intent::SelectAll | Intent::MarkAsRead)
    }
}

/// Visual effect requested by an intent transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordEffect {
    ArchiveBurst,
    Fuse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordOutcome {
    pub intent: Intent,
    pub effect: Option<ChordEffect>,
}

pub struct KeyChordRecognizer {
    keys: ChordConfig,
    history: VecDeque<String>,
    intent: Intent,
}

impl KeyChordRecognizer {
    pub fn new(keys: ChordConfig) -> Self {
        Self {
            keys,
            history: VecDeque::with_capacity(HISTORY_LEN + 1),
            intent: Intent::None,
        }
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Feeds one key press. Returns `None` for the ignored modifier key.
    pub fn press(&mut self, raw_key: &str) -> Option<ChordOutcome> {
        let key = raw_key.to_lowercase();
        if key == self.keys.modifier {
            return None;
        }
        self.history.push_back(key.clone());
        while self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
        let joined: String = self.history.iter().map(String::as_str).collect();

        let outcome = if key == self.keys.select_one {
            self.transition(Intent::SelectOne, None)
        } else if key == self.keys.select_all && joined == self.keys.select_all_chord {
            self.transition(Intent::SelectAll, None)
        } else if key == self.keys.archive && self.intent.allows_archive() {
            self.transition(Intent::Archive, Some(ChordEffect::ArchiveBurst))
        } else if key == self.keys.mark_as_read {
            self.transition(Intent::MarkAsRead, Some(ChordEffect::Fuse))
        } else {
            self.transition(Intent::None, None)
        };
        debug!(key = %key, intent = ?outcome.intent, "chord");
        Some(outcome)
    }

    /// Applies an intent delivered by an extension message.
    pub fn command(&mut self, intent: Intent) -> ChordOutcome {
        let effect = match intent {
            Intent::Archive => Some(ChordEffect::ArchiveBurst),
            Intent::MarkAsRead => Some(ChordEffect::Fuse),
            _ => None,
        };
        debug!(intent = ?intent, "chord command");
        self.transition(intent, effect)
    }

    fn transition(&mut self, intent: Intent, effect: Option<ChordEffect>) -> ChordOutcome {
        self.intent = intent;
        ChordOutcome { intent, effect }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(keys: &[&str]) -> (KeyChordRecognizer, Vec<ChordOutcome>) {
        let mut recognizer = KeyChordRecognizer::new(ChordConfig::default());
        let outcomes = keys.iter().filter_map(|k| recognizer.press(k)).collect();
        (recognizer, outcomes)
    }

    #[test]
    fn star_a_selects_all() {
        let (r, _) = feed(&["*", "a"]);
        assert_eq!(r.intent(), Intent::SelectAll);
    }

    #[test]
    fn a_without_star_does_nothing() {
        let (r, _) = feed(&["b", "a"]);
        assert_eq!(r.intent(), Intent::None);
    }

    #[test]
    fn x_selects_one() {
        let (r, _) = feed(&["x"]);
        assert_eq!(r.intent(), Intent::SelectOne);
    }

    #[test]
    fn x_then_e_archives_with_burst() {
        let (r, outcomes) = feed(&["x", "e"]);
        assert_eq!(r.intent(), Intent::Archive);
        assert_eq!(outcomes.last().and_then(|o| o.effect), Some(ChordEffect::ArchiveBurst));
    }

    #[test]
    fn e_without_selection_resets() {
        let (r, outcomes) = feed(&["e"]);
        assert_eq!(r.intent(), Intent::None);
        assert_eq!(outcomes[0].effect, None);
    }

    #[test]
    fn unknown_key_resets_intent() {
        let (r, _) = feed(&["x", "q"]);
        assert_eq!(r.intent(), Intent::None);
        let (r, _) = feed(&["q"]);
        assert_eq!(r.intent(), Intent::None);
    }

    #[test]
    fn mark_as_read_fuses_and_allows_archive() {
        let (r, outcomes) = feed(&["i"]);
        assert_eq!(r.intent(), Intent::MarkAsRead);
        assert_eq!(outcomes[0].effect, Some(ChordEffect::Fuse));
        let (r, _) = feed(&["i", "e"]);
        assert_eq!(r.intent(), Intent::Archive);
    }

    #[test]
    fn modifier_is_invisible() {
        let (r, outcomes) = feed(&["Shift", "*", "Shift", "A"]);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(r.intent(), Intent::SelectAll);
        assert_eq!(r.history().collect::<Vec<_>>(), vec!["*", "a"]);
        let (r, _) = feed(&["x", "Shift"]);
        assert_eq!(r.intent(), Intent::SelectOne);
    }

    #[test]
    fn history_keeps_two_keys_and_resets() {
        let (mut r, _) = feed(&["q", "*", "a"]);
        assert_eq!(r.history().count(), 2);
        r.reset_history();
        r.press("a");
        assert_eq!(r.intent(), Intent::None);
    }

    #[test]
    fn command_path_fires_effects() {
        let mut r = KeyChordRecognizer::new(ChordConfig::default());
        assert_eq!(r.command(Intent::Archive).effect, Some(ChordEffect::ArchiveBurst));
        assert_eq!(r.command(Intent::MarkAsRead).effect, Some(ChordEffect::Fuse));
        assert_eq!(r.command(Intent::SelectOne).effect, None);
        assert_eq!(r.intent(), Intent::SelectOne);
    }
}
