//! Messages delivered by the extension runtime (background page, popup).

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionMessage {
    MarkAsRead,
    Archive,
    SetEffectsEnabled { enabled: bool },
}

impl ExtensionMessage {
    /// Parses a JSON message; types owned by other collaborators yield `None`.
    pub fn parse(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}
