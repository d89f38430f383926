use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field}: min must not exceed max")]
    InvalidRange { field: &'static str },
    #[error("{field}: decay must be positive")]
    NonPositiveDecay { field: &'static str },
    #[error("{0}")]
    Invalid(String),
}
