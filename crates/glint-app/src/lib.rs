//! Headless replay of scripted mail-list sessions through the glint core.

pub mod replay;
pub mod scenario;

use std::path::PathBuf;

use thiserror::Error;

pub use replay::{replay, ReplayOptions, ReplaySummary};
pub use scenario::{Action, Scenario};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario: {0}")]
    Scenario(#[from] toml::de::Error),
    #[error(transparent)]
    Config(#[from] glint_core::ConfigError),
    #[error("event selects row {row}, scenario has {rows}")]
    UnknownRow { row: usize, rows: usize },
}
