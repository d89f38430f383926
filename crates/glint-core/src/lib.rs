//! Glint core: particle simulation, key chords and mutation triggers for
//! the mail-list overlay. Platform access goes through `glint-platform`.

pub mod chord;
pub mod color;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fuse;
pub mod headless;
pub mod message;
pub mod particle;
pub mod shake;
pub mod system;
pub mod trigger;

pub use chord::{ChordEffect, ChordOutcome, Intent, KeyChordRecognizer};
pub use config::GlintConfig;
pub use coordinator::{EffectCoordinator, EffectInput, EffectStats, Inbox, TimerTask};
pub use error::ConfigError;
pub use message::ExtensionMessage;
pub use particle::{Particle, ParticleKind};
pub use system::{FrameOutcome, ParticleSystem};
