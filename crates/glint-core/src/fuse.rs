//! Left-to-right burst sequence traversing selected rows.

use std::time::Duration;

use glam::Vec2;
use glint_platform::ElementRect;

use crate::config::FuseConfig;

/// Position of the fuse marker along one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuseStep {
    /// Distance from the row's left edge.
    pub offset: f32,
}

impl FuseStep {
    pub const START: FuseStep = FuseStep { offset: 0.0 };

    /// Burst position for this step, or `None` once the marker has passed
    /// the row's right edge.
    pub fn burst_point(&self, rect: &ElementRect) -> Option<Vec2> {
        (self.offset <= rect.width).then(|| Vec2::new(rect.x + self.offset, rect.center_y()))
    }

    pub fn next(&self, config: &FuseConfig) -> FuseStep {
        FuseStep {
            offset: self.offset + config.step_px,
        }
    }
}

/// Start delay of the fuse for the `index`-th selected row.
pub fn row_delay(config: &FuseConfig, index: usize) -> Duration {
    Duration::from_millis(config.row_stagger_ms.saturating_mul(index as u64))
}

pub fn step_interval(config: &FuseConfig) -> Duration {
    Duration::from_millis(config.step_interval_ms)
}
