//! Particle simulation driving a lazily created overlay surface.
//!
//! The loop contract is "reschedule while work remains": every spawn makes
//! sure one frame is pending, every [`ParticleSystem::tick`] either asks for
//! the next frame or tears the surface down. There is never more than one
//! outstanding frame request.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use glint_platform::{OverlayBackend, Surface};
use tracing::{debug, trace, warn};

use crate::color::ColorScheme;
use crate::config::ParticleConfig;
use crate::particle::{
    random_angle, AimBlipParticle, AimParticle, ExplosionParticle, Fate, OnComplete, Particle,
    ParticleKind, TrailParticle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Particles remain and the next frame has been requested.
    Continue,
    /// The last particle died; the surface was removed.
    Finished,
    /// No usable surface; the live set was dropped and the loop stopped.
    Halted,
    /// A frame arrived while no loop was scheduled.
    Idle,
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    backend: Box<dyn OverlayBackend>,
    surface: Option<Box<dyn Surface>>,
    loop_scheduled: bool,
    enabled: bool,
    physics: ParticleConfig,
    rng: fastrand::Rng,
}

impl ParticleSystem {
    pub fn new(physics: ParticleConfig, backend: Box<dyn OverlayBackend>) -> Self {
        Self::with_rng(physics, backend, fastrand::Rng::new())
    }

    pub fn with_rng(
        physics: ParticleConfig,
        backend: Box<dyn OverlayBackend>,
        rng: fastrand::Rng,
    ) -> Self {
        Self {
            particles: Vec::new(),
            backend,
            surface: None,
            loop_scheduled: false,
            enabled: true,
            physics,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    pub fn count_of(&self, kind: ParticleKind) -> usize {
        self.particles.iter().filter(|p| p.kind() == kind).count()
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_scheduled(&self) -> bool {
        self.loop_scheduled
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling suppresses new spawns; in-flight particles run to completion.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn spawn_trail(&mut self, origin: Vec2) -> bool {
        let Some(radius) = self.prepare() else {
            return false;
        };
        let scheme = ColorScheme::random(&mut self.rng);
        let count = self.physics.trail_count.sample(&mut self.rng);
        for i in 0..count {
            let angle = i as f32 / count as f32 * TAU;
            let speed = self.rng.f32() * self.physics.trail_speed_primary
                + self.rng.f32() * self.physics.trail_speed_secondary;
            let (color, explode_color) = scheme.pick(&mut self.rng);
            let history_len = self.physics.trail_history.sample(&mut self.rng);
            self.particles.push(Particle::Trail(TrailParticle {
                position: origin,
                velocity: Vec2::from_angle(angle) * speed,
                color,
                explode_color,
                radius,
                alpha: 1.0,
                decay: self.physics.trail_decay.sample(&mut self.rng),
                history: VecDeque::with_capacity(history_len + 1),
                history_len,
            }));
        }
        debug!(
            count,
            base = ?scheme.base_palette,
            tint = ?scheme.tint_palette,
            "trail burst at ({:.0}, {:.0})",
            origin.x,
            origin.y
        );
        self.schedule();
        true
    }

    pub fn spawn_explosion(&mut self, origin: Vec2) -> bool {
        let Some(pixel_ratio) = self.prepare() else {
            return false;
        };
        let count = self.physics.explosion_count.sample(&mut self.rng);
        for _ in 0..count {
            let angle = self.rng.f32() * TAU;
            let speed = self.physics.explosion_speed.sample(&mut self.rng);
            self.particles.push(Particle::Explosion(ExplosionParticle {
                position: origin,
                velocity: Vec2::from_angle(angle) * speed,
                radius: self.physics.explosion_radius * pixel_ratio,
                alpha: 1.0,
                decay: self.physics.explosion_decay.sample(&mut self.rng),
            }));
        }
        trace!(count, "explosion burst at ({:.0}, {:.0})", origin.x, origin.y);
        self.schedule();
        true
    }

    /// Spawns one reticle converging on `target`. When it lands an impact blip
    /// is added first, then `on_complete` runs exactly once.
    pub fn spawn_aim(&mut self, target: Vec2, on_complete: impl FnOnce() + 'static) -> bool {
        let Some(pixel_ratio) = self.prepare() else {
            return false;
        };
        let distance = self.physics.aim_start_distance.sample(&mut self.rng);
        let start = target + Vec2::from_angle(self.rng.f32() * TAU) * distance;
        let initial_rotation = random_angle(&mut self.rng);
        self.particles.push(Particle::Aim(AimParticle {
            start,
            end: target,
            current: start,
            rotation: initial_rotation,
            initial_rotation,
            radius: self.physics.aim_radius * pixel_ratio,
            life: 1.0,
            decay: self.physics.aim_decay,
            on_complete: OnComplete::new(on_complete),
        }));
        debug!("aim toward ({:.0}, {:.0}) from {:.0}px", target.x, target.y, distance);
        self.schedule();
        true
    }

    /// Runs one animation frame.
    pub fn tick(&mut self) -> FrameOutcome {
        if !self.loop_scheduled {
            return FrameOutcome::Idle;
        }
        self.loop_scheduled = false;

        let usable = self.surface.as_ref().is_some_and(|s| s.is_connected());
        if !usable {
            self.halt();
            return FrameOutcome::Halted;
        }
        let Some(surface) = self.surface.as_mut() else {
            return FrameOutcome::Halted;
        };
        surface.clear();

        let mut landed = Vec::new();
        let mut survivors = Vec::with_capacity(self.particles.len());
        for mut particle in self.particles.drain(..) {
            match particle.advance(&self.physics) {
                Fate::Alive => {
                    particle.draw(surface.as_mut());
                    survivors.push(particle);
                }
                Fate::Dead => {
                    if let Particle::Aim(aim) = particle {
                        landed.push(aim);
                    }
                }
            }
        }
        self.particles = survivors;

        let blip_radius = self.physics.blip_radius * surface.pixel_ratio();
        for aim in landed {
            self.particles.push(Particle::AimBlip(AimBlipParticle {
                position: aim.end,
                radius: blip_radius,
                life: 1.0,
                decay: self.physics.blip_decay,
            }));
            aim.on_complete.run();
        }

        trace!(live = self.particles.len(), "frame");
        if self.particles.is_empty() {
            self.teardown();
            FrameOutcome::Finished
        } else {
            self.schedule();
            FrameOutcome::Continue
        }
    }

    /// Ensures a connected surface; returns its pixel ratio.
    fn prepare(&mut self) -> Option<f32> {
        if !self.enabled {
            trace!("effects disabled; spawn skipped");
            return None;
        }
        if self.surface.as_ref().is_some_and(|s| !s.is_connected()) {
            debug!("overlay surface detached by host; recreating");
            self.teardown();
        }
        if self.surface.is_none() {
            match self.backend.create_surface() {
                Some(surface) => {
                    debug!("overlay surface created");
                    self.surface = Some(surface);
                }
                None => {
                    warn!("no drawing context available; spawn skipped");
                    return None;
                }
            }
        }
        self.surface.as_ref().map(|s| s.pixel_ratio())
    }

    fn schedule(&mut self) {
        if !self.loop_scheduled {
            self.loop_scheduled = true;
            self.backend.request_frame();
        }
    }

    fn halt(&mut self) {
        if !self.particles.is_empty() {
            debug!(dropped = self.particles.len(), "surface missing; animation halted");
        }
        self.particles.clear();
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(surface) = self.surface.take() {
            surface.remove();
            debug!("overlay surface removed");
        }
    }
}
