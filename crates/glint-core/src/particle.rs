//! Particle kinds and their per-frame kinematics and drawing.

use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;

use glam::Vec2;
use glint_platform::{Rgb, Surface};

use crate::config::ParticleConfig;

/// Trail points are drawn in the explosion tint during this many final decay steps.
const TINT_STEPS: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Trail,
    Explosion,
    Aim,
    AimBlip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Alive,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec2,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct TrailParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Rgb,
    pub explode_color: Rgb,
    pub radius: f32,
    pub alpha: f32,
    pub decay: f32,
    pub history: VecDeque<TrailPoint>,
    pub history_len: usize,
}

#[derive(Debug, Clone)]
pub struct ExplosionParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub alpha: f32,
    pub decay: f32,
}

/// Boxed completion run once when an aim lands.
pub struct OnComplete(Box<dyn FnOnce()>);

impl OnComplete {
    pub fn new(callback: impl FnOnce() + 'static) -> Self {
        Self(Box::new(callback))
    }

    pub fn run(self) {
        (self.0)()
    }
}

impl fmt::Debug for OnComplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OnComplete(..)")
    }
}

#[derive(Debug)]
pub struct AimParticle {
    pub start: Vec2,
    pub end: Vec2,
    pub current: Vec2,
    pub rotation: f32,
    pub initial_rotation: f32,
    pub radius: f32,
    pub life: f32,
    pub decay: f32,
    pub on_complete: OnComplete,
}

impl AimParticle {
    /// Ease-out: fast approach that settles on the target.
    pub fn progress(&self) -> f32 {
        1.0 - self.life.max(0.0).powi(2)
    }
}

#[derive(Debug, Clone)]
pub struct AimBlipParticle {
    pub position: Vec2,
    pub radius: f32,
    pub life: f32,
    pub decay: f32,
}

#[derive(Debug)]
pub enum Particle {
    Trail(TrailParticle),
    Explosion(ExplosionParticle),
    Aim(AimParticle),
    AimBlip(AimBlipParticle),
}

impl Particle {
    pub fn kind(&self) -> ParticleKind {
        match self {
            Particle::Trail(_) => ParticleKind::Trail,
            Particle::Explosion(_) => ParticleKind::Explosion,
            Particle::Aim(_) => ParticleKind::Aim,
            Particle::AimBlip(_) => ParticleKind::AimBlip,
        }
    }

    /// Alpha for trail/explosion, life fraction for aim/blip.
    pub fn life(&self) -> f32 {
        match self {
            Particle::Trail(p) => p.alpha,
            Particle::Explosion(p) => p.alpha,
            Particle::Aim(p) => p.life,
            Particle::AimBlip(p) => p.life,
        }
    }

    pub fn decay(&self) -> f32 {
        match self {
            Particle::Trail(p) => p.decay,
            Particle::Explosion(p) => p.decay,
            Particle::Aim(p) => p.decay,
            Particle::AimBlip(p) => p.decay,
        }
    }

    pub fn position(&self) -> Vec2 {
        match self {
            Particle::Trail(p) => p.position,
            Particle::Explosion(p) => p.position,
            Particle::Aim(p) => p.current,
            Particle::AimBlip(p) => p.position,
        }
    }

    /// Advances one frame and reports whether the particle crossed its death threshold.
    pub fn advance(&mut self, physics: &ParticleConfig) -> Fate {
        match self {
            Particle::Trail(p) => {
                p.position += p.velocity;
                let drift = if p.alpha > 0.5 { -physics.trail_lift } else { physics.trail_sink };
                p.position.y += drift * p.decay;
                p.velocity *= physics.friction;
                p.alpha -= p.decay;
                p.history.push_back(TrailPoint {
                    position: p.position,
                    alpha: p.alpha,
                });
                while p.history.len() > p.history_len {
                    p.history.pop_front();
                }
                fate(p.alpha)
            }
            Particle::Explosion(p) => {
                p.position += p.velocity;
                p.velocity *= physics.friction;
                p.velocity.y += physics.gravity;
                p.alpha -= p.decay;
                fate(p.alpha)
            }
            Particle::Aim(p) => {
                p.life -= p.decay;
                let progress = p.progress();
                p.current = p.start.lerp(p.end, progress);
                p.rotation = p.initial_rotation * (1.0 - progress);
                fate(p.life)
            }
            Particle::AimBlip(p) => {
                p.life -= p.decay;
                fate(p.life)
            }
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        match self {
            Particle::Trail(p) => {
                let cooled = p.alpha <= TINT_STEPS * p.decay;
                for point in &p.history {
                    let color = if cooled {
                        p.explode_color.with_alpha(point.alpha.max(0.0))
                    } else {
                        p.color.with_alpha(point.alpha)
                    };
                    surface.fill_circle(point.position.x, point.position.y, p.radius, color);
                }
                let head = p.color.with_alpha((p.alpha * 4.0).min(1.0));
                surface.fill_circle(p.position.x, p.position.y, p.radius, head);
            }
            Particle::Explosion(p) => {
                let color = heat_color(p.alpha).with_alpha(p.alpha);
                surface.fill_circle(p.position.x, p.position.y, p.radius, color);
            }
            Particle::Aim(p) => draw_reticle(surface, p),
            Particle::AimBlip(p) => {
                let spread = p.radius * (1.0 + 2.0 * (1.0 - p.life));
                let color = Rgb::new(255, 255, 255).with_alpha(p.life);
                surface.stroke_circle(p.position.x, p.position.y, spread, 2.0, color);
                surface.fill_circle(p.position.x, p.position.y, p.radius * 0.3, color);
            }
        }
    }
}

fn fate(life: f32) -> Fate {
    if life <= 0.0 {
        Fate::Dead
    } else {
        Fate::Alive
    }
}

/// Red at full life, yellow at half life, red again as it burns out.
pub fn heat_color(life: f32) -> Rgb {
    let t = life.clamp(0.0, 1.0);
    let green = 255.0 * (1.0 - (2.0 * t - 1.0).abs());
    Rgb::from_f32(255.0, green, 40.0)
}

fn draw_reticle(surface: &mut dyn Surface, aim: &AimParticle) {
    let alpha = 0.4 + 0.6 * aim.progress();
    let color = Rgb::new(255, 80, 60).with_alpha(alpha);
    let center = aim.current;
    surface.stroke_circle(center.x, center.y, aim.radius, 1.5, color);
    for quarter in 0..4 {
        let angle = aim.rotation + quarter as f32 * FRAC_PI_2;
        let dir = Vec2::from_angle(angle);
        let inner = center + dir * (aim.radius * 0.5);
        let outer = center + dir * (aim.radius * 1.6);
        surface.stroke_line((inner.x, inner.y), (outer.x, outer.y), 1.5, color);
    }
}

pub(crate) fn random_angle(rng: &mut fastrand::Rng) -> f32 {
    (rng.f32() * 2.0 - 1.0) * PI
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail(alpha: f32, decay: f32) -> Particle {
        Particle::Trail(TrailParticle {
            position: Vec2::ZERO,
            velocity: Vec2::new(1.0, 0.0),
            color: Rgb::new(200, 160, 100),
            explode_color: Rgb::new(255, 0, 0),
            radius: 1.0,
            alpha,
            decay,
            history: VecDeque::new(),
            history_len: 3,
        })
    }

    #[test]
    fn trail_decays_and_bounds_history() {
        let physics = ParticleConfig::default();
        let mut p = trail(1.0, 0.01);
        for _ in 0..10 {
            assert_eq!(p.advance(&physics), Fate::Alive);
        }
        let Particle::Trail(t) = &p else { unreachable!() };
        assert_eq!(t.history.len(), 3);
        assert!((t.alpha - 0.9).abs() < 1e-5);
        assert!(t.velocity.x < 1.0);
        // Fresh sparks drift upward.
        assert!(t.position.y < 0.0);
    }

    #[test]
    fn trail_dies_at_zero_alpha() {
        let physics = ParticleConfig::default();
        let mut p = trail(0.015, 0.01);
        assert_eq!(p.advance(&physics), Fate::Alive);
        assert_eq!(p.advance(&physics), Fate::Dead);
    }

    #[test]
    fn explosion_falls_under_gravity() {
        let physics = ParticleConfig::default();
        let mut p = Particle::Explosion(ExplosionParticle {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: 2.0,
            alpha: 1.0,
            decay: 0.02,
        });
        p.advance(&physics);
        p.advance(&physics);
        assert!(p.position().y > 0.0);
        assert!((p.life() - 0.96).abs() < 1e-5);
    }

    #[test]
    fn heat_color_shifts_red_yellow_red() {
        assert_eq!(heat_color(1.0).g, 0);
        assert_eq!(heat_color(0.5).g, 255);
        assert_eq!(heat_color(0.0).g, 0);
        assert!(heat_color(0.75).g > 100);
    }

    #[test]
    fn aim_eases_toward_target_and_unwinds() {
        let physics = ParticleConfig::default();
        let mut p = Particle::Aim(AimParticle {
            start: Vec2::new(0.0, 0.0),
            end: Vec2::new(100.0, 0.0),
            current: Vec2::ZERO,
            rotation: 1.0,
            initial_rotation: 1.0,
            radius: 10.0,
            life: 1.0,
            decay: 0.25,
            on_complete: OnComplete::new(|| {}),
        });
        p.advance(&physics);
        // progress = 1 - 0.75^2
        assert!((p.position().x - 43.75).abs() < 1e-3);
        p.advance(&physics);
        p.advance(&physics);
        assert_eq!(p.advance(&physics), Fate::Dead);
        let Particle::Aim(aim) = &p else { unreachable!() };
        assert!((aim.current.x - 100.0).abs() < 1e-4);
        assert!(aim.rotation.abs() < 1e-4);
    }

    #[test]
    fn random_angle_is_bounded() {
        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..100 {
            assert!(random_angle(&mut rng).abs() <= PI);
        }
    }
}
