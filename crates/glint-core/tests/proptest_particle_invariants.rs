//! Property-based invariant tests for the particle system.
//!
//! 1. Every frame lowers each particle's life by exactly its decay, and a
//!    particle is removed in the frame its life reaches zero.
//! 2. The overlay surface exists exactly while particles are live.
//! 3. At most one frame request is outstanding at any time.

use glam::Vec2;
use glint_core::config::ParticleConfig;
use glint_core::headless::{BackendProbe, HeadlessBackend};
use glint_core::{FrameOutcome, ParticleSystem};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Trail(f32, f32),
    Explosion(f32, f32),
    Aim(f32, f32),
    Frames(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0f32..800.0, 0f32..600.0).prop_map(|(x, y)| Op::Trail(x, y)),
        (0f32..800.0, 0f32..600.0).prop_map(|(x, y)| Op::Explosion(x, y)),
        (0f32..800.0, 0f32..600.0).prop_map(|(x, y)| Op::Aim(x, y)),
        (1usize..120).prop_map(Op::Frames),
    ]
}

fn system(seed: u64) -> (ParticleSystem, BackendProbe) {
    let (backend, probe) = HeadlessBackend::new(800, 600);
    let system =
        ParticleSystem::with_rng(ParticleConfig::default(), Box::new(backend), fastrand::Rng::with_seed(seed));
    (system, probe)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Life decreases by decay until death
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn life_steps_down_by_decay(seed in any::<u64>(), x in 0f32..800.0, y in 0f32..600.0) {
        let (mut system, _) = system(seed);
        system.spawn_trail(Vec2::new(x, y));
        system.spawn_explosion(Vec2::new(y, x));

        loop {
            let expected: Vec<f32> = system
                .particles()
                .iter()
                .map(|p| p.life() - p.decay())
                .filter(|life| *life > 0.0)
                .collect();
            let outcome = system.tick();
            let lives: Vec<f32> = system.particles().iter().map(|p| p.life()).collect();
            prop_assert_eq!(&lives, &expected);
            if outcome != FrameOutcome::Continue {
                prop_assert_eq!(outcome, FrameOutcome::Finished);
                break;
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2 & 3. Surface lifetime tracks the live set; single frame request
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn surface_exists_iff_particles_live(
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 1..24),
    ) {
        let (mut system, probe) = system(seed);
        for op in ops {
            match op {
                Op::Trail(x, y) => { system.spawn_trail(Vec2::new(x, y)); }
                Op::Explosion(x, y) => { system.spawn_explosion(Vec2::new(x, y)); }
                Op::Aim(x, y) => { system.spawn_aim(Vec2::new(x, y), || {}); }
                Op::Frames(n) => {
                    for _ in 0..n {
                        if !probe.take_frame_request() {
                            prop_assert!(!system.is_scheduled());
                            break;
                        }
                        system.tick();
                        prop_assert_eq!(system.has_surface(), system.live_count() > 0);
                    }
                }
            }
            prop_assert_eq!(system.has_surface(), system.live_count() > 0);
            prop_assert_eq!(system.is_scheduled(), system.live_count() > 0);
            prop_assert_eq!(
                probe.surfaces_created() - probe.surfaces_removed(),
                usize::from(system.has_surface())
            );
        }
    }
}
