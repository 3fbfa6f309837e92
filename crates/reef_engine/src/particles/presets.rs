//! Preset particle systems

use super::affector::Affector;
use super::system::ParticleSystem;
use crate::foundation::math::Vec2;
use crate::render::BlendMode;
use rand::Rng;

/// Which preset a system (and its particles) came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ParticleKind {
    /// Rising bubbles behind plankton
    Trail,
    /// Expanding ring on the player when it grows
    Echo,
    /// Short spray when something spawns
    Sparkle,
    /// Hand-configured system
    Custom,
}

const TRAIL_VELOCITIES: [(f32, f32); 10] = [
    (-7.0, -5.0),
    (-5.0, -7.0),
    (0.0, -10.0),
    (5.0, -7.0),
    (7.0, -5.0),
    (-12.0, -15.0),
    (-10.0, -16.0),
    (-7.0, -10.0),
    (7.0, -11.0),
    (10.0, -15.0),
];

const SPARKLE_VELOCITIES: [(f32, f32); 12] = [
    (-180.5, 0.0),
    (-120.0, -88.9),
    (-40.0, -124.0),
    (0.0, -120.5),
    (48.5, -64.6),
    (124.0, -88.5),
    (160.9, 0.0),
    (124.0, 9.5),
    (48.0, 27.5),
    (0.7, 40.4),
    (-40.0, 29.6),
    (-120.0, 9.5),
];

fn velocities(table: &[(f32, f32)]) -> Vec<Vec2> {
    table.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
}

impl ParticleSystem {
    /// Build a preset; randomised settings and the system's own RNG seed
    /// are drawn from `rng`
    pub fn create(kind: ParticleKind, rng: &mut impl Rng) -> Self {
        let mut system = Self::new(kind, rng.gen());
        match kind {
            ParticleKind::Trail => {
                let scale = rng.gen_range(2.0..4.0);
                system.add_affector(Affector::Scale(Vec2::new(scale, scale)));
                system.add_affector(Affector::Force(Vec2::new(0.0, -190.0)));
                system.set_emit_rate(3.0);
                system.set_blend_mode(BlendMode::Add);
                system.set_random_initial_velocity(velocities(&TRAIL_VELOCITIES));
                system.start_continuous(1, rng.gen_range(0.2..1.0));
            }
            ParticleKind::Echo => {
                system.add_affector(Affector::Scale(Vec2::new(1.6, 1.6)));
                system.set_blend_mode(BlendMode::Add);
                system.set_particle_lifetime(0.95);
                system.follow_parent(true);
            }
            ParticleKind::Sparkle => {
                system.set_particle_lifetime(0.3);
                system.set_particle_size(Vec2::new(10.0, 10.0));
                system.set_random_initial_velocity(velocities(&SPARKLE_VELOCITIES));
                system.set_blend_mode(BlendMode::Add);
                system.add_affector(Affector::Force(Vec2::new(0.0, 20.0)));
                system.add_affector(Affector::Scale(Vec2::new(2.0, 2.0)));
                system.add_affector(Affector::Rotate(140.0));
            }
            ParticleKind::Custom => {}
        }
        log::trace!("Particles: created {:?} preset", kind);
        system
    }
}
