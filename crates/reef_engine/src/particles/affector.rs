//! Per-particle affectors
//!
//! The set is closed. A system applies its affectors to every live particle
//! in the order they were added.

use super::particle::Particle;
use crate::foundation::math::{utils, Vec2};

/// Something that changes a particle every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Affector {
    /// Constant acceleration, px/s²
    Force(Vec2),
    /// Scale growth per second
    Scale(Vec2),
    /// Spin in degrees per second
    Rotate(f32),
}

impl Affector {
    /// Apply to one particle over `dt` seconds
    pub fn apply(&self, particle: &mut Particle, dt: f32) {
        match *self {
            Self::Force(force) => particle.velocity += force * dt,
            Self::Scale(rate) => particle.scale += rate * dt,
            Self::Rotate(rate) => {
                particle.rotation = utils::wrap_degrees(particle.rotation + rate * dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::ParticleKind;
    use crate::render::Colour;
    use approx::assert_relative_eq;

    fn particle() -> Particle {
        Particle {
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            rotation: 350.0,
            scale: Vec2::new(1.0, 1.0),
            colour: Colour::WHITE,
            lifetime: 1.0,
            max_lifetime: 1.0,
            kind: ParticleKind::Sparkle,
        }
    }

    #[test]
    fn test_each_affector_changes_only_its_property() {
        let mut p = particle();
        Affector::Force(Vec2::new(0.0, 20.0)).apply(&mut p, 0.5);
        assert_eq!(p.velocity, Vec2::new(0.0, 10.0));

        Affector::Scale(Vec2::new(2.0, 2.0)).apply(&mut p, 0.5);
        assert_eq!(p.scale, Vec2::new(2.0, 2.0));

        Affector::Rotate(140.0).apply(&mut p, 0.5);
        assert_relative_eq!(p.rotation, 60.0, epsilon = 1e-4);
        assert_eq!(p.position, Vec2::zeros());
    }
}
