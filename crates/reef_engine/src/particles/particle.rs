//! A single particle

use super::presets::ParticleKind;
use crate::foundation::math::{Transform2D, Vec2};
use crate::render::Colour;

/// One particle owned by a particle system
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position, in world space or in the owner's local space when the
    /// system follows its parent
    pub position: Vec2,
    /// Velocity in pixels per second
    pub velocity: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    /// Scale applied to the system's particle size
    pub scale: Vec2,
    /// Current tint
    pub colour: Colour,
    /// Seconds left to live
    pub lifetime: f32,
    /// Lifetime the particle was spawned with
    pub max_lifetime: f32,
    /// Preset that spawned it
    pub kind: ParticleKind,
}

impl Particle {
    /// Whether the particle has run out of time
    pub fn is_expired(&self) -> bool {
        self.lifetime <= 0.0
    }

    /// Fraction of lifetime remaining, 1 at spawn and 0 at expiry
    pub fn remaining_fraction(&self) -> f32 {
        if self.max_lifetime > 0.0 {
            (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Transform used for drawing
    pub fn transform(&self) -> Transform2D {
        Transform2D {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}
