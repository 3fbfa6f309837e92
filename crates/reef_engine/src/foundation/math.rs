//! Math utilities and types
//!
//! Provides the 2D math types used by the scene, physics and particle code.
//! Angles are stored in degrees, matching what drawables expect.

pub use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Transform representing position, rotation, and scale in 2D
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// Position in world or parent space
    pub position: Vec2,

    /// Rotation in degrees, clockwise in screen space
    pub rotation: f32,

    /// Scale factors
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Transform2D {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec2) -> Vec2 {
        self.position + utils::rotate(self.scale.component_mul(&point), self.rotation)
    }

    /// Map a point from the space this transform targets back into its local space
    pub fn inverse_transform_point(&self, point: Vec2) -> Vec2 {
        let unrotated = utils::rotate(point - self.position, -self.rotation);
        Vec2::new(unrotated.x / self.scale.x, unrotated.y / self.scale.y)
    }

    /// Combine this transform with a child transform (`self` is the parent)
    pub fn combine(&self, child: &Transform2D) -> Transform2D {
        Transform2D {
            position: self.transform_point(child.position),
            rotation: utils::wrap_degrees(self.rotation + child.rotation),
            scale: self.scale.component_mul(&child.scale),
        }
    }
}

/// Axis aligned rectangle, left/top/width/height like most 2D APIs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FloatRect {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl FloatRect {
    /// Create a new rectangle
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Centre point
    pub fn centre(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Check if this rectangle contains a point (right and bottom edges exclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x < self.right()
            && point.y >= self.top
            && point.y < self.bottom()
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec2};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Heading of a vector in degrees, in (-180, 180]
    pub fn rotation(v: Vec2) -> f32 {
        rad_to_deg(v.y.atan2(v.x))
    }

    /// Rotate a vector by the given angle in degrees
    pub fn rotate(v: Vec2, degrees: f32) -> Vec2 {
        let (sin, cos) = deg_to_rad(degrees).sin_cos();
        Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
    }

    /// Wrap an angle into [0, 360)
    pub fn wrap_degrees(degrees: f32) -> f32 {
        let wrapped = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if wrapped >= 360.0 { 0.0 } else { wrapped }
    }

    /// Signed shortest turn from `from` to `to`, in (-180, 180]
    pub fn shortest_turn(from: f32, to: f32) -> f32 {
        let delta = wrap_degrees(to - from);
        if delta > 180.0 { delta - 360.0 } else { delta }
    }
}
