//! Input state
//!
//! Device polling happens in the host. Each frame the host writes the
//! resulting steering intent here and input components read it.

use crate::foundation::math::Vec2;

/// Directional keys the host may map to steering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Up
    Up,
    /// Down
    Down,
    /// Left
    Left,
    /// Right
    Right,
}

/// Steering intent for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    steer: Vec2,
}

impl InputState {
    /// No steering
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the steering vector; anything longer than one is normalised
    pub fn set_steering(&mut self, steer: Vec2) {
        let length = steer.norm();
        self.steer = if length > 1.0 { steer / length } else { steer };
    }

    /// Build the steering vector from a set of held directions
    pub fn set_held(&mut self, held: &[Direction]) {
        let steer = held.iter().fold(Vec2::zeros(), |acc, direction| {
            acc + match direction {
                Direction::Up => Vec2::new(0.0, -1.0),
                Direction::Down => Vec2::new(0.0, 1.0),
                Direction::Left => Vec2::new(-1.0, 0.0),
                Direction::Right => Vec2::new(1.0, 0.0),
            }
        });
        self.set_steering(steer);
    }

    /// Current steering vector, length in [0, 1]
    pub fn steering(&self) -> Vec2 {
        self.steer
    }
}
