//! Steering input component
//!
//! Turns the host's steering vector into acceleration on the entity's
//! "control" body.

use crate::ecs::{Component, ComponentType, Entity, FrameContext};
use crate::foundation::math::utils;
use crate::physics::PhysicsComponent;

/// Speed below which the heading is left alone
const HEADING_THRESHOLD: f32 = 1.0;

/// Applies steering to the "control" body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputComponent {
    /// Acceleration at full steer, px/s²
    pub acceleration: f32,
    /// Fraction of velocity lost per second
    pub drag: f32,
    /// Speed cap, px/s
    pub max_speed: f32,
}

impl Default for InputComponent {
    fn default() -> Self {
        Self {
            acceleration: 900.0,
            drag: 0.6,
            max_speed: 420.0,
        }
    }
}

impl InputComponent {
    /// Component with the default handling values
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for InputComponent {
    fn component_type(&self) -> ComponentType {
        ComponentType::Input
    }

    fn update(&mut self, entity: &mut Entity, dt: f32, ctx: &mut FrameContext<'_>) {
        let handle = entity.require::<PhysicsComponent>("control").handle();
        let Some(body) = ctx.physics.body_mut(handle) else {
            return;
        };

        let mut velocity = body.velocity + ctx.input.steering() * self.acceleration * dt;
        velocity *= (1.0 - self.drag * dt).max(0.0);
        let speed = velocity.norm();
        if speed > self.max_speed {
            velocity *= self.max_speed / speed;
        }
        body.velocity = velocity;

        if speed > HEADING_THRESHOLD {
            entity.set_rotation(utils::rotation(velocity));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MessageBus;
    use crate::foundation::math::Vec2;
    use crate::input::{Direction, InputState};
    use crate::physics::PhysicsWorld;
    use approx::assert_relative_eq;

    fn setup(physics: &mut PhysicsWorld) -> Entity {
        let handle = physics.add_body(32.0);
        let mut entity = Entity::new();
        entity.add_component("control", PhysicsComponent::new(handle));
        entity
    }

    #[test]
    fn test_steering_accelerates_and_sets_heading() {
        let mut bus = MessageBus::new();
        let mut physics = PhysicsWorld::default();
        let mut input = InputState::new();
        input.set_held(&[Direction::Right]);
        let mut entity = setup(&mut physics);
        let handle = entity.require::<PhysicsComponent>("control").handle();

        let mut component = InputComponent::new();
        let mut ctx = FrameContext { bus: &mut bus, physics: &mut physics, input: &input };
        component.update(&mut entity, 0.1, &mut ctx);

        let velocity = ctx.physics.body(handle).unwrap().velocity;
        assert_relative_eq!(velocity.x, 90.0 * (1.0 - 0.06), epsilon = 1e-3);
        assert_relative_eq!(entity.rotation(), 0.0);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut bus = MessageBus::new();
        let mut physics = PhysicsWorld::default();
        let mut input = InputState::new();
        input.set_held(&[Direction::Down]);
        let mut entity = setup(&mut physics);
        let handle = entity.require::<PhysicsComponent>("control").handle();
        physics.body_mut(handle).unwrap().velocity = Vec2::new(0.0, 1000.0);

        let mut component = InputComponent::new();
        let mut ctx = FrameContext { bus: &mut bus, physics: &mut physics, input: &input };
        component.update(&mut entity, 0.016, &mut ctx);

        let speed = ctx.physics.body(handle).unwrap().velocity.norm();
        assert_relative_eq!(speed, 420.0, epsilon = 1e-3);
        assert_relative_eq!(entity.rotation(), 90.0, epsilon = 1e-3);
    }
}
