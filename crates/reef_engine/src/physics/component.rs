//! Physics component: ties an entity to a body in the world

use crate::ecs::{Component, ComponentType, Entity, FrameContext};
use crate::foundation::collections::BodyHandle;

/// Handle to the entity's body
///
/// The body drives the entity: every update copies the body position into
/// the entity's world position, so physics entities ignore parenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsComponent {
    handle: BodyHandle,
}

impl PhysicsComponent {
    /// Wrap an existing body
    pub fn new(handle: BodyHandle) -> Self {
        Self { handle }
    }

    /// Body handle
    pub fn handle(&self) -> BodyHandle {
        self.handle
    }
}

impl Component for PhysicsComponent {
    fn component_type(&self) -> ComponentType {
        ComponentType::Physics
    }

    fn on_start(&mut self, entity: &mut Entity, ctx: &mut FrameContext<'_>) {
        ctx.physics.bind(self.handle, entity.id());
        if let Some(body) = ctx.physics.body(self.handle) {
            entity.set_world_position(body.position);
        }
    }

    fn update(&mut self, entity: &mut Entity, _dt: f32, ctx: &mut FrameContext<'_>) {
        if let Some(body) = ctx.physics.body(self.handle) {
            entity.set_world_position(body.position);
        }
    }

    fn on_destroy(&mut self, ctx: &mut FrameContext<'_>) {
        ctx.physics.remove_body(self.handle);
    }
}
