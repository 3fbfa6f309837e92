//! Component trait and frame context
//!
//! Components are the unit of behaviour attached to an [`Entity`]. The set of
//! kinds is closed ([`ComponentType`]); dispatch goes through one flat trait.

use super::Entity;
use crate::events::{Message, MessageBus};
use crate::foundation::math::Transform2D;
use crate::input::InputState;
use crate::physics::PhysicsWorld;
use crate::render::RenderTarget;
use std::any::Any;

/// Closed set of component kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// Something that submits draw calls
    Drawable,
    /// Handle to a physics body
    Physics,
    /// Particle emitter
    ParticleSystem,
    /// Reads the host's input state
    Input,
    /// Gameplay logic
    Script,
}

/// Everything a component may touch besides its own entity
pub struct FrameContext<'a> {
    /// Bus for posting messages (delivered next frame)
    pub bus: &'a mut MessageBus,
    /// Physics world owning every body
    pub physics: &'a mut PhysicsWorld,
    /// Host input for this frame
    pub input: &'a InputState,
}

/// Downcasting support, implemented for every `'static` type
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour attached to an entity
///
/// The owning entity is passed into every call instead of being stored, so a
/// component never keeps its entity alive. While one of these methods runs,
/// the component itself is detached from the entity: sibling lookups work,
/// looking up its own name returns `None`.
pub trait Component: AsAny {
    /// Kind of this component
    fn component_type(&self) -> ComponentType;

    /// Called once, before the first update or message
    fn on_start(&mut self, _entity: &mut Entity, _ctx: &mut FrameContext<'_>) {}

    /// Per-frame update
    fn update(&mut self, entity: &mut Entity, dt: f32, ctx: &mut FrameContext<'_>);

    /// Called for every message delivered this frame
    fn handle_message(
        &mut self,
        _message: &Message,
        _entity: &mut Entity,
        _ctx: &mut FrameContext<'_>,
    ) {
    }

    /// Called when the owning entity is swept
    fn on_destroy(&mut self, _ctx: &mut FrameContext<'_>) {}

    /// Submit draw calls; `world` is the owning entity's world transform
    fn draw(&self, _world: &Transform2D, _target: &mut dyn RenderTarget) {}
}
