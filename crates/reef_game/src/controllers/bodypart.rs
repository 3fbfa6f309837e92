//! Body part behaviour
//!
//! A part stays in the chain until the game controller asks it to leave.
//! Once detached it drifts free, fades out and removes itself.

use reef_engine::ecs::{AnimatedDrawable, Component, ComponentType, Entity, FrameContext};
use reef_engine::events::{Message, PlayerEvent};
use reef_engine::physics::PhysicsComponent;

/// Seconds a detached part takes to fade out
const FADE_TIME: f32 = 1.0;

/// Chain membership of a part
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartState {
    /// Constrained to the part in front of it
    Attached,
    /// Free and fading
    Detached {
        /// Seconds since detaching
        elapsed: f32,
        /// Drawable alpha at the moment of detaching
        start_alpha: u8,
    },
}

/// Script component on every body part
#[derive(Debug, Clone)]
pub struct BodypartController {
    state: PartState,
}

impl Default for BodypartController {
    fn default() -> Self {
        Self::new()
    }
}

impl BodypartController {
    /// Attached part
    pub fn new() -> Self {
        Self { state: PartState::Attached }
    }

    /// Current state
    pub fn state(&self) -> PartState {
        self.state
    }
}

impl Component for BodypartController {
    fn component_type(&self) -> ComponentType {
        ComponentType::Script
    }

    fn on_start(&mut self, entity: &mut Entity, _ctx: &mut FrameContext<'_>) {
        entity.require::<PhysicsComponent>("control");
        entity.require::<AnimatedDrawable>("drawable");
    }

    fn update(&mut self, entity: &mut Entity, dt: f32, _ctx: &mut FrameContext<'_>) {
        let PartState::Detached { elapsed, start_alpha } = &mut self.state else {
            return;
        };
        *elapsed += dt;
        let remaining = (1.0 - *elapsed / FADE_TIME).max(0.0);
        let alpha = (f32::from(*start_alpha) * remaining) as u8;
        entity.require_mut::<AnimatedDrawable>("drawable").set_alpha(alpha);

        if *elapsed >= FADE_TIME && !entity.is_destroyed() {
            log::debug!("Body part {:?} faded out", entity.id());
            entity.destroy();
        }
    }

    fn handle_message(
        &mut self,
        message: &Message,
        entity: &mut Entity,
        ctx: &mut FrameContext<'_>,
    ) {
        let Message::Player(PlayerEvent::DetachPart { part }) = *message else {
            return;
        };
        if part != entity.id() || self.state != PartState::Attached {
            return;
        }

        let handle = entity.require::<PhysicsComponent>("control").handle();
        ctx.physics.detach(handle);
        let start_alpha = entity.require::<AnimatedDrawable>("drawable").colour.a;
        self.state = PartState::Detached { elapsed: 0.0, start_alpha };
        ctx.bus.send(Message::Player(PlayerEvent::PartRemoved { part }));
        log::debug!("Body part {:?} detached", part);
    }
}
