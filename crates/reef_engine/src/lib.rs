//! # Reef Engine
//!
//! Runtime core for a small 2D arcade game.
//!
//! ## Features
//!
//! - **Scene graph**: entities in a slotmap arena with named components
//! - **Message bus**: deferred, broadcast, one frame of latency
//! - **Physics**: circle bodies with distance-constraint chains
//! - **Particles**: emitters with pluggable affectors and presets
//! - **Seams**: asset lookup, draw submission and input state are traits or
//!   plain data so a host can plug in any window or renderer
//!
//! ## Quick Start
//!
//! ```rust
//! use reef_engine::prelude::*;
//!
//! let mut bus = MessageBus::new();
//! let mut physics = PhysicsWorld::default();
//! let input = InputState::new();
//! let mut scene = Scene::new();
//!
//! let body = physics.add_body(16.0);
//! let mut entity = Entity::new();
//! entity.add_component("control", PhysicsComponent::new(body));
//! scene.add(Layer::FrontMiddle, entity);
//!
//! let mut ctx = FrameContext { bus: &mut bus, physics: &mut physics, input: &input };
//! scene.update(1.0 / 60.0, &mut ctx);
//! scene.sweep(&mut ctx);
//! ```

#![warn(missing_docs)]

pub mod assets;
pub mod config;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod input;
pub mod particles;
pub mod physics;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AnimationData, AssetCache, AssetError, AssetProvider, TextureHandle},
        config::{Config, ConfigError},
        ecs::{
            AnimatedDrawable, Component, ComponentType, Entity, FrameContext, InputComponent,
            Layer, Scene,
        },
        events::{
            Message, MessageBus, PhysicsEvent, PlanktonEvent, PlanktonKind, PlayerEvent, StateId,
            UiEvent,
        },
        foundation::{
            collections::{BodyHandle, EntityId},
            math::{FloatRect, Transform2D, Vec2},
        },
        input::{Direction, InputState},
        particles::{Affector, ParticleKind, ParticleSystem},
        physics::{PhysicsComponent, PhysicsWorld},
        render::{BlendMode, Colour, DrawCall, DrawList, RenderTarget},
    };
}
