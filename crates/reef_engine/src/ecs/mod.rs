//! Entity/component scene graph
//!
//! Entities live in a [`Scene`] arena and own named components. Components
//! receive their entity and a [`FrameContext`] on every call.

pub mod component;
pub mod components;
pub mod entity;
pub mod scene;

pub use component::{AsAny, Component, ComponentType, FrameContext};
pub use components::{AnimatedDrawable, InputComponent};
pub use entity::Entity;
pub use scene::{Layer, Scene};
