//! Physics: circle bodies, distance-constraint chains and overlap messages
//!
//! Not a general engine. Bodies are circles, constraints are rigid parent
//! distances, and overlaps are reported through the message bus.

pub mod component;
pub mod world;

pub use component::PhysicsComponent;
pub use world::{Body, Constraint, PhysicsWorld, DEFAULT_WORLD_BOUNDS};
