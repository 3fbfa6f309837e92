//! Built-in components
//!
//! Physics and particle components live with their subsystems.

pub mod drawable;
pub mod input;

pub use drawable::AnimatedDrawable;
pub use input::InputComponent;
