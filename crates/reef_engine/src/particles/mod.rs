//! Particle effects
//!
//! A [`ParticleSystem`] is a component that owns its particles and a closed
//! list of [`Affector`]s. Presets cover the game's three effects.

pub mod affector;
pub mod particle;
pub mod presets;
pub mod system;

pub use affector::Affector;
pub use particle::Particle;
pub use presets::ParticleKind;
pub use system::ParticleSystem;
