//! # Reef
//!
//! A plankton-eating snake arcade game on top of `reef_engine`: the player
//! steers a head trailed by a shrinking chain of body parts, eats good
//! plankton to grow and loses a part for every bad one.

#![warn(missing_docs)]

pub mod assets;
pub mod config;
pub mod controllers;
pub mod session;


pub use config::GameConfig;
pub use session::{Game, GameError};

/// Animation data for the default asset paths
pub const BUNDLED_MANIFEST: &str = include_str!("../assets/animations.ron");
