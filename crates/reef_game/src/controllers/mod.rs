//! Gameplay controllers
//!
//! `GameController` runs at session level. The other two are script
//! components attached to plankton and body part entities.

pub mod bodypart;
pub mod game;
pub mod plankton;

pub use bodypart::{BodypartController, PartState};
pub use game::{ChainLink, GameController};
pub use plankton::PlanktonController;
