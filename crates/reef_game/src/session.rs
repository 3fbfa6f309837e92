//! Game session
//!
//! Owns the scene, physics world, message bus and input state for one game,
//! and runs the fixed frame order:
//!
//! 1. deliver last frame's messages to the controller, then the scene
//! 2. step physics
//! 3. update particle systems
//! 4. update everything else
//! 5. sweep destroyed entities

use crate::assets::GameAssets;
use crate::config::GameConfig;
use crate::controllers::GameController;
use reef_engine::assets::{AssetError, AssetProvider};
use reef_engine::config::ConfigError;
use reef_engine::ecs::{FrameContext, Scene};
use reef_engine::events::{Message, MessageBus, StateId, UiEvent};
use reef_engine::input::InputState;
use reef_engine::physics::PhysicsWorld;
use reef_engine::render::RenderTarget;
use std::collections::VecDeque;
use thiserror::Error;

/// One running game
#[derive(Debug)]
pub struct Game {
    scene: Scene,
    physics: PhysicsWorld,
    bus: MessageBus,
    input: InputState,
    controller: GameController,
    state_requests: VecDeque<StateId>,
    frame: u64,
}

impl Game {
    /// Build a session, resolving every asset first
    pub fn new(config: GameConfig, assets: &mut dyn AssetProvider) -> Result<Self, GameError> {
        log::info!("Initializing game session (seed {})...", config.session.seed);
        let game_assets = GameAssets::load(&config.assets, assets)?;
        let physics = PhysicsWorld::new(config.world.bounds);

        Ok(Self {
            scene: Scene::new(),
            physics,
            bus: MessageBus::new(),
            input: InputState::new(),
            controller: GameController::new(config, game_assets),
            state_requests: VecDeque::new(),
            frame: 0,
        })
    }

    /// Post a message; it is delivered on the next tick
    pub fn send(&mut self, message: Message) {
        self.bus.send(message);
    }

    /// Replace the steering state read during the next tick
    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    /// Run one frame
    pub fn tick(&mut self, dt: f32) {
        self.frame += 1;

        let batch = self.bus.drain();
        let delivered = batch.len();
        for message in batch {
            if let Message::Ui(UiEvent::RequestState { state }) = message {
                self.state_requests.push_back(state);
            }
            let mut ctx = FrameContext {
                bus: &mut self.bus,
                physics: &mut self.physics,
                input: &self.input,
            };
            self.controller.handle_message(&message, &mut self.scene, &mut ctx);
            self.scene.deliver(&message, &mut ctx);
        }

        self.physics.step(dt, &mut self.bus);

        let mut ctx = FrameContext {
            bus: &mut self.bus,
            physics: &mut self.physics,
            input: &self.input,
        };
        self.scene.update_particles(dt, &mut ctx);
        self.scene.update(dt, &mut ctx);
        let swept = self.scene.sweep(&mut ctx);

        log::trace!(
            "frame {}: delivered {}, swept {}, {} entities, {} bodies, {} queued \
             ({} sent / {} drained total)",
            self.frame,
            delivered,
            swept,
            self.scene.len(),
            self.physics.body_count(),
            self.bus.pending(),
            self.bus.sent_count(),
            self.bus.drained_count()
        );
    }

    /// Oldest state change the game asked the host for, if any
    pub fn take_state_request(&mut self) -> Option<StateId> {
        self.state_requests.pop_front()
    }

    /// Submit draw calls for the whole scene
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        self.scene.draw(target);
    }

    /// Scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access, for hosts and tests
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Physics world
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Mutable physics access, for hosts and tests
    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Message bus
    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Session controller
    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    /// Frames run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Session errors
#[derive(Error, Debug)]
pub enum GameError {
    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// An asset could not be resolved
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),
}
