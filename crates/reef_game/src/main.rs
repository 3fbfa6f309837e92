//! Headless runner
//!
//! Loads `reef.toml` (or the path given as the first argument), opens a
//! round and steers the player in a slow circle until the round ends or the
//! frame budget runs out.

use reef_engine::assets::AssetCache;
use reef_engine::config::Config;
use reef_engine::events::{Message, StateId, UiEvent};
use reef_engine::foundation::logging;
use reef_engine::foundation::math::Vec2;
use reef_engine::input::InputState;
use reef_game::{Game, GameConfig};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "reef.toml".to_string());
    let config = GameConfig::load_or_default(&config_path)?;

    let mut assets = match &config.assets.root {
        Some(root) => AssetCache::with_root(root),
        None => AssetCache::in_memory(),
    };
    let animations = match &config.assets.manifest {
        Some(path) => assets.load_manifest(path)?,
        None => assets.load_manifest_str(reef_game::BUNDLED_MANIFEST)?,
    };
    log::info!("Registered {} animation(s)", animations);

    let timestep = config.session.timestep;
    let frame_budget = config.session.frame_budget;
    let mut game = Game::new(config, &mut assets)?;
    game.send(Message::Ui(UiEvent::MenuClosed { state: StateId::Menu }));

    let mut input = InputState::new();
    for frame in 0..frame_budget {
        let angle = frame as f32 * timestep * 0.8;
        input.set_steering(Vec2::new(angle.cos(), angle.sin()));
        game.set_input(input);
        game.tick(timestep);

        if let Some(state) = game.take_state_request() {
            log::info!("Round over after {} frame(s), switching to {:?}", game.frame(), state);
            break;
        }
    }

    log::info!(
        "Final score {} with {} body part(s)",
        game.controller().score(),
        game.controller().body_part_count()
    );
    Ok(())
}
