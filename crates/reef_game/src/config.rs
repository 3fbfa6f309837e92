//! Game configuration
//!
//! Every section has defaults matching the shipped game, so a config file
//! only needs the values it changes.

use reef_engine::config::Config;
use reef_engine::events::PlanktonKind;
use reef_engine::foundation::math::{FloatRect, Vec2};
use reef_engine::physics::DEFAULT_WORLD_BOUNDS;
use serde::{Deserialize, Serialize};

/// Game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Session loop settings
    pub session: SessionConfig,

    /// World and screen geometry
    pub world: WorldConfig,

    /// Player and body chain settings
    pub player: PlayerConfig,

    /// Plankton settings
    pub plankton: PlanktonConfig,

    /// Asset paths
    pub assets: AssetConfig,
}

impl Config for GameConfig {}

/// Session loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for every random choice in the session
    pub seed: u64,

    /// Fixed frame time in seconds
    pub timestep: f32,

    /// Frames the headless runner plays before giving up
    pub frame_budget: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            timestep: 1.0 / 60.0,
            frame_budget: 60 * 60,
        }
    }
}

/// World geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Physics bounds, wider than the screen on both sides
    pub bounds: FloatRect,

    /// Visible screen width
    pub screen_width: f32,

    /// Visible screen height
    pub screen_height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: DEFAULT_WORLD_BOUNDS,
            screen_width: 1920.0,
            screen_height: 1080.0,
        }
    }
}

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Radius of the head body
    pub size: f32,

    /// Factor each body part shrinks by relative to the previous one
    pub part_scale: f32,

    /// Gap added to the first constraint length
    pub padding: f32,

    /// Spawn position
    pub spawn: (f32, f32),

    /// Body parts the chain can hold
    pub max_body_parts: usize,

    /// Body parts added on spawn
    pub initial_body_parts: usize,

    /// Steering acceleration, px/s²
    pub acceleration: f32,

    /// Fraction of velocity lost per second
    pub drag: f32,

    /// Speed cap, px/s
    pub max_speed: f32,
}

impl PlayerConfig {
    /// Spawn position as a vector
    pub fn spawn_position(&self) -> Vec2 {
        Vec2::new(self.spawn.0, self.spawn.1)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: 32.0,
            part_scale: 0.9,
            padding: 1.0,
            spawn: (960.0, 540.0),
            max_body_parts: 6,
            initial_body_parts: 3,
            acceleration: 900.0,
            drag: 0.6,
            max_speed: 420.0,
        }
    }
}

/// Relative odds of each plankton kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindWeights {
    /// Weight of good plankton
    pub good: u32,
    /// Weight of bad plankton
    pub bad: u32,
    /// Weight of bonus plankton
    pub bonus: u32,
}

impl KindWeights {
    /// Weights in `PlanktonKind` order
    pub fn as_array(&self) -> [(PlanktonKind, u32); 3] {
        [
            (PlanktonKind::Good, self.good),
            (PlanktonKind::Bad, self.bad),
            (PlanktonKind::Bonus, self.bonus),
        ]
    }
}

impl Default for KindWeights {
    fn default() -> Self {
        Self { good: 6, bad: 3, bonus: 1 }
    }
}

/// Points awarded per plankton kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindPoints {
    /// Points for good plankton
    pub good: u32,
    /// Points for bad plankton
    pub bad: u32,
    /// Points for bonus plankton
    pub bonus: u32,
}

impl KindPoints {
    /// Points for a kind
    pub fn for_kind(&self, kind: PlanktonKind) -> u32 {
        match kind {
            PlanktonKind::Good => self.good,
            PlanktonKind::Bad => self.bad,
            PlanktonKind::Bonus => self.bonus,
        }
    }
}

impl Default for KindPoints {
    fn default() -> Self {
        Self { good: 10, bad: 0, bonus: 50 }
    }
}

/// Plankton configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanktonConfig {
    /// Body radius
    pub radius: f32,

    /// Plankton spawned when a round starts
    pub initial_count: usize,

    /// Plankton kept alive while the player is
    pub max_count: usize,

    /// Slowest spawn speed, px/s
    pub min_speed: f32,

    /// Fastest spawn speed, px/s
    pub max_speed: f32,

    /// Kind odds
    pub weights: KindWeights,

    /// Kind scores
    pub points: KindPoints,
}

impl Default for PlanktonConfig {
    fn default() -> Self {
        Self {
            radius: 32.0,
            initial_count: 4,
            max_count: 5,
            min_speed: 40.0,
            max_speed: 90.0,
            weights: KindWeights::default(),
            points: KindPoints::default(),
        }
    }
}

/// A texture with its animation description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpritePaths {
    /// Texture path
    pub texture: String,
    /// Animation data path
    pub animation: String,
}

impl SpritePaths {
    fn new(texture: &str, animation: &str) -> Self {
        Self {
            texture: texture.to_string(),
            animation: animation.to_string(),
        }
    }
}

/// Asset paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory texture files must exist under; `None` skips the check
    pub root: Option<String>,

    /// RON manifest with animation data, read from disk when set
    pub manifest: Option<String>,

    /// Player head
    pub head: SpritePaths,

    /// Body part
    pub body_part: SpritePaths,

    /// Food sprites, one picked at random per plankton
    pub food: Vec<SpritePaths>,

    /// Round particle texture
    pub circle: String,

    /// Spark particle texture
    pub spark: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: None,
            manifest: None,
            head: SpritePaths::new(
                "assets/images/player/head.png",
                "assets/images/player/head.cra",
            ),
            body_part: SpritePaths::new(
                "assets/images/player/bodypart01.png",
                "assets/images/player/bodypart01.cra",
            ),
            food: vec![
                SpritePaths::new(
                    "assets/images/player/food01_good.png",
                    "assets/images/player/food01.cra",
                ),
                SpritePaths::new(
                    "assets/images/player/food02_good.png",
                    "assets/images/player/food02.cra",
                ),
            ],
            circle: "assets/images/particles/circle.png".to_string(),
            spark: "assets/images/particles/spark.png".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_match_game_constants() {
        let config = GameConfig::default();
        assert_relative_eq!(config.player.size, 32.0);
        assert_relative_eq!(config.player.part_scale, 0.9);
        assert_eq!(config.player.spawn_position(), Vec2::new(960.0, 540.0));
        assert_eq!(config.player.max_body_parts, 6);
        assert_eq!(config.plankton.max_count, 5);
        assert_eq!(config.plankton.initial_count, 4);
        assert_eq!(config.world.bounds, DEFAULT_WORLD_BOUNDS);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let path = std::env::temp_dir().join(format!("reef_config_{}.toml", std::process::id()));
        std::fs::write(&path, "[session]\nseed = 42\n\n[plankton.weights]\nbad = 0\n").unwrap();

        let config = GameConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.session.seed, 42);
        assert_relative_eq!(config.session.timestep, 1.0 / 60.0);
        assert_eq!(config.plankton.weights, KindWeights { good: 6, bad: 0, bonus: 1 });
        assert_eq!(config.assets, AssetConfig::default());
    }

    #[test]
    fn test_points_by_kind() {
        let points = KindPoints::default();
        assert_eq!(points.for_kind(PlanktonKind::Bonus), 50);
        assert_eq!(points.for_kind(PlanktonKind::Bad), 0);
    }
}
