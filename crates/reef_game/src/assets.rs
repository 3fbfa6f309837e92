//! Game asset set
//!
//! Everything a session spawns is resolved once, up front. A missing texture
//! or animation stops the session from being created.

use crate::config::{AssetConfig, SpritePaths};
use reef_engine::assets::{AnimationData, AssetError, AssetProvider, TextureHandle};
use reef_engine::ecs::AnimatedDrawable;
use reef_engine::render::BlendMode;

/// Texture plus animation data for one sprite
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Texture handle
    pub texture: TextureHandle,
    /// Parsed animation data, at least one clip
    pub animation: AnimationData,
}

impl Sprite {
    fn load(paths: &SpritePaths, provider: &mut dyn AssetProvider) -> Result<Self, AssetError> {
        let texture = provider.texture(&paths.texture)?;
        let animation = provider.animation(&paths.animation)?;
        if animation.clips.is_empty() {
            return Err(AssetError::EmptyAnimation(paths.animation.clone()));
        }
        Ok(Self { texture, animation })
    }

    /// Additive drawable playing the first clip from `start_frame`
    pub fn drawable(&self, start_frame: u32) -> AnimatedDrawable {
        let mut drawable = AnimatedDrawable::new(Some(self.texture), self.animation.clone());
        drawable.blend = BlendMode::Add;
        if let Some(clip) = self.animation.clips.first() {
            drawable.play(&clip.name, start_frame);
        }
        drawable
    }
}

/// Every asset a session uses
#[derive(Debug, Clone)]
pub struct GameAssets {
    /// Player head
    pub head: Sprite,
    /// Body part
    pub body_part: Sprite,
    /// Food variants
    pub food: Vec<Sprite>,
    /// Round particle texture
    pub circle: TextureHandle,
    /// Spark particle texture
    pub spark: TextureHandle,
}

impl GameAssets {
    /// Resolve every configured asset
    pub fn load(
        config: &AssetConfig,
        provider: &mut dyn AssetProvider,
    ) -> Result<Self, AssetError> {
        let head = Sprite::load(&config.head, provider)?;
        let body_part = Sprite::load(&config.body_part, provider)?;
        let food = config
            .food
            .iter()
            .map(|paths| Sprite::load(paths, provider))
            .collect::<Result<Vec<_>, _>>()?;
        if food.is_empty() {
            return Err(AssetError::MissingAnimation("no food sprites configured".to_string()));
        }
        let circle = provider.texture(&config.circle)?;
        let spark = provider.texture(&config.spark)?;

        log::info!("Loaded game assets ({} food variant(s))", food.len());
        Ok(Self { head, body_part, food, circle, spark })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reef_engine::assets::AssetCache;

    #[test]
    fn test_missing_animation_is_an_error() {
        let mut cache = AssetCache::in_memory();
        let result = GameAssets::load(&AssetConfig::default(), &mut cache);
        assert!(matches!(
            result,
            Err(AssetError::MissingAnimation(path)) if path.ends_with("head.cra")
        ));
    }

    #[test]
    fn test_bundled_manifest_covers_default_config() {
        let mut cache = AssetCache::in_memory();
        cache.load_manifest_str(crate::BUNDLED_MANIFEST).unwrap();
        let assets = GameAssets::load(&AssetConfig::default(), &mut cache).unwrap();
        assert_eq!(assets.food.len(), 2);
        assert_eq!(cache.texture_count(), 6);
    }
}
