//! Path-keyed asset cache
//!
//! Hands out one stable [`TextureHandle`] per texture path and serves
//! animation data registered up front, either directly or from a RON manifest:
//!
//! ```ron
//! (
//!     animations: {
//!         "assets/images/player/head.cra": (
//!             frame_size: (64, 64),
//!             frame_count: 16,
//!             clips: [(name: "swim", start: 0, end: 15, frame_rate: 18.0)],
//!         ),
//!     },
//! )
//! ```

use super::{AnimationData, AssetError, AssetProvider, TextureHandle};
use serde::Deserialize;
use slotmap::SlotMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct AnimationManifest {
    #[serde(default)]
    animations: HashMap<String, AnimationData>,
}

#[derive(Debug, Clone)]
struct TextureEntry {
    path: String,
}

/// Texture handle and animation data cache
#[derive(Debug, Default)]
pub struct AssetCache {
    root: Option<PathBuf>,
    textures: SlotMap<TextureHandle, TextureEntry>,
    texture_lookup: HashMap<String, TextureHandle>,
    animations: HashMap<String, AnimationData>,
}

impl AssetCache {
    /// Cache that accepts any texture path without touching the disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Cache that requires texture files to exist under `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Register animation data for a path, replacing any previous entry
    pub fn register_animation(&mut self, path: impl Into<String>, data: AnimationData) {
        self.animations.insert(path.into(), data);
    }

    /// Register every animation in a RON manifest string
    pub fn load_manifest_str(&mut self, source: &str) -> Result<usize, AssetError> {
        let manifest: AnimationManifest =
            ron::from_str(source).map_err(|e| AssetError::Manifest(e.to_string()))?;
        let count = manifest.animations.len();
        for (path, data) in manifest.animations {
            if data.clips.is_empty() {
                return Err(AssetError::EmptyAnimation(path));
            }
            self.animations.insert(path, data);
        }
        log::debug!("Registered {} animation(s) from manifest", count);
        Ok(count)
    }

    /// Register every animation in a RON manifest file
    pub fn load_manifest(&mut self, path: impl AsRef<Path>) -> Result<usize, AssetError> {
        let source = std::fs::read_to_string(path)?;
        self.load_manifest_str(&source)
    }

    /// Path a texture handle was created from
    pub fn texture_path(&self, handle: TextureHandle) -> Option<&str> {
        self.textures.get(handle).map(|entry| entry.path.as_str())
    }

    /// Number of distinct textures handed out
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl AssetProvider for AssetCache {
    fn texture(&mut self, path: &str) -> Result<TextureHandle, AssetError> {
        if let Some(&handle) = self.texture_lookup.get(path) {
            return Ok(handle);
        }

        if let Some(root) = &self.root {
            if !root.join(path).is_file() {
                return Err(AssetError::MissingTexture(path.to_string()));
            }
        }

        let handle = self.textures.insert(TextureEntry { path: path.to_string() });
        self.texture_lookup.insert(path.to_string(), handle);
        log::debug!("Loaded texture {}", path);
        Ok(handle)
    }

    fn animation(&mut self, path: &str) -> Result<AnimationData, AssetError> {
        self.animations
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::MissingAnimation(path.to_string()))
    }
}
