//! Asset seam
//!
//! The runtime never decodes images or animation files itself. It asks an
//! [`AssetProvider`] for a texture handle or for already-parsed animation
//! data by path. Lookups are synchronous and cached; a missing asset is an
//! error the caller must surface at load time.

pub mod cache;

pub use cache::AssetCache;
pub use crate::foundation::collections::TextureHandle;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named range of frames inside an animation sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    /// Clip name
    pub name: String,
    /// First frame index (inclusive)
    pub start: u32,
    /// Last frame index (inclusive)
    pub end: u32,
    /// Playback rate in frames per second
    #[serde(default = "AnimationClip::default_frame_rate")]
    pub frame_rate: f32,
    /// Whether playback wraps back to `start`
    #[serde(default = "AnimationClip::default_looped")]
    pub looped: bool,
}

impl AnimationClip {
    fn default_frame_rate() -> f32 {
        12.0
    }

    fn default_looped() -> bool {
        true
    }

    /// Number of frames in the clip
    pub fn frame_span(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }
}

/// Parsed animation sheet description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationData {
    /// Size of a single frame in pixels
    pub frame_size: (u32, u32),
    /// Total frames in the sheet
    pub frame_count: u32,
    /// Named clips, in declaration order
    pub clips: Vec<AnimationClip>,
}

impl AnimationData {
    /// Single looping clip covering the whole sheet
    pub fn single_clip(frame_size: (u32, u32), frame_count: u32, frame_rate: f32) -> Self {
        Self {
            frame_size,
            frame_count,
            clips: vec![AnimationClip {
                name: "default".to_string(),
                start: 0,
                end: frame_count.saturating_sub(1),
                frame_rate,
                looped: true,
            }],
        }
    }

    /// Look up a clip by name
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|clip| clip.name == name)
    }
}

/// Asset lookup errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// Texture file could not be found
    #[error("texture not found: {0}")]
    MissingTexture(String),

    /// No animation data registered for the path
    #[error("animation data not found: {0}")]
    MissingAnimation(String),

    /// Animation data declares no clips
    #[error("animation data for {0} declares no clips")]
    EmptyAnimation(String),

    /// Manifest could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest could not be parsed
    #[error("manifest parse error: {0}")]
    Manifest(String),
}

/// Narrow interface to whatever owns textures and animation data
pub trait AssetProvider {
    /// Fetch (or load and cache) a texture by path
    fn texture(&mut self, path: &str) -> Result<TextureHandle, AssetError>;

    /// Fetch animation data by path
    fn animation(&mut self, path: &str) -> Result<AnimationData, AssetError>;
}
