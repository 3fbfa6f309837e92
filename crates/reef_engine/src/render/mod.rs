//! Draw submission seam
//!
//! The runtime describes what to draw as plain [`DrawCall`] values and hands
//! them to a [`RenderTarget`]. Rasterisation lives outside this crate.

use crate::foundation::collections::TextureHandle;
use crate::foundation::math::{Transform2D, Vec2};
use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Colour {
    /// Opaque white
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Build a colour from components
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

/// How a draw call is blended with what is already on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Standard alpha blending
    #[default]
    Alpha,
    /// Additive blending
    Add,
    /// Multiplicative blending
    Multiply,
    /// No blending
    None,
}

/// A single textured quad to draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Texture to sample, `None` draws an untextured quad
    pub texture: Option<TextureHandle>,
    /// Sub-rectangle of the texture in pixels (left, top, width, height)
    pub source: Option<(u32, u32, u32, u32)>,
    /// Size of the quad before transform
    pub size: Vec2,
    /// Point of the quad that sits on the transform position
    pub origin: Vec2,
    /// World transform of the quad
    pub transform: Transform2D,
    /// Tint colour
    pub colour: Colour,
    /// Blend mode
    pub blend: BlendMode,
}

/// Anything that accepts draw calls
pub trait RenderTarget {
    /// Queue a draw call
    fn submit(&mut self, call: DrawCall);
}

/// Render target that just records what it was given
#[derive(Debug, Default)]
pub struct DrawList {
    /// Recorded calls, in submission order
    pub calls: Vec<DrawCall>,
}

impl DrawList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all recorded calls
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl RenderTarget for DrawList {
    fn submit(&mut self, call: DrawCall) {
        self.calls.push(call);
    }
}
