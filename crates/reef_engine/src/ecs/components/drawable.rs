//! Animated sprite drawable
//!
//! Frames are laid out left to right, wrapping into rows when the sheet is
//! wider than `columns` frames.

use crate::assets::{AnimationData, TextureHandle};
use crate::ecs::{Component, ComponentType, Entity, FrameContext};
use crate::foundation::math::{Transform2D, Vec2};
use crate::render::{BlendMode, Colour, DrawCall, RenderTarget};

/// Sprite sheet animation playing on a textured quad
#[derive(Debug, Clone)]
pub struct AnimatedDrawable {
    texture: Option<TextureHandle>,
    animation: AnimationData,
    columns: u32,
    clip: usize,
    frame: u32,
    frame_time: f32,
    playing: bool,
    /// Blend mode used when drawing
    pub blend: BlendMode,
    /// Tint, alpha included
    pub colour: Colour,
    /// Quad origin relative to its top left corner; defaults to the centre
    pub origin: Vec2,
    /// Scale on top of the entity transform
    pub scale: Vec2,
    /// Rotation in degrees on top of the entity transform
    pub rotation: f32,
}

impl AnimatedDrawable {
    /// Create a drawable showing the first frame of the first clip
    pub fn new(texture: Option<TextureHandle>, animation: AnimationData) -> Self {
        let (w, h) = animation.frame_size;
        let columns = animation.frame_count.max(1);
        let frame = animation.clips.first().map_or(0, |clip| clip.start);
        Self {
            texture,
            animation,
            columns,
            clip: 0,
            frame,
            frame_time: 0.0,
            playing: false,
            blend: BlendMode::Alpha,
            colour: Colour::WHITE,
            origin: Vec2::new(w as f32 / 2.0, h as f32 / 2.0),
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
        }
    }

    /// Lay frames out in rows of `columns`
    #[must_use]
    pub fn with_columns(mut self, columns: u32) -> Self {
        self.columns = columns.max(1);
        self
    }

    /// Start playing a clip, `start_frame` frames in
    ///
    /// Unknown clip names leave playback unchanged. Offsets past the end of
    /// the clip wrap around.
    pub fn play(&mut self, clip: &str, start_frame: u32) {
        let Some(index) = self.animation.clips.iter().position(|c| c.name == clip) else {
            log::warn!("AnimatedDrawable: no clip named '{}'", clip);
            return;
        };
        let clip = &self.animation.clips[index];
        self.clip = index;
        self.frame = clip.start + start_frame % clip.frame_span();
        self.frame_time = 0.0;
        self.playing = true;
    }

    /// Stop on the current frame
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Whether a clip is playing
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current absolute frame index
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Animation data this drawable plays
    pub fn animation(&self) -> &AnimationData {
        &self.animation
    }

    /// Frame size in pixels
    pub fn frame_size(&self) -> Vec2 {
        let (w, h) = self.animation.frame_size;
        Vec2::new(w as f32, h as f32)
    }

    /// Set only the alpha of the tint
    pub fn set_alpha(&mut self, alpha: u8) {
        self.colour = self.colour.with_alpha(alpha);
    }

    fn source_rect(&self) -> (u32, u32, u32, u32) {
        let (w, h) = self.animation.frame_size;
        let column = self.frame % self.columns;
        let row = self.frame / self.columns;
        (column * w, row * h, w, h)
    }

    fn advance(&mut self, dt: f32) {
        let Some(clip) = self.animation.clips.get(self.clip) else {
            return;
        };
        if clip.frame_rate <= 0.0 {
            return;
        }
        let frame_duration = 1.0 / clip.frame_rate;
        self.frame_time += dt;
        while self.frame_time >= frame_duration {
            self.frame_time -= frame_duration;
            if self.frame < clip.end {
                self.frame += 1;
            } else if clip.looped {
                self.frame = clip.start;
            } else {
                self.playing = false;
                self.frame_time = 0.0;
                break;
            }
        }
    }
}

impl Component for AnimatedDrawable {
    fn component_type(&self) -> ComponentType {
        ComponentType::Drawable
    }

    fn update(&mut self, _entity: &mut Entity, dt: f32, _ctx: &mut FrameContext<'_>) {
        if self.playing {
            self.advance(dt);
        }
    }

    fn draw(&self, world: &Transform2D, target: &mut dyn RenderTarget) {
        let local = Transform2D {
            position: Vec2::zeros(),
            rotation: self.rotation,
            scale: self.scale,
        };
        target.submit(DrawCall {
            texture: self.texture,
            source: Some(self.source_rect()),
            size: self.frame_size(),
            origin: self.origin,
            transform: world.combine(&local),
            colour: self.colour,
            blend: self.blend,
        });
    }
}
