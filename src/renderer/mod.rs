//! Rendering contract
//!
//! The simulation never touches pixels directly. Everything it shows goes
//! through [`Canvas`], which a host backs with whatever 2D API it has
//! (bitmap canvas, GPU quads, a terminal). Asset loading and sprite scaling
//! are the backend's job: the core only names sprites by [`SpriteKey`].

pub mod color;
pub mod recording;
pub mod text;

pub use color::{Color, palette};
pub use recording::{DrawCall, RecordingCanvas};
pub use text::TextCanvas;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::Bounds;

/// Name of an image the backend knows how to draw
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteKey(pub String);

impl SpriteKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SpriteKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Drawing primitives the game needs from its host
pub trait Canvas {
    /// Fill the whole surface
    fn clear(&mut self, color: Color);

    /// Fill a flat-colored rectangle
    fn fill_rect(&mut self, rect: Bounds, color: Color);

    /// Draw a sprite scaled into `dest`, optionally tinted with a uniform color
    fn draw_sprite(&mut self, sprite: &SpriteKey, dest: Bounds, tint: Option<Color>);

    /// Draw text with its baseline-left corner at `origin`
    fn draw_text(&mut self, text: &str, origin: Vec2, size: f32, color: Color);

    /// Width and height of `text` at `size`
    ///
    /// The default assumes a monospace font with 0.6em advance.
    fn measure_text(&self, text: &str, size: f32) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * size * 0.6, size)
    }
}
