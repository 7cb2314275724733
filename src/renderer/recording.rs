//! Canvas that records draw calls instead of rasterizing them

use glam::Vec2;

use super::{Canvas, Color, SpriteKey};
use crate::sim::Bounds;

/// One recorded primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear(Color),
    Rect {
        rect: Bounds,
        color: Color,
    },
    Sprite {
        sprite: SpriteKey,
        dest: Bounds,
        tint: Option<Color>,
    },
    Text {
        text: String,
        origin: Vec2,
        size: f32,
        color: Color,
    },
}

/// Keeps every draw call in submission order
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Rectangles drawn, in order
    pub fn rects(&self) -> impl Iterator<Item = (&Bounds, &Color)> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Rect { rect, color } => Some((rect, color)),
            _ => None,
        })
    }

    /// Sprites drawn, in order
    pub fn sprites(&self) -> impl Iterator<Item = &SpriteKey> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Sprite { sprite, .. } => Some(sprite),
            _ => None,
        })
    }

    /// Text strings drawn, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: Color) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn fill_rect(&mut self, rect: Bounds, color: Color) {
        self.calls.push(DrawCall::Rect { rect, color });
    }

    fn draw_sprite(&mut self, sprite: &SpriteKey, dest: Bounds, tint: Option<Color>) {
        self.calls.push(DrawCall::Sprite {
            sprite: sprite.clone(),
            dest,
            tint,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Vec2, size: f32, color: Color) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            origin,
            size,
            color,
        });
    }
}
