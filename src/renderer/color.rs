//! Packed ARGB colors

use serde::{Deserialize, Serialize};

/// A 32-bit ARGB color (`0xAARRGGBB`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const RED: Color = Color(0xFFFF_0000);

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xFF, r, g, b)
    }

    #[inline]
    pub fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Fully transparent colors are never visible on screen
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.alpha() == 0
    }
}

/// Default obstacle colors
pub mod palette {
    use super::Color;

    pub const OBSTACLES: [Color; 9] = [
        Color::rgb(0xF4, 0x43, 0x36), // red
        Color::rgb(0xE9, 0x1E, 0x63), // pink
        Color::rgb(0x9C, 0x27, 0xB0), // purple
        Color::rgb(0x3F, 0x51, 0xB5), // indigo
        Color::rgb(0x21, 0x96, 0xF3), // blue
        Color::rgb(0x00, 0x96, 0x88), // teal
        Color::rgb(0x4C, 0xAF, 0x50), // green
        Color::rgb(0xFF, 0xC1, 0x07), // amber
        Color::rgb(0xFF, 0x57, 0x22), // deep orange
    ];

    /// Debug tint for score gates
    pub const GATE_DEBUG: Color = Color::argb(0x80, 0xFF, 0x00, 0x00);
}
