//! Character-cell canvas for terminals and headless runs
//!
//! Surface pixels are mapped onto a fixed grid of cells. Good enough to watch
//! a session scroll by in a log, and to snapshot frames in tests.

use glam::Vec2;

use super::{Canvas, Color, SpriteKey};
use crate::SurfaceSize;
use crate::sim::Bounds;

const EMPTY: char = ' ';
const FILL: char = '#';
const SPRITE: char = '@';

pub struct TextCanvas {
    surface: SurfaceSize,
    cols: usize,
    rows: usize,
    cells: Vec<char>,
    /// Per-sprite glyphs; anything unlisted draws as `SPRITE`
    glyphs: Vec<(SpriteKey, char)>,
}

impl TextCanvas {
    pub fn new(surface: SurfaceSize, cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            surface,
            cols,
            rows,
            cells: vec![EMPTY; cols * rows],
            glyphs: Vec::new(),
        }
    }

    /// Draw `sprite` with `glyph` from now on
    pub fn set_glyph(&mut self, sprite: SpriteKey, glyph: char) {
        match self.glyphs.iter_mut().find(|(key, _)| *key == sprite) {
            Some((_, g)) => *g = glyph,
            None => self.glyphs.push((sprite, glyph)),
        }
    }

    fn glyph_for(&self, sprite: &SpriteKey) -> char {
        self.glyphs
            .iter()
            .find(|(key, _)| key == sprite)
            .map_or(SPRITE, |(_, glyph)| *glyph)
    }

    /// Cell character at (col, row)
    pub fn cell(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    /// The current frame, one line per row
    pub fn frame(&self) -> String {
        let mut out = String::with_capacity((self.cols + 1) * self.rows);
        for row in self.cells.chunks(self.cols) {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }

    fn col_of(&self, x: f32) -> isize {
        (x / self.surface.width * self.cols as f32).floor() as isize
    }

    fn row_of(&self, y: f32) -> isize {
        (y / self.surface.height * self.rows as f32).floor() as isize
    }

    /// Paint every cell whose top-left corner lies inside `rect`
    fn paint(&mut self, rect: Bounds, glyph: char) {
        let c0 = self.col_of(rect.x).max(0);
        let c1 = self.col_of(rect.right()).min(self.cols as isize);
        let r0 = self.row_of(rect.y).max(0);
        let r1 = self.row_of(rect.bottom()).min(self.rows as isize);
        for row in r0..r1 {
            for col in c0..c1 {
                self.cells[row as usize * self.cols + col as usize] = glyph;
            }
        }
    }
}

impl Canvas for TextCanvas {
    fn clear(&mut self, _color: Color) {
        self.cells.fill(EMPTY);
    }

    fn fill_rect(&mut self, rect: Bounds, color: Color) {
        if !color.is_transparent() {
            self.paint(rect, FILL);
        }
    }

    fn draw_sprite(&mut self, sprite: &SpriteKey, dest: Bounds, _tint: Option<Color>) {
        let glyph = self.glyph_for(sprite);
        self.paint(dest, glyph);
        // Tiny sprites still deserve one cell
        let (col, row) = (self.col_of(dest.x), self.row_of(dest.y));
        if (0..self.cols as isize).contains(&col) && (0..self.rows as isize).contains(&row) {
            self.cells[row as usize * self.cols + col as usize] = glyph;
        }
    }

    fn draw_text(&mut self, text: &str, origin: Vec2, _size: f32, _color: Color) {
        let row = self.row_of(origin.y) - 1;
        if !(0..self.rows as isize).contains(&row) {
            return;
        }
        let start = self.col_of(origin.x).max(0) as usize;
        for (i, ch) in text.chars().enumerate() {
            let col = start + i;
            if col >= self.cols {
                break;
            }
            self.cells[row as usize * self.cols + col] = ch;
        }
    }
}
