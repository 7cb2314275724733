//! Obstacle field: spawning, scrolling and drawing pillar pairs
//!
//! Each spawn adds one column of three segments sharing an x coordinate:
//! a top pillar, an invisible score gate, and a bottom pillar. Segments are
//! consumed by deactivation, never by removal, so indices stay valid for the
//! whole of a tick. Only segments that have scrolled well past the left edge
//! are dropped, between ticks, by [`ObstacleField::compact`].

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Bounds;
use crate::consts::*;
use crate::renderer::{Canvas, Color, palette};
use crate::SurfaceSize;

/// Which part of a column a segment is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Top,
    /// Invisible gap filler; overlapping it scores a point
    Gate,
    Bottom,
}

/// One rectangular obstacle piece
#[derive(Debug, Clone)]
pub struct Segment {
    pub kind: SegmentKind,
    pub bounds: Bounds,
    pub color: Color,
    /// Inactive segments are skipped by collision and drawing
    pub active: bool,
}

impl Segment {
    #[inline]
    pub fn is_score_gate(&self) -> bool {
        self.kind == SegmentKind::Gate
    }
}

#[derive(Debug, Clone)]
pub struct ObstacleField {
    surface: SurfaceSize,
    /// Vertical size of the pass-through gap
    gap: f32,
    /// Horizontal scroll per tick
    speed: f32,
    width: f32,
    compaction_margin: f32,
    debug_gates: bool,
    palette: Vec<Color>,
    /// Spawn order, never reordered
    segments: Vec<Segment>,
    rng: Pcg32,
    columns_spawned: u64,
    /// Cleared by teardown; spawn and scroll do nothing afterwards
    running: bool,
}

impl ObstacleField {
    pub fn new(surface: SurfaceSize, seed: u64) -> Self {
        let mut field = Self {
            surface,
            gap: 0.0,
            speed: surface.of_width(SCROLL_SPEED_FRACTION),
            width: surface.of_width(SEGMENT_WIDTH_FRACTION),
            compaction_margin: surface.of_width(COMPACTION_MARGIN_FRACTION),
            debug_gates: false,
            palette: palette::OBSTACLES.to_vec(),
            segments: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            columns_spawned: 0,
            running: false,
        };
        field.initialize(None);
        field
    }

    /// Set the gap size (30% of height by default), clear all segments and
    /// resume spawning and scrolling
    ///
    /// Gaps that would leave no room for the top pillar's minimum height are
    /// clamped.
    pub fn initialize(&mut self, gap: Option<f32>) {
        let default_gap = self.surface.of_height(GAP_FRACTION);
        let max_gap = self.surface.of_height(1.0 - TOP_MIN_FRACTION);

        self.gap = match gap {
            Some(gap) if gap.is_finite() && gap > 0.0 => {
                if gap > max_gap {
                    log::warn!("Gap {gap} does not fit the surface, clamping to {max_gap}");
                }
                gap.min(max_gap)
            }
            Some(gap) => {
                log::warn!("Ignoring invalid gap {gap}, using {default_gap}");
                default_gap
            }
            None => default_gap,
        };
        self.segments.clear();
        self.columns_spawned = 0;
        self.running = true;
    }

    /// Replace the spawn palette. An empty list keeps the current one.
    pub fn set_color_palette(&mut self, colors: &[Color]) {
        if colors.is_empty() {
            return;
        }
        self.palette = colors.to_vec();
    }

    /// Scroll per tick as a fraction of the surface width
    pub fn set_scroll_speed(&mut self, fraction: f32) {
        self.speed = self.surface.of_width(fraction);
    }

    /// How far past the left edge segments travel before compaction, of surface width
    pub fn set_compaction_margin(&mut self, fraction: f32) {
        self.compaction_margin = self.surface.of_width(fraction.max(0.0));
    }

    pub fn set_debug_gates(&mut self, enabled: bool) {
        self.debug_gates = enabled;
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn segment_width(&self) -> f32 {
        self.width
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn columns_spawned(&self) -> u64 {
        self.columns_spawned
    }

    /// All segments in spawn order, consumed ones included
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[cfg(test)]
    pub(crate) fn segments_mut(&mut self) -> &mut Vec<Segment> {
        &mut self.segments
    }

    /// Segments still taking part in collision and drawing
    pub fn active_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.active)
    }

    /// Mark a segment consumed. Returns whether it was active.
    pub fn deactivate(&mut self, index: usize) -> bool {
        match self.segments.get_mut(index) {
            Some(segment) if segment.active => {
                segment.active = false;
                true
            }
            _ => false,
        }
    }

    /// Add one column just off the right edge
    pub fn spawn(&mut self) {
        if !self.running {
            return;
        }
        let height = self.surface.height;
        let x = self.surface.width + self.width;

        // Top pillar height: integer in [30%, 70%) of the height, shrunk so the gap fits
        let lo = self.surface.of_height(TOP_MIN_FRACTION) as u32;
        let hi = self
            .surface
            .of_height(TOP_MAX_FRACTION)
            .min(height - self.gap) as u32;
        let top = if hi > lo {
            self.rng.random_range(lo..hi) as f32
        } else {
            lo as f32
        };

        let color = self.palette[self.rng.random_range(0..self.palette.len())];
        let gate_color = if self.debug_gates {
            palette::GATE_DEBUG
        } else {
            Color::TRANSPARENT
        };
        let bottom_y = top + self.gap;

        self.segments.extend([
            Segment {
                kind: SegmentKind::Top,
                bounds: Bounds::new(x, 0.0, self.width, top),
                color,
                active: true,
            },
            Segment {
                kind: SegmentKind::Gate,
                bounds: Bounds::new(x, top, self.width, self.gap),
                color: gate_color,
                active: true,
            },
            Segment {
                kind: SegmentKind::Bottom,
                bounds: Bounds::new(x, bottom_y, self.width, height - bottom_y),
                color,
                active: true,
            },
        ]);
        self.columns_spawned += 1;
        log::debug!(
            "Spawned column {} (top={top}, gap={}, segments={})",
            self.columns_spawned,
            self.gap,
            self.segments.len()
        );
    }

    /// Move every segment left by one tick's worth of scroll
    pub fn scroll(&mut self) {
        if !self.running {
            return;
        }
        for segment in &mut self.segments {
            segment.bounds.x -= self.speed;
        }
    }

    /// Drop segments that have scrolled past the compaction margin
    ///
    /// Must run between ticks, never while indices into [`Self::segments`]
    /// are held. Returns the number of segments dropped.
    pub fn compact(&mut self) -> usize {
        let cutoff = -self.compaction_margin;
        let before = self.segments.len();
        self.segments.retain(|s| s.bounds.right() >= cutoff);
        let dropped = before - self.segments.len();
        if dropped > 0 {
            log::debug!("Compacted {dropped} segments, {} left", self.segments.len());
        }
        dropped
    }

    /// Freeze the field: later spawn and scroll calls are ignored, the
    /// current segments stay drawable. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.running = false;
    }

    /// One flat rectangle per active segment
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for segment in self.active_segments() {
            canvas.fill_rect(segment.bounds, segment.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingCanvas;
    use proptest::prelude::*;

    fn field() -> ObstacleField {
        ObstacleField::new(SurfaceSize::new(500, 1000), 7)
    }

    #[test]
    fn test_default_gap_and_speed() {
        let f = field();
        assert!((f.gap() - 300.0).abs() < 1e-3);
        assert!((f.speed() - 5.5).abs() < 1e-3);
        assert!((f.segment_width() - 50.0).abs() < 1e-3);
        assert!(f.segments().is_empty());
    }

    #[test]
    fn test_spawn_column_layout() {
        let mut f = field();
        f.spawn();

        let segs = f.segments();
        assert_eq!(segs.len(), 3);
        assert_eq!(
            segs.iter().map(|s| s.kind).collect::<Vec<_>>(),
            vec![SegmentKind::Top, SegmentKind::Gate, SegmentKind::Bottom]
        );

        let (top, gate, bottom) = (&segs[0], &segs[1], &segs[2]);
        assert!(segs.iter().all(|s| s.bounds.x == 550.0 && s.active));
        assert_eq!(top.bounds.y, 0.0);
        assert!(top.bounds.height >= 300.0 && top.bounds.height < 700.0);
        assert_eq!(top.bounds.height.fract(), 0.0);
        assert_eq!(gate.bounds.y, top.bounds.height);
        assert_eq!(bottom.bounds.y, gate.bounds.bottom());
        assert!((bottom.bounds.bottom() - 1000.0).abs() < 1e-3);

        assert_eq!(top.color, bottom.color);
        assert!(gate.color.is_transparent());
        assert!(gate.is_score_gate());
        assert!(!top.is_score_gate());
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = field();
        let mut b = field();
        for _ in 0..5 {
            a.spawn();
            b.spawn();
        }
        let heights = |f: &ObstacleField| {
            f.segments()
                .iter()
                .map(|s| (s.bounds.height, s.color))
                .collect::<Vec<_>>()
        };
        assert_eq!(heights(&a), heights(&b));
    }

    #[test]
    fn test_oversized_gap_is_clamped() {
        let mut f = field();
        f.initialize(Some(5000.0));
        assert!((f.gap() - 700.0).abs() < 1e-3);
        f.spawn();
        let segs = f.segments();
        assert!(segs[2].bounds.height >= 0.0);
        assert!((segs[2].bounds.bottom() - 1000.0).abs() < 1e-3);

        f.initialize(Some(-1.0));
        assert!((f.gap() - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_initialize_clears_segments() {
        let mut f = field();
        f.spawn();
        f.initialize(Some(200.0));
        assert!(f.segments().is_empty());
        assert_eq!(f.gap(), 200.0);
    }

    #[test]
    fn test_teardown_freezes_field() {
        let mut f = field();
        f.spawn();
        f.teardown();
        f.teardown();
        assert!(!f.is_running());

        f.spawn();
        f.scroll();
        assert_eq!(f.segments().len(), 3);
        assert_eq!(f.segments()[0].bounds.x, 550.0);
    }

    #[test]
    fn test_palette_replacement() {
        let mut f = field();
        f.set_color_palette(&[]);
        assert_eq!(f.palette().len(), 9);

        f.set_color_palette(&[Color::BLACK]);
        f.spawn();
        assert_eq!(f.segments()[0].color, Color::BLACK);
        assert_eq!(f.segments()[2].color, Color::BLACK);
    }

    #[test]
    fn test_debug_gates_are_visible() {
        let mut f = field();
        f.set_debug_gates(true);
        f.spawn();
        assert!(!f.segments()[1].color.is_transparent());
    }

    #[test]
    fn test_scroll_moves_every_segment() {
        let mut f = field();
        f.spawn();
        f.deactivate(1);
        f.scroll();
        f.scroll();
        for s in f.segments() {
            assert!((s.bounds.x - 539.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let mut f = field();
        f.spawn();
        assert!(f.deactivate(1));
        assert!(!f.deactivate(1));
        assert!(!f.deactivate(99));
        assert_eq!(f.active_segments().count(), 2);
    }

    #[test]
    fn test_draw_skips_inactive() {
        let mut f = field();
        f.spawn();
        f.deactivate(1);
        let mut canvas = RecordingCanvas::new();
        f.draw(&mut canvas);
        assert_eq!(canvas.rects().count(), 2);

        f.deactivate(0);
        f.deactivate(2);
        canvas.clear_calls();
        f.draw(&mut canvas);
        assert!(canvas.calls.is_empty());
    }

    #[test]
    fn test_compaction_drops_only_offscreen_and_keeps_order() {
        let mut f = field();
        f.set_scroll_speed(0.1); // 50px per tick
        f.spawn();
        for _ in 0..10 {
            f.scroll();
        }
        f.spawn();
        // First column at x = 50, second at x = 550
        assert_eq!(f.compact(), 0);

        // First column right edge: 50 + 50 - 3*50 = -50 == -margin, still kept
        for _ in 0..3 {
            f.scroll();
        }
        assert_eq!(f.compact(), 0);

        f.scroll();
        assert_eq!(f.compact(), 3);
        assert_eq!(f.segments().len(), 3);
        assert_eq!(f.segments()[0].kind, SegmentKind::Top);
        assert_eq!(f.segments()[1].kind, SegmentKind::Gate);
    }

    proptest! {
        #[test]
        fn prop_column_fills_surface_height(
            seed in any::<u64>(),
            width in 50u32..2000,
            height in 50u32..2000,
            gap_fraction in 0.05f32..0.9,
        ) {
            let surface = SurfaceSize::new(width, height);
            let mut f = ObstacleField::new(surface, seed);
            f.initialize(Some(surface.of_height(gap_fraction)));
            f.spawn();

            let segs = f.segments();
            prop_assert_eq!(segs.len(), 3);
            let total = segs[0].bounds.height + segs[1].bounds.height + segs[2].bounds.height;
            prop_assert!((total - surface.height).abs() < 1e-2);
            prop_assert!(segs[2].bounds.height >= -1e-3);
        }
    }
}
