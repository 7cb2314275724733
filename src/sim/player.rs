//! The player: position, jump trajectory and score
//!
//! A jump is a fixed-tick ballistic arc anchored at the height the player had
//! when the jump was triggered:
//!
//! `y(t) = 0.5 * gravity * t² - v0 * t + ground`
//!
//! with `t` counted in ticks. Screen y grows downward, so the player rises
//! first and then falls.

use glam::Vec2;

use super::collision::Bounds;
use super::play::SessionFault;
use crate::config::FloorBehavior;
use crate::consts::*;
use crate::renderer::{Canvas, Color, SpriteKey};
use crate::SurfaceSize;

/// Result of one trajectory step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpStep {
    /// Position committed inside the playfield
    Moved,
    /// Trajectory went above the top edge, clamped to 0
    Ceiling,
    /// Trajectory reached the floor
    Floor,
}

#[derive(Debug, Clone, Copy)]
struct Trajectory {
    /// y when the jump started
    ground: f32,
    /// Ticks since the jump started
    t: u32,
}

#[derive(Debug, Clone)]
pub struct Player {
    surface: SurfaceSize,
    /// Top-left corner
    pub pos: Vec2,
    size: f32,
    v0: f32,
    gravity: f32,
    floor: FloorBehavior,
    trajectory: Option<Trajectory>,
    score: u32,
    sprite: SpriteKey,
    tint: Option<Color>,
}

impl Player {
    /// Size and place a player for `surface`
    ///
    /// The player is a square 10% of the surface height, left-biased
    /// horizontally and vertically centered.
    pub fn new(surface: SurfaceSize, sprite: SpriteKey, tint: Option<Color>) -> Self {
        let size = surface.of_height(PLAYER_SIZE_FRACTION).floor();
        Self {
            surface,
            pos: Vec2::new(
                (surface.width - size) / 4.0,
                (surface.height - size) / 2.0,
            ),
            size,
            v0: surface.of_height(PLAYER_V0_FRACTION),
            gravity: surface.of_height(PLAYER_GRAVITY_FRACTION),
            floor: FloorBehavior::default(),
            trajectory: None,
            score: 0,
            sprite,
            tint,
        }
    }

    /// Override either physics constant; `None` keeps the current value
    pub fn set_physics_constants(&mut self, v0: Option<f32>, gravity: Option<f32>) {
        self.v0 = v0.unwrap_or(self.v0);
        self.gravity = gravity.unwrap_or(self.gravity);
    }

    pub fn set_floor_behavior(&mut self, floor: FloorBehavior) {
        self.floor = floor;
    }

    pub fn v0(&self) -> f32 {
        self.v0
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::square(self.pos, self.size)
    }

    /// y at which the player rests on the floor
    pub fn floor_y(&self) -> f32 {
        self.surface.height - self.size
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_point(&mut self) -> u32 {
        self.score += 1;
        self.score
    }

    pub fn is_jumping(&self) -> bool {
        self.trajectory.is_some()
    }

    /// Ticks elapsed on the current trajectory
    pub fn jump_clock(&self) -> Option<u32> {
        self.trajectory.map(|t| t.t)
    }

    /// Start a new trajectory from the current height, dropping any in-flight one
    pub fn jump(&mut self) {
        self.trajectory = Some(Trajectory {
            ground: self.pos.y,
            t: 0,
        });
    }

    /// Advance the trajectory by one tick
    pub fn tick(&mut self) -> Result<JumpStep, SessionFault> {
        let trajectory = self
            .trajectory
            .as_mut()
            .ok_or(SessionFault::MissingTrajectory)?;

        let t = trajectory.t as f32;
        let candidate = 0.5 * self.gravity * t * t - self.v0 * t + trajectory.ground;
        trajectory.t = trajectory.t.saturating_add(1);

        if !candidate.is_finite() {
            return Err(SessionFault::NonFinitePosition);
        }

        if candidate >= 0.0 && candidate + self.size < self.surface.height {
            self.pos.y = candidate;
            Ok(JumpStep::Moved)
        } else if candidate < 0.0 {
            self.pos.y = 0.0;
            Ok(JumpStep::Ceiling)
        } else {
            match self.floor {
                FloorBehavior::Clamp | FloorBehavior::GameOver => self.pos.y = self.floor_y(),
                FloorBehavior::Freeze => {}
            }
            Ok(JumpStep::Floor)
        }
    }

    /// Stop the trajectory. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.trajectory = None;
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw_sprite(&self.sprite, self.bounds(), self.tint);
    }

    /// Score centered horizontally, just below the top edge
    pub fn draw_score<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let text = self.score.to_string();
        let size = self.surface.of_width(SCORE_TEXT_FRACTION);
        let extent = canvas.measure_text(&text, size);
        let origin = Vec2::new(
            (self.surface.width - extent.x) / 2.0,
            extent.y + self.surface.of_height(SCORE_BASELINE_FRACTION),
        );
        canvas.draw_text(&text, origin, size, Color::RED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCall, RecordingCanvas};

    fn player() -> Player {
        Player::new(SurfaceSize::new(500, 1000), SpriteKey::new("player"), None)
    }

    #[test]
    fn test_initial_layout() {
        let p = player();
        assert_eq!(p.size(), 100.0);
        assert_eq!(p.pos, Vec2::new(100.0, 450.0));
        assert!((p.v0() - 10.0).abs() < 1e-4);
        assert!((p.gravity() - 0.5).abs() < 1e-4);
        assert!(!p.is_jumping());
    }

    #[test]
    fn test_physics_override_keeps_unset() {
        let mut p = player();
        p.set_physics_constants(Some(25.0), None);
        assert_eq!(p.v0(), 25.0);
        assert!((p.gravity() - 0.5).abs() < 1e-4);

        p.set_physics_constants(None, Some(1.2));
        assert_eq!(p.v0(), 25.0);
        assert_eq!(p.gravity(), 1.2);
    }

    #[test]
    fn test_trajectory_follows_formula() {
        let mut p = player();
        p.set_physics_constants(Some(10.0), Some(0.5));
        p.jump();

        // t = 0: stays at ground
        assert_eq!(p.tick().unwrap(), JumpStep::Moved);
        assert_eq!(p.pos.y, 450.0);
        // t = 1: 0.25 - 10 + 450
        p.tick().unwrap();
        assert_eq!(p.pos.y, 440.25);
        // t = 2: 1 - 20 + 450
        p.tick().unwrap();
        assert_eq!(p.pos.y, 431.0);
        assert_eq!(p.jump_clock(), Some(3));
    }

    #[test]
    fn test_ceiling_clamps_to_zero() {
        let mut p = player();
        p.set_physics_constants(Some(500.0), Some(0.0));
        p.jump();
        p.tick().unwrap();
        assert_eq!(p.tick().unwrap(), JumpStep::Ceiling);
        assert_eq!(p.pos.y, 0.0);
        // Still above the ceiling next tick
        assert_eq!(p.tick().unwrap(), JumpStep::Ceiling);
        assert_eq!(p.pos.y, 0.0);
    }

    #[test]
    fn test_new_jump_supersedes_previous() {
        let mut p = player();
        p.jump();
        for _ in 0..5 {
            p.tick().unwrap();
        }
        let y = p.pos.y;
        p.jump();
        assert_eq!(p.jump_clock(), Some(0));
        p.tick().unwrap();
        // First tick of the new trajectory sits at the new ground
        assert_eq!(p.pos.y, y);
    }

    #[test]
    fn test_floor_clamp() {
        let mut p = player();
        p.set_physics_constants(Some(0.0), Some(2000.0));
        p.jump();
        p.tick().unwrap();
        assert_eq!(p.tick().unwrap(), JumpStep::Floor);
        assert_eq!(p.pos.y, 900.0);
    }

    #[test]
    fn test_floor_freeze_keeps_last_position() {
        let mut p = player();
        p.set_floor_behavior(FloorBehavior::Freeze);
        p.set_physics_constants(Some(0.0), Some(2000.0));
        p.jump();
        p.tick().unwrap();
        assert_eq!(p.tick().unwrap(), JumpStep::Floor);
        assert_eq!(p.pos.y, 450.0);
    }

    #[test]
    fn test_tick_without_jump_is_a_fault() {
        let mut p = player();
        assert_eq!(p.tick(), Err(SessionFault::MissingTrajectory));
    }

    #[test]
    fn test_non_finite_physics_is_a_fault() {
        let mut p = player();
        p.set_physics_constants(Some(f32::INFINITY), None);
        p.jump();
        assert_eq!(p.tick(), Err(SessionFault::NonFinitePosition));
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut p = player();
        p.jump();
        p.teardown();
        p.teardown();
        assert!(!p.is_jumping());
    }

    #[test]
    fn test_draw_uses_sprite_and_tint() {
        let mut p = Player::new(
            SurfaceSize::new(500, 1000),
            SpriteKey::new("bird"),
            Some(Color::WHITE),
        );
        p.add_point();
        let mut canvas = RecordingCanvas::new();
        p.draw_score(&mut canvas);
        p.draw(&mut canvas);

        assert_eq!(canvas.texts().collect::<Vec<_>>(), vec!["1"]);
        match &canvas.calls[1] {
            DrawCall::Sprite { sprite, dest, tint } => {
                assert_eq!(sprite.as_str(), "bird");
                assert_eq!(*dest, Bounds::new(100.0, 450.0, 100.0, 100.0));
                assert_eq!(*tint, Some(Color::WHITE));
            }
            other => panic!("expected sprite, got {other:?}"),
        }
    }

    #[test]
    fn test_score_text_is_centered() {
        let p = player();
        let mut canvas = RecordingCanvas::new();
        p.draw_score(&mut canvas);
        match &canvas.calls[0] {
            DrawCall::Text { origin, size, .. } => {
                // "0" at 50px: 30px wide, 50px tall
                assert!((size - 50.0).abs() < 1e-3);
                assert!((origin.x - 235.0).abs() < 1e-3);
                assert!((origin.y - 100.0).abs() < 1e-3);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }
}
