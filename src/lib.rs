//! Flapview - an embeddable tap-to-flap arcade game surface
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (player physics, obstacles, collisions, timers)
//! - `surface`: Session state machine and host-facing lifecycle hooks
//! - `events`: Observer registry for game lifecycle events
//! - `renderer`: Drawing contract consumed by the simulation
//! - `config`: Data-driven tuning and appearance

pub mod config;
pub mod events;
pub mod renderer;
pub mod sim;
pub mod surface;

pub use config::{ConfigError, FloorBehavior, GameConfig};
pub use events::{EventRegistry, GameEvent, ListenerId};
pub use renderer::{Canvas, Color, SpriteKey};
pub use surface::{GameSurface, Session, SurfaceError, TapOutcome};

use serde::{Deserialize, Serialize};

/// Game configuration constants
///
/// Every dimension is a fraction of the surface so the game plays the same
/// on any resolution.
pub mod consts {
    /// Default tick period in milliseconds (~60 Hz)
    pub const DEFAULT_UPDATE_MS: u64 = 16;
    pub const DEFAULT_FPS: u32 = 60;
    /// Obstacle spawn cadence
    pub const DEFAULT_SPAWN_INTERVAL_MS: u64 = 2000;

    /// Largest wall-clock step accepted by a single `advance` call
    pub const MAX_FRAME_MS: u64 = 250;
    /// Maximum timer events per `advance` to prevent spiral of death
    pub const MAX_EVENTS_PER_ADVANCE: u32 = 64;
    /// Most unsimulated time a session carries before dropping the excess
    pub const MAX_BACKLOG_MS: u64 = 1000;

    /// Player edge length, of surface height
    pub const PLAYER_SIZE_FRACTION: f32 = 0.1;
    /// Initial jump velocity per tick, of surface height
    pub const PLAYER_V0_FRACTION: f32 = 0.01;
    /// Gravity per tick², of surface height
    pub const PLAYER_GRAVITY_FRACTION: f32 = 0.0005;

    /// Pass-through gap, of surface height
    pub const GAP_FRACTION: f32 = 0.3;
    /// Top pillar height range [min, max), of surface height
    pub const TOP_MIN_FRACTION: f32 = 0.3;
    pub const TOP_MAX_FRACTION: f32 = 0.7;
    /// Segment width, of surface width
    pub const SEGMENT_WIDTH_FRACTION: f32 = 0.1;
    /// Scroll distance per tick, of surface width (10px at ~900px wide)
    pub const SCROLL_SPEED_FRACTION: f32 = 0.011;
    /// How far past the left edge a segment travels before it is compacted, of surface width
    pub const COMPACTION_MARGIN_FRACTION: f32 = 0.1;

    /// Start/restart icon edge, of surface height
    pub const ICON_SIZE_FRACTION: f32 = 0.4;
    /// Score text size, of surface width
    pub const SCORE_TEXT_FRACTION: f32 = 0.1;
    /// Gap between the top edge and the score text, of surface height
    pub const SCORE_BASELINE_FRACTION: f32 = 0.05;
}

/// Scale a base dimension by a fraction of it
#[inline]
pub fn scale(base: f32, fraction: f32) -> f32 {
    base * fraction
}

/// Pixel dimensions of the hosting surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Fraction of the surface width
    #[inline]
    pub fn of_width(&self, fraction: f32) -> f32 {
        scale(self.width, fraction)
    }

    /// Fraction of the surface height
    #[inline]
    pub fn of_height(&self, fraction: f32) -> f32 {
        scale(self.height, fraction)
    }
}
