//! Game configuration
//!
//! Everything a host can tune before a session starts. Values are read when a
//! session is built, so changes apply from the next `start()` on (the frame
//! rate is the one exception, see [`crate::GameSurface::set_fps`]).

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::renderer::{Color, SpriteKey, palette};

/// What happens when a jump trajectory carries the player into the floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FloorBehavior {
    /// Rest on the floor
    #[default]
    Clamp,
    /// Touching the floor ends the session
    GameOver,
    /// Keep the last in-bounds position for as long as the trajectory stays below the floor
    Freeze,
}

impl FloorBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            FloorBehavior::Clamp => "clamp",
            FloorBehavior::GameOver => "game-over",
            FloorBehavior::Freeze => "freeze",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Frames per second must be greater than zero")]
    InvalidFps,
    #[error("Spawn interval must be greater than zero")]
    InvalidSpawnInterval,
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Host-facing game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Timing ===
    /// Target simulation rate; the tick period is `1000 / fps` ms
    pub fps: u32,
    /// Obstacle spawn cadence
    pub spawn_interval_ms: u64,

    // === Physics ===
    /// Initial jump velocity override (pixels per tick)
    pub jump_v0: Option<f32>,
    /// Gravity override (pixels per tick²)
    pub gravity: Option<f32>,
    /// Pass-through gap override in pixels
    pub gap: Option<f32>,
    /// Obstacle scroll per tick, of surface width
    pub scroll_speed_fraction: f32,
    pub floor: FloorBehavior,

    // === Appearance ===
    /// Obstacle colors; one is picked per spawned pair
    pub palette: Vec<Color>,
    pub background: Color,
    pub player_sprite: SpriteKey,
    pub player_tint: Option<Color>,
    pub start_icon: SpriteKey,
    pub restart_icon: SpriteKey,
    pub icon_tint: Option<Color>,
    /// Paint score gates instead of leaving them invisible
    pub debug_gates: bool,

    // === Host integration ===
    /// Emit short advisory messages ("Tap start !", game over summary)
    pub show_advisories: bool,

    // === Housekeeping ===
    /// Segments further than this past the left edge are dropped, of surface width
    pub compaction_margin_fraction: f32,
    /// Fixed RNG seed for reproducible obstacle layouts
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            spawn_interval_ms: DEFAULT_SPAWN_INTERVAL_MS,

            jump_v0: None,
            gravity: None,
            gap: None,
            scroll_speed_fraction: SCROLL_SPEED_FRACTION,
            floor: FloorBehavior::Clamp,

            palette: palette::OBSTACLES.to_vec(),
            background: Color::TRANSPARENT,
            player_sprite: SpriteKey::new("player"),
            player_tint: None,
            start_icon: SpriteKey::new("start"),
            restart_icon: SpriteKey::new("restart"),
            icon_tint: None,
            debug_gates: false,

            show_advisories: true,

            compaction_margin_fraction: COMPACTION_MARGIN_FRACTION,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Tick period shared by the jump, scroll and master timers
    pub fn update_ms(&self) -> u64 {
        (1000 / u64::from(self.fps.max(1))).max(1)
    }

    /// Replace the obstacle palette. An empty list keeps the current one.
    pub fn set_palette(&mut self, colors: Vec<Color>) {
        if colors.is_empty() {
            log::debug!("Ignoring empty obstacle palette");
            return;
        }
        self.palette = colors;
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::InvalidFps);
        }
        if self.spawn_interval_ms == 0 {
            return Err(ConfigError::InvalidSpawnInterval);
        }
        let optional = [
            ("jump_v0", self.jump_v0),
            ("gravity", self.gravity),
            ("gap", self.gap),
        ];
        for (name, value) in optional {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(ConfigError::NonFinite(name));
            }
        }
        if !self.scroll_speed_fraction.is_finite() {
            return Err(ConfigError::NonFinite("scroll_speed_fraction"));
        }
        if !self.compaction_margin_fraction.is_finite() {
            return Err(ConfigError::NonFinite("compaction_margin_fraction"));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: GameConfig = serde_json::from_str(json)?;
        if config.palette.is_empty() {
            config.palette = palette::OBSTACLES.to_vec();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
