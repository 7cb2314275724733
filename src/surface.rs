//! The game surface: session state machine and host integration
//!
//! ```text
//! NotStarted --tap--> Playing --tap--> Playing (jump)
//!                        |
//!                        +--pillar hit--> Ended --tap--> Playing (fresh session)
//! ```
//!
//! The host drives everything: it reports the surface size, forwards taps,
//! feeds elapsed time through [`GameSurface::advance`] and calls
//! [`GameSurface::draw`] when a redraw is requested.

use std::time::Duration;

use crate::config::{ConfigError, GameConfig};
use crate::consts::*;
use crate::events::{EventRegistry, GameEvent, ListenerId};
use crate::renderer::{Canvas, Color, SpriteKey};
use crate::sim::{Bounds, ObstacleField, Play, Player, SimEvent};
use crate::SurfaceSize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("Surface size is not known yet")]
    NotSized,
    #[error("No active session")]
    NoActiveSession,
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// What a tap did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// First session started
    Started,
    Jumped,
    /// A new session replaced an ended one
    Restarted,
}

/// Lifecycle of the current play session
#[derive(Debug, Default)]
pub enum Session {
    /// No session built yet (or the surface was detached)
    #[default]
    Uninitialized,
    Active(Box<Play>),
    /// Session over; the frozen play is kept so its last frame can be drawn
    Ended { play: Box<Play>, final_score: u32 },
}

impl Session {
    fn play(&self) -> Option<&Play> {
        match self {
            Session::Uninitialized => None,
            Session::Active(play) | Session::Ended { play, .. } => Some(play),
        }
    }
}

#[derive(Debug)]
pub struct GameSurface {
    config: GameConfig,
    size: Option<SurfaceSize>,
    session: Session,
    listeners: EventRegistry,
    sessions_started: u64,
    /// Seed used when the config does not pin one
    base_seed: u64,
}

impl Default for GameSurface {
    fn default() -> Self {
        Self::with_valid_config(GameConfig::default())
    }
}

impl GameSurface {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: GameConfig) -> Self {
        Self {
            config,
            size: None,
            session: Session::Uninitialized,
            listeners: EventRegistry::new(),
            sessions_started: 0,
            base_seed: rand::random(),
        }
    }

    // === Host lifecycle ===

    /// The host laid the surface out. New sessions are sized from this.
    pub fn on_size_available(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::InvalidSize { width, height });
        }
        let first = self.size.is_none();
        self.size = Some(SurfaceSize::new(width, height));
        log::info!("Surface sized to {width}x{height}");

        if first && matches!(self.session, Session::Uninitialized) {
            self.advise("Tap start !".to_string());
        }
        self.emit(GameEvent::RedrawRequested);
        Ok(())
    }

    /// Route a tap: start, jump or restart depending on the session state
    pub fn on_tap(&mut self) -> Result<TapOutcome, SurfaceError> {
        self.emit(GameEvent::Tapped);
        if let Session::Active(play) = &mut self.session {
            play.jump();
            return Ok(TapOutcome::Jumped);
        }
        let restart = self.is_ended();
        self.start()?;
        Ok(if restart {
            TapOutcome::Restarted
        } else {
            TapOutcome::Started
        })
    }

    /// The host is destroying the surface: stop everything
    pub fn on_detach(&mut self) {
        if let Session::Active(play) | Session::Ended { play, .. } = &mut self.session {
            play.teardown();
        }
        self.session = Session::Uninitialized;
        self.size = None;
        log::info!("Surface detached");
    }

    /// Build a fresh session, replacing any previous one
    pub fn start(&mut self) -> Result<(), SurfaceError> {
        let size = self.size.ok_or(SurfaceError::NotSized)?;

        // The old play and all of its timers go away before the new one exists
        if let Session::Active(play) | Session::Ended { play, .. } = &mut self.session {
            play.teardown();
        }
        self.session = Session::Uninitialized;

        let seed = self
            .config
            .seed
            .unwrap_or(self.base_seed)
            .wrapping_add(self.sessions_started);
        self.sessions_started += 1;

        let play = Play::new(size, &self.config, seed);
        self.session = Session::Active(Box::new(play));
        log::info!(
            "Session {} started ({}x{}, {} ms/tick, floor {}, seed {seed})",
            self.sessions_started,
            size.width,
            size.height,
            self.config.update_ms(),
            self.config.floor.as_str()
        );
        self.emit(GameEvent::Started);
        Ok(())
    }

    /// Make the player jump
    pub fn jump(&mut self) -> Result<(), SurfaceError> {
        match &mut self.session {
            Session::Active(play) => {
                play.jump();
                Ok(())
            }
            _ => Err(SurfaceError::NoActiveSession),
        }
    }

    /// Feed wall-clock time into the running session
    ///
    /// Frames longer than `MAX_FRAME_MS` count as `MAX_FRAME_MS`. Shorter
    /// frames are never rounded away: sub-millisecond leftovers carry into
    /// the next call.
    pub fn advance(&mut self, elapsed: Duration) {
        let Session::Active(play) = &mut self.session else {
            return;
        };
        let elapsed = elapsed.min(Duration::from_millis(MAX_FRAME_MS));

        let mut sim_events = Vec::new();
        let result = play.advance(elapsed, &mut sim_events);

        for event in sim_events {
            match event {
                SimEvent::Scored { score } => self.emit(GameEvent::Scored { score }),
                SimEvent::Redraw => self.emit(GameEvent::RedrawRequested),
                SimEvent::GameOver { score } => self.finish(score),
            }
        }

        if let Err(fault) = result {
            log::error!("Session fault: {fault}, ending session");
            let score = self.score().unwrap_or(0);
            self.finish(score);
            self.emit(GameEvent::RedrawRequested);
        }
    }

    /// Move the active session to `Ended` and tell the host
    fn finish(&mut self, score: u32) {
        if !self.is_playing() {
            return;
        }
        let Session::Active(mut play) = std::mem::take(&mut self.session) else {
            return;
        };
        play.teardown();
        self.session = Session::Ended {
            play,
            final_score: score,
        };
        log::info!("Session {} ended with score {score}", self.sessions_started);
        self.emit(GameEvent::Ended { score });
        self.advise(format!("Game over\nScore:{score}\nTap restart"));
    }

    // === Drawing ===

    /// Draw the whole surface
    ///
    /// Layering: background, obstacles, score, player, then the restart icon
    /// once the session is over. Before the first session only the start icon
    /// is shown.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clear(self.config.background);
        let Some(size) = self.size else {
            return;
        };

        match &self.session {
            Session::Uninitialized => self.draw_icon(canvas, size, &self.config.start_icon),
            Session::Active(play) => Self::draw_play(canvas, play),
            Session::Ended { play, .. } => {
                Self::draw_play(canvas, play);
                self.draw_icon(canvas, size, &self.config.restart_icon);
            }
        }
    }

    fn draw_play<C: Canvas + ?Sized>(canvas: &mut C, play: &Play) {
        play.obstacles.draw(canvas);
        play.player.draw_score(canvas);
        play.player.draw(canvas);
    }

    fn draw_icon<C: Canvas + ?Sized>(&self, canvas: &mut C, size: SurfaceSize, icon: &SpriteKey) {
        let edge = size.of_height(ICON_SIZE_FRACTION).floor();
        let dest = Bounds::centered_in(size.width, size.height, edge);
        canvas.draw_sprite(icon, dest, self.config.icon_tint);
    }

    // === Queries ===

    /// Current score; `None` before the first session
    pub fn score(&self) -> Option<u32> {
        self.session.play().map(|play| play.player.score())
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.session, Session::Ended { .. })
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.session, Session::Active(_))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }

    pub fn player(&self) -> Result<&Player, SurfaceError> {
        self.session
            .play()
            .map(|play| &play.player)
            .ok_or(SurfaceError::NoActiveSession)
    }

    pub fn obstacles(&self) -> Result<&ObstacleField, SurfaceError> {
        self.session
            .play()
            .map(|play| &play.obstacles)
            .ok_or(SurfaceError::NoActiveSession)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // === Events ===

    pub fn add_listener(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn emit(&mut self, event: GameEvent) {
        self.listeners.emit(event);
    }

    fn advise(&mut self, message: String) {
        if self.config.show_advisories {
            self.emit(GameEvent::Advisory(message));
        }
    }

    // === Configuration (applies from the next session unless noted) ===

    /// Change the simulation rate. Applies to the running session immediately.
    pub fn set_fps(&mut self, fps: u32) -> Result<(), ConfigError> {
        if fps == 0 {
            return Err(ConfigError::InvalidFps);
        }
        self.config.fps = fps;
        let update_ms = self.config.update_ms();
        if let Session::Active(play) = &mut self.session {
            play.set_update_ms(update_ms);
        }
        log::debug!("Frame rate set to {fps} ({update_ms} ms/tick)");
        Ok(())
    }

    /// Override jump velocity and/or gravity; `None` keeps the default
    pub fn set_physics(&mut self, v0: Option<f32>, gravity: Option<f32>) -> Result<(), ConfigError> {
        if v0.is_some_and(|v| !v.is_finite()) {
            return Err(ConfigError::NonFinite("jump_v0"));
        }
        if gravity.is_some_and(|g| !g.is_finite()) {
            return Err(ConfigError::NonFinite("gravity"));
        }
        self.config.jump_v0 = v0;
        self.config.gravity = gravity;
        Ok(())
    }

    pub fn set_gap(&mut self, gap: Option<f32>) -> Result<(), ConfigError> {
        if gap.is_some_and(|g| !g.is_finite()) {
            return Err(ConfigError::NonFinite("gap"));
        }
        self.config.gap = gap;
        Ok(())
    }

    /// Replace the obstacle palette. An empty list is ignored.
    pub fn set_color_palette(&mut self, colors: Vec<Color>) {
        self.config.set_palette(colors);
    }

    pub fn set_background(&mut self, color: Color) {
        self.config.background = color;
    }

    pub fn set_player_sprite(&mut self, sprite: SpriteKey) {
        self.config.player_sprite = sprite;
    }

    pub fn set_player_tint(&mut self, tint: Option<Color>) {
        self.config.player_tint = tint;
    }

    pub fn set_icons(&mut self, start: SpriteKey, restart: SpriteKey) {
        self.config.start_icon = start;
        self.config.restart_icon = restart;
    }

    pub fn set_icon_tint(&mut self, tint: Option<Color>) {
        self.config.icon_tint = tint;
    }

    pub fn set_show_advisories(&mut self, show: bool) {
        self.config.show_advisories = show;
    }
}
