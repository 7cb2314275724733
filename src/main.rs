//! Flapview headless runner
//!
//! Hosts a game surface without a window: a simple autopilot taps the
//! screen, time is fed in fixed frames and the last frame is printed as text.
//!
//! Usage: `flapview [config.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::error::Error;
    use std::rc::Rc;
    use std::time::Duration;

    use flapview::renderer::TextCanvas;
    use flapview::sim::SegmentKind;
    use flapview::{GameConfig, GameEvent, GameSurface};

    const WIDTH: u32 = 480;
    const HEIGHT: u32 = 800;
    const FRAME: Duration = Duration::from_millis(16);
    /// Give up after a minute of game time
    const MAX_FRAMES: u32 = 60 * 1000 / 16;
    /// Ticks to let a jump play out before tapping again
    const TAP_COOLDOWN: u32 = 10;

    pub fn run() -> Result<(), Box<dyn Error>> {
        let config = match std::env::args().nth(1) {
            Some(path) => {
                log::info!("Loading config from {path}");
                GameConfig::from_json(&std::fs::read_to_string(path)?)?
            }
            None => GameConfig {
                seed: Some(0x5EED),
                ..Default::default()
            },
        };

        let mut surface = GameSurface::new(config)?;
        let ended = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&ended);
        surface.add_listener(move |event| match event {
            GameEvent::Scored { score } => log::info!("Scored: {score}"),
            GameEvent::Ended { score } => *sink.borrow_mut() = Some(*score),
            GameEvent::Advisory(text) => log::info!("{}", text.replace('\n', " | ")),
            GameEvent::RedrawRequested => {}
            other => log::debug!("{other:?}"),
        });

        surface.on_size_available(WIDTH, HEIGHT)?;
        surface.on_tap()?;

        let mut frames = 0;
        while frames < MAX_FRAMES && ended.borrow().is_none() {
            if should_tap(&surface) {
                surface.on_tap()?;
            }
            surface.advance(FRAME);
            frames += 1;
        }

        let mut canvas = TextCanvas::new(flapview::SurfaceSize::new(WIDTH, HEIGHT), 48, 32);
        canvas.set_glyph(surface.config().start_icon.clone(), '>');
        canvas.set_glyph(surface.config().restart_icon.clone(), '*');
        surface.draw(&mut canvas);
        println!("{}", canvas.frame());

        let score = surface.score().unwrap_or(0);
        match *ended.borrow() {
            Some(_) => println!("Game over after {frames} frames, score {score}"),
            None => println!("Still flying after {frames} frames, score {score}"),
        }
        Ok(())
    }

    /// Tap when the player has sunk below the middle of the next gate
    fn should_tap(surface: &GameSurface) -> bool {
        let (Ok(player), Ok(obstacles)) = (surface.player(), surface.obstacles()) else {
            return false;
        };
        if player.jump_clock().is_some_and(|t| t < TAP_COOLDOWN) {
            return false;
        }

        let body = player.bounds();
        let target_y = obstacles
            .active_segments()
            .find(|s| s.kind == SegmentKind::Gate && s.bounds.right() > body.x)
            .map(|gate| gate.bounds.y + gate.bounds.height / 2.0)
            .unwrap_or(HEIGHT as f32 / 2.0);

        body.y + body.height / 2.0 > target_y
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Flapview (headless) starting...");

    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Embedders drive `GameSurface` directly on this target
}
