//! One play session: a player, an obstacle field and their timers
//!
//! A `Play` owns every periodic activity of its session through a private
//! [`Scheduler`]. Dropping or tearing down the play cancels all of them at
//! once, so two sessions can never tick against each other.

use std::time::Duration;

use super::collision::overlaps;
use super::obstacle::ObstacleField;
use super::player::{JumpStep, Player};
use super::timer::{Activity, Scheduler};
use crate::config::{FloorBehavior, GameConfig};
use crate::consts::{MAX_BACKLOG_MS, MAX_EVENTS_PER_ADVANCE};
use crate::SurfaceSize;

/// Internal invariant violations. Fatal to the session, never to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionFault {
    #[error("Jump tick fired with no trajectory in flight")]
    MissingTrajectory,
    #[error("Player position is no longer finite")]
    NonFinitePosition,
}

/// Something the surface needs to tell its host about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// A score gate was passed
    Scored { score: u32 },
    /// The session ended; every activity is already stopped
    GameOver { score: u32 },
    /// One master tick completed
    Redraw,
}

#[derive(Debug)]
pub struct Play {
    pub player: Player,
    pub obstacles: ObstacleField,
    scheduler: Scheduler,
    update_ms: u64,
    floor: FloorBehavior,
    /// Fed time not yet consumed by the scheduler, in microseconds
    backlog_us: u64,
}

impl Play {
    /// Build a session sized to `surface` and start its scroll, spawn and master timers
    pub fn new(surface: SurfaceSize, config: &GameConfig, seed: u64) -> Self {
        let mut player = Player::new(surface, config.player_sprite.clone(), config.player_tint);
        player.set_physics_constants(config.jump_v0, config.gravity);
        player.set_floor_behavior(config.floor);

        let mut obstacles = ObstacleField::new(surface, seed);
        obstacles.set_scroll_speed(config.scroll_speed_fraction);
        obstacles.set_compaction_margin(config.compaction_margin_fraction);
        obstacles.set_debug_gates(config.debug_gates);
        obstacles.initialize(config.gap);
        obstacles.set_color_palette(&config.palette);

        let update_ms = config.update_ms();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(Activity::Scroll, update_ms);
        scheduler.schedule(Activity::Spawn, config.spawn_interval_ms);
        scheduler.schedule(Activity::MasterTick, update_ms);

        Self {
            player,
            obstacles,
            scheduler,
            update_ms,
            floor: config.floor,
            backlog_us: 0,
        }
    }

    pub fn update_ms(&self) -> u64 {
        self.update_ms
    }

    /// Rescale the tick period of the jump, scroll and master timers
    pub fn set_update_ms(&mut self, update_ms: u64) {
        self.update_ms = update_ms.max(1);
        for activity in [Activity::Jump, Activity::Scroll, Activity::MasterTick] {
            self.scheduler.retime(activity, self.update_ms);
        }
    }

    /// Whether the master tick is still running
    pub fn is_running(&self) -> bool {
        self.scheduler.is_scheduled(Activity::MasterTick)
    }

    pub fn is_scheduled(&self, activity: Activity) -> bool {
        self.scheduler.is_scheduled(activity)
    }

    /// Session clock in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Start a new jump, superseding the one in flight
    pub fn jump(&mut self) {
        if !self.is_running() {
            return;
        }
        self.player.jump();
        self.scheduler.schedule(Activity::Jump, self.update_ms);
    }

    /// Stop every activity of this session. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.scheduler.cancel_all();
        self.player.teardown();
        self.obstacles.teardown();
    }

    /// Time fed in but not simulated yet
    pub fn backlog(&self) -> Duration {
        Duration::from_micros(self.backlog_us)
    }

    /// Run every activity that falls due within the next `elapsed`
    ///
    /// Elapsed time is accumulated at microsecond precision and the scheduler
    /// only ever sees whole milliseconds; the remainder carries over. When a
    /// call hits `MAX_EVENTS_PER_ADVANCE` the clock stops at the last fired
    /// timer and the rest of the time stays in the backlog for later calls.
    ///
    /// Events are appended to `events` in the order they happen. On a fault
    /// the session is torn down before the error is returned; events produced
    /// before the fault are kept.
    pub fn advance(&mut self, elapsed: Duration, events: &mut Vec<SimEvent>) -> Result<(), SessionFault> {
        let elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.backlog_us = self.backlog_us.saturating_add(elapsed_us);
        if self.backlog_us > MAX_BACKLOG_MS * 1000 {
            log::warn!(
                "Simulation is {} ms behind, dropping everything past {MAX_BACKLOG_MS} ms",
                self.backlog_us / 1000
            );
            self.backlog_us = MAX_BACKLOG_MS * 1000;
        }

        let start = self.scheduler.now_ms();
        let horizon = start + self.backlog_us / 1000;
        let mut processed = 0;

        while processed < MAX_EVENTS_PER_ADVANCE {
            let Some(activity) = self.scheduler.pop_due(horizon) else {
                break;
            };
            processed += 1;

            if let Err(fault) = self.run(activity, events) {
                self.teardown();
                return Err(fault);
            }
        }

        // Only move the clock past timers that have all fired
        if self.scheduler.next_due_ms().is_none_or(|due| due > horizon) {
            self.scheduler.advance_to(horizon);
        } else {
            log::debug!(
                "Event cap reached after {processed} events, {} ms carried over",
                horizon - self.scheduler.now_ms()
            );
        }
        self.backlog_us -= (self.scheduler.now_ms() - start) * 1000;
        Ok(())
    }

    fn run(&mut self, activity: Activity, events: &mut Vec<SimEvent>) -> Result<(), SessionFault> {
        match activity {
            Activity::Jump => {
                let step = self.player.tick()?;
                if step == JumpStep::Floor && self.floor == FloorBehavior::GameOver {
                    self.end(events);
                    events.push(SimEvent::Redraw);
                }
            }
            Activity::Scroll => {
                self.obstacles.scroll();
                self.obstacles.compact();
            }
            Activity::Spawn => self.obstacles.spawn(),
            Activity::MasterTick => {
                self.master_tick(events);
            }
        }
        Ok(())
    }

    /// One collision pass over the active segments in spawn order
    ///
    /// Overlapping a score gate awards a point and consumes the gate;
    /// overlapping anything else ends the session and stops the pass.
    /// Always finishes with a redraw request. Returns whether the session
    /// ended.
    pub fn master_tick(&mut self, events: &mut Vec<SimEvent>) -> bool {
        let player = self.player.bounds();
        let mut hit_obstacle = false;

        for index in 0..self.obstacles.segments().len() {
            let segment = &self.obstacles.segments()[index];
            if !segment.active || !overlaps(&player, &segment.bounds) {
                continue;
            }
            if segment.is_score_gate() {
                self.obstacles.deactivate(index);
                let score = self.player.add_point();
                events.push(SimEvent::Scored { score });
            } else {
                hit_obstacle = true;
                break;
            }
        }

        if hit_obstacle {
            self.end(events);
        }
        events.push(SimEvent::Redraw);
        hit_obstacle
    }

    fn end(&mut self, events: &mut Vec<SimEvent>) {
        self.teardown();
        events.push(SimEvent::GameOver {
            score: self.player.score(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::Bounds;
    use crate::sim::obstacle::SegmentKind;

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(1),
            ..Default::default()
        }
    }

    fn play() -> Play {
        Play::new(SurfaceSize::new(500, 1000), &config(), 1)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Feed `total_ms` in frame-sized steps, like a host would
    fn run_for(p: &mut Play, total_ms: u64, events: &mut Vec<SimEvent>) {
        let mut fed = 0;
        while fed < total_ms {
            let step = (total_ms - fed).min(16);
            p.advance(ms(step), events).unwrap();
            fed += step;
        }
    }

    /// Put the next spawned column right on top of the player
    fn spawn_on_player(play: &mut Play) {
        play.obstacles.spawn();
        let x = play.player.pos.x;
        let start = play.obstacles.segments().len() - 3;
        let player_y = play.player.pos.y;
        let size = play.player.size();
        // Park the gate around the player so only it overlaps
        let gap = play.obstacles.gap();
        let gate_y = player_y - (gap - size) / 2.0;
        let segs = play.obstacles.segments_mut();
        for s in &mut segs[start..] {
            s.bounds.x = x;
        }
        segs[start].bounds.height = gate_y;
        segs[start + 1].bounds.y = gate_y;
        segs[start + 2].bounds.y = gate_y + gap;
        segs[start + 2].bounds.height = 1000.0 - (gate_y + gap);
    }

    #[test]
    fn test_new_schedules_session_timers() {
        let p = play();
        assert!(p.is_scheduled(Activity::Scroll));
        assert!(p.is_scheduled(Activity::Spawn));
        assert!(p.is_scheduled(Activity::MasterTick));
        assert!(!p.is_scheduled(Activity::Jump));
        assert_eq!(p.update_ms(), 16);
    }

    #[test]
    fn test_spawn_timer_fires_every_interval() {
        let mut p = play();
        let mut events = Vec::new();
        run_for(&mut p, 1999, &mut events);
        assert_eq!(p.obstacles.columns_spawned(), 0);
        p.advance(ms(1), &mut events).unwrap();
        assert_eq!(p.obstacles.columns_spawned(), 1);
    }

    #[test]
    fn test_redraw_once_per_master_tick() {
        let mut p = play();
        let mut events = Vec::new();
        p.advance(ms(160), &mut events).unwrap();
        let redraws = events.iter().filter(|e| **e == SimEvent::Redraw).count();
        assert_eq!(redraws, 10);
    }

    #[test]
    fn test_gate_scores_once() {
        let mut p = play();
        spawn_on_player(&mut p);
        let mut events = Vec::new();

        assert!(!p.master_tick(&mut events));
        assert_eq!(p.player.score(), 1);
        assert_eq!(events, vec![SimEvent::Scored { score: 1 }, SimEvent::Redraw]);

        // The consumed gate still overlaps, but no longer counts
        events.clear();
        assert!(!p.master_tick(&mut events));
        assert_eq!(p.player.score(), 1);
        assert_eq!(events, vec![SimEvent::Redraw]);
    }

    #[test]
    fn test_distinct_gates_each_score() {
        let mut p = play();
        spawn_on_player(&mut p);
        spawn_on_player(&mut p);
        let mut events = Vec::new();
        p.master_tick(&mut events);
        assert_eq!(p.player.score(), 2);
    }

    #[test]
    fn test_pillar_hit_ends_session() {
        let mut p = play();
        p.obstacles.spawn();
        let player = p.player.bounds();
        let segs = p.obstacles.segments_mut();
        // Top pillar over the player, gate and bottom far away
        segs[0].bounds = Bounds::new(player.x, 0.0, 50.0, 1000.0);
        segs[1].bounds.x = 5000.0;
        segs[2].bounds.x = 5000.0;

        let mut events = Vec::new();
        assert!(p.master_tick(&mut events));
        assert_eq!(events, vec![SimEvent::GameOver { score: 0 }, SimEvent::Redraw]);
        assert!(!p.is_running());
        assert!(!p.obstacles.is_running());
    }

    #[test]
    fn test_earliest_spawned_segment_wins() {
        let mut p = play();
        p.obstacles.spawn();
        p.obstacles.spawn();
        let player = p.player.bounds();
        let segs = p.obstacles.segments_mut();
        for s in segs.iter_mut() {
            s.bounds.x = 5000.0;
        }
        // Earlier column's gate and later column's top pillar both overlap
        segs[1].bounds = player;
        assert_eq!(segs[3].kind, SegmentKind::Top);
        segs[3].bounds = player;

        let mut events = Vec::new();
        assert!(p.master_tick(&mut events));
        assert_eq!(
            events,
            vec![
                SimEvent::Scored { score: 1 },
                SimEvent::GameOver { score: 1 },
                SimEvent::Redraw
            ]
        );
    }

    #[test]
    fn test_jump_moves_player_on_timer() {
        let mut p = play();
        let start_y = p.player.pos.y;
        p.jump();
        assert!(p.is_scheduled(Activity::Jump));

        let mut events = Vec::new();
        p.advance(ms(16 * 5), &mut events).unwrap();
        assert!(p.player.pos.y < start_y);
    }

    #[test]
    fn test_floor_game_over() {
        let cfg = GameConfig {
            floor: FloorBehavior::GameOver,
            jump_v0: Some(0.0),
            gravity: Some(2000.0),
            ..config()
        };
        let mut p = Play::new(SurfaceSize::new(500, 1000), &cfg, 1);
        p.jump();
        let mut events = Vec::new();
        p.advance(ms(32), &mut events).unwrap();
        assert!(events.contains(&SimEvent::GameOver { score: 0 }));
        assert!(!p.is_running());
    }

    #[test]
    fn test_fault_tears_down() {
        let cfg = GameConfig {
            jump_v0: Some(f32::INFINITY),
            ..config()
        };
        let mut p = Play::new(SurfaceSize::new(500, 1000), &cfg, 1);
        p.jump();
        let mut events = Vec::new();
        assert_eq!(
            p.advance(ms(16), &mut events),
            Err(SessionFault::NonFinitePosition)
        );
        assert!(!p.is_running());
    }

    #[test]
    fn test_teardown_stops_all_mutation() {
        let mut p = play();
        p.jump();
        let mut events = Vec::new();
        run_for(&mut p, 2100, &mut events);
        p.teardown();
        p.teardown();

        let y = p.player.pos.y;
        let xs: Vec<f32> = p.obstacles.segments().iter().map(|s| s.bounds.x).collect();
        events.clear();
        p.advance(ms(5000), &mut events).unwrap();

        assert!(events.is_empty());
        assert_eq!(p.player.pos.y, y);
        let after: Vec<f32> = p.obstacles.segments().iter().map(|s| s.bounds.x).collect();
        assert_eq!(xs, after);
    }

    #[test]
    fn test_set_update_ms_rescales_timers() {
        let mut p = play();
        p.set_update_ms(33);
        let mut events = Vec::new();
        p.advance(ms(99), &mut events).unwrap();
        let redraws = events.iter().filter(|e| **e == SimEvent::Redraw).count();
        assert_eq!(redraws, 3);
    }

    #[test]
    fn test_sub_millisecond_frames_accumulate() {
        let mut p = play();
        let mut events = Vec::new();
        for _ in 0..64 {
            p.advance(Duration::from_micros(250), &mut events).unwrap();
        }
        assert_eq!(p.now_ms(), 16);
        assert_eq!(events, vec![SimEvent::Redraw]);
        assert_eq!(p.backlog(), Duration::ZERO);

        p.advance(Duration::from_micros(16_700), &mut events).unwrap();
        assert_eq!(p.now_ms(), 32);
        assert_eq!(p.backlog(), Duration::from_micros(700));
    }

    #[test]
    fn test_event_cap_defers_instead_of_dropping() {
        let cfg = GameConfig {
            fps: 200,
            ..config()
        };
        let mut p = Play::new(SurfaceSize::new(500, 1000), &cfg, 1);
        let mut events = Vec::new();
        let mut fed = 0;
        while fed < 1800 {
            p.advance(ms(10), &mut events).unwrap();
            fed += 10;
        }

        // One long frame: more due timers than a single call may run
        p.advance(ms(250), &mut events).unwrap();
        fed += 250;
        assert!(p.now_ms() < 2050);
        assert!(p.backlog() >= ms(50));

        while fed < 3740 {
            p.advance(ms(10), &mut events).unwrap();
            fed += 10;
        }
        assert_eq!(p.obstacles.columns_spawned(), 1);
        assert_eq!(p.now_ms(), 3740);
        assert_eq!(p.backlog(), Duration::ZERO);
    }
}
