//! Fixed-tick simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Fixed tick period only
//! - Seeded RNG only
//! - Stable iteration order (spawn order for obstacles)
//! - No platform dependencies; drawing goes through `renderer::Canvas`

pub mod collision;
pub mod obstacle;
pub mod play;
pub mod player;
pub mod timer;

pub use collision::{Bounds, overlaps};
pub use obstacle::{ObstacleField, Segment, SegmentKind};
pub use play::{Play, SessionFault, SimEvent};
pub use player::{JumpStep, Player};
pub use timer::{Activity, Scheduler};
