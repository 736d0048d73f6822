//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per animation frame, fixed per-tick velocities
//! - Seeded RNG only
//! - Timers run on the frame clock passed in by the caller
//! - Stable iteration order (pickups by id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod machine;
pub mod pickups;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{Circle, Rect, circle_intersects_rect, circles_overlap, distance};
pub use machine::{Action, Game};
pub use pickups::{PickupEvent, PickupManager};
pub use state::{
    Ball, GamePhase, GameState, Paddle, Pickup, PickupId, PickupKind, PickupState, Score, Side,
    effective_radius, effective_speed,
};
pub use tick::{PADDLE_FLASH_PALETTE_LEN, TickEvent, TickInput, tick};
pub use timer::{TimerEvent, TimerHandle, TimerQueue};
