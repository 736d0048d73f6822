//! Game configuration
//!
//! Everything the simulation is built from. Values default to `consts`; only
//! the arena size varies, following the canvas.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Arena and tuning values for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,
    pub computer_paddle_speed: f32,
    pub ball_radius: f32,
    pub ball_base_speed: f32,
    pub ball_speed_increment: f32,
    pub win_score: u32,
    pub pickup_duration_ms: f64,
    pub pickup_spawn_interval_ms: f64,
    pub pickup_radius: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_speed: PADDLE_SPEED,
            computer_paddle_speed: COMPUTER_PADDLE_SPEED,
            ball_radius: BALL_RADIUS,
            ball_base_speed: BALL_BASE_SPEED,
            ball_speed_increment: BALL_SPEED_INCREMENT,
            win_score: WIN_SCORE,
            pickup_duration_ms: PICKUP_DURATION_MS,
            pickup_spawn_interval_ms: PICKUP_SPAWN_INTERVAL_MS,
            pickup_radius: PICKUP_RADIUS,
        }
    }
}

impl GameConfig {
    /// Size the arena from the browser viewport (80% x 70%, capped at 1000 x 600)
    pub fn for_viewport(viewport_width: f32, viewport_height: f32) -> Self {
        let (arena_width, arena_height) = arena_size_for_viewport(viewport_width, viewport_height);
        Self {
            arena_width,
            arena_height,
            ..Self::default()
        }
    }

    /// Left edge of the player paddle when at rest
    pub fn player_paddle_x(&self) -> f32 {
        self.paddle_width * 2.0
    }

    /// Left edge of the computer paddle when at rest
    pub fn computer_paddle_x(&self) -> f32 {
        self.arena_width - self.paddle_width * 3.0
    }
}

/// Arena dimensions for a viewport
pub fn arena_size_for_viewport(viewport_width: f32, viewport_height: f32) -> (f32, f32) {
    (
        (viewport_width * VIEWPORT_WIDTH_FRACTION).min(ARENA_WIDTH),
        (viewport_height * VIEWPORT_HEIGHT_FRACTION).min(ARENA_HEIGHT),
    )
}
