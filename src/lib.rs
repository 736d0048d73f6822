//! Pickup Pong - a canvas Pong game against an AI paddle, with timed power-ups
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, pickups, timers, phase machine)
//! - `input`: Keyboard/pointer/touch input model
//! - `presenter`: Contract between the simulation and whatever draws it
//! - `renderer`: Canvas 2D presenter (canvas and DOM parts wasm only)
//! - `config`: Arena and tuning values the game is built from

pub mod config;
pub mod input;
pub mod presenter;
pub mod renderer;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use config::GameConfig;
pub use input::{ControlMode, InputCommand, InputState};
pub use presenter::Presenter;
pub use sim::Game;

/// Game configuration constants
pub mod consts {
    /// Default arena dimensions (also the upper bound when sizing from the viewport)
    pub const ARENA_WIDTH: f32 = 1000.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    /// Fraction of the viewport the arena may take
    pub const VIEWPORT_WIDTH_FRACTION: f32 = 0.8;
    pub const VIEWPORT_HEIGHT_FRACTION: f32 = 0.7;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 25.0;
    pub const PADDLE_HEIGHT: f32 = 150.0;
    pub const PADDLE_CORNER_RADIUS: f32 = 10.0;
    /// Player paddle speed (units per tick)
    pub const PADDLE_SPEED: f32 = 10.0;
    /// AI paddle speed (units per tick)
    pub const COMPUTER_PADDLE_SPEED: f32 = 7.0;
    /// AI only moves when its center is further than this from the ball
    pub const COMPUTER_DEAD_ZONE: f32 = 35.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 15.0;
    pub const BALL_BASE_SPEED: f32 = 7.0;
    /// Permanent speed gain per non-boosted paddle hit
    pub const BALL_SPEED_INCREMENT: f32 = 0.3;
    /// Velocity components of a fresh serve
    pub const SERVE_DX: f32 = 5.0;
    pub const SERVE_DY: f32 = 5.0;
    /// Max deflection off a paddle edge (radians)
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;
    /// Random texture added to every deflection (radians, +/-)
    pub const BOUNCE_ANGLE_JITTER: f32 = 0.05;

    /// Impact shake
    pub const SHAKE_MAX_INTENSITY: f32 = 12.0;
    pub const SHAKE_SPEED_DIVISOR: f32 = 1.5;
    pub const SHAKE_TICKS: u32 = 15;
    /// Paddle color flash after a hit (ms)
    pub const FLASH_DURATION_MS: f64 = 100.0;

    /// Match
    pub const WIN_SCORE: u32 = 5;
    /// Freeze before each serve (seconds)
    pub const COUNTDOWN_SECONDS: u32 = 1;
    pub const COUNTDOWN_STEP_MS: f64 = 1000.0;
    /// How long "GO!" stays up once the countdown finishes (ms)
    pub const GO_BANNER_MS: f64 = 400.0;

    /// Pickups
    pub const PICKUP_DURATION_MS: f64 = 5000.0;
    pub const PICKUP_SPAWN_INTERVAL_MS: f64 = 20000.0;
    pub const PICKUP_RADIUS: f32 = 30.0;
    /// Extra clearance a fresh pickup needs from the ball
    pub const PICKUP_SPAWN_MARGIN: f32 = 50.0;
    pub const PICKUP_MESSAGE_MS: f64 = 2500.0;
    pub const SPEED_BOOST_FACTOR: f32 = 1.5;
    pub const ENLARGE_FACTOR: f32 = 1.5;
    /// Drunken ball positional jitter per axis (+/-)
    pub const DRUNKEN_JITTER: f32 = 2.0;
    /// Trajectory shift offset per velocity component (+/-)
    pub const TRAJECTORY_OFFSET: f32 = 5.0;
    pub const TRAJECTORY_MIN_COMPONENT: f32 = 2.0;

    /// Ball trail
    pub const TRAIL_LENGTH: usize = 30;
    pub const TRAIL_MIN_SPEED: f32 = 7.0;
    pub const TRAIL_MAX_SPEED: f32 = 25.0;

    /// Touch-ends closer than this toggle pause (ms)
    pub const DOUBLE_TAP_MS: f64 = 300.0;
}
