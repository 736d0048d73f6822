//! Presentation contract
//!
//! The simulation never touches the DOM or a canvas. It calls into a
//! `Presenter` once per frame to draw, and on state changes to update score,
//! messages, countdown and buttons.

use crate::sim::{GamePhase, GameState, Side};

/// What the countdown overlay shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Value(u32),
    Go,
    Hidden,
}

impl Countdown {
    pub fn text(&self) -> Option<String> {
        match self {
            Countdown::Value(n) => Some(n.to_string()),
            Countdown::Go => Some("GO!".to_string()),
            Countdown::Hidden => None,
        }
    }
}

/// Visibility and enablement of one control button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Hidden,
    Enabled,
    Disabled,
}

/// Start / pause / restart buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlButtons {
    pub start: ButtonState,
    pub pause: ButtonState,
    /// Pause button reads "Resume" instead of "Pause"
    pub pause_shows_resume: bool,
    pub restart: ButtonState,
}

/// Live ball readout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallStats {
    pub speed: f32,
    pub boosted: bool,
    pub radius: f32,
}

impl BallStats {
    pub fn text(&self) -> String {
        let boosted = if self.boosted { " (BOOSTED)" } else { "" };
        format!(
            "Ball Speed: {:.1}{}\nBall Size: {:.1}",
            self.speed, boosted, self.radius
        )
    }
}

/// Sounds the game asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    PaddleHit,
    WallHit,
    Score,
    PickupCollect,
    GameOver,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub state: &'a GameState,
    pub phase: GamePhase,
    pub countdown: Countdown,
    /// Ball radius with effects applied
    pub ball_radius: f32,
}

impl Snapshot<'_> {
    pub fn winner(&self) -> Option<Side> {
        self.state.score.winner
    }

    pub fn show_paused_overlay(&self) -> bool {
        self.phase == GamePhase::Paused
    }
}

/// Implemented by the browser front end (and by test recorders)
pub trait Presenter {
    /// Draw the arena; called every frame regardless of phase
    fn draw(&mut self, snapshot: &Snapshot<'_>);

    fn update_score_display(&mut self, player: u32, computer: u32);

    /// Flash the score area after a point
    fn trigger_score_effect(&mut self) {}

    /// Show a pickup message; the core hides it again when its timer fires
    fn show_transient_message(&mut self, text: &str, duration_ms: f64);

    fn hide_transient_message(&mut self);

    fn show_countdown(&mut self, countdown: Countdown);

    fn set_control_buttons_state(&mut self, buttons: ControlButtons);

    /// Refreshed every running frame
    fn update_ball_stats(&mut self, _stats: BallStats) {}

    fn play_sound(&mut self, _cue: SoundCue) {}
}
