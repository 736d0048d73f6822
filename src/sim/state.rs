//! Match state and the entities it owns
//!
//! Everything the physics tick and the pickup manager mutate lives in
//! `GameState`. The current phase is not in here: only the state machine
//! (`machine::Game`) owns and writes it.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Circle, Rect};
use super::timer::TimerHandle;
use crate::config::GameConfig;
use crate::consts::*;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Nothing moves until the first start
    Idle,
    /// Simulation frozen while the countdown runs
    CountingDown,
    /// Active gameplay
    Running,
    /// Player paused; pickup timers suspended
    Paused,
    /// A side reached the win score; only restart leaves this
    GameOver,
}

/// Which paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Computer,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::Player => "Player",
            Side::Computer => "Computer",
        }
    }

    pub fn opponent(&self) -> Side {
        match self {
            Side::Player => Side::Computer,
            Side::Computer => Side::Player,
        }
    }
}

/// Cosmetic jitter after a hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shake {
    pub intensity: f32,
    pub ticks_left: u32,
    /// Where the paddle snaps back to when the shake ends
    pub anchor_x: f32,
}

/// A paddle. `x` is the left edge, `y` the top edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Height to revert to when an enlarge effect ends
    pub base_height: f32,
    /// Vertical movement intent from the last update (-1, 0, 1 times speed)
    pub dy: f32,
    pub shake: Option<Shake>,
    /// Palette index of the hit flash, if one is showing
    pub flash: Option<usize>,
}

impl Paddle {
    /// A paddle at `x`, vertically centered in the arena
    pub fn new(side: Side, x: f32, width: f32, height: f32, arena_height: f32) -> Self {
        Self {
            side,
            x,
            y: arena_height / 2.0 - height / 2.0,
            width,
            height,
            base_height: height,
            dy: 0.0,
            shake: None,
            flash: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Keep the paddle fully inside the arena
    pub fn clamp_y(&mut self, arena_height: f32) {
        self.y = self.y.clamp(0.0, (arena_height - self.height).max(0.0));
    }

    /// Move by `delta` and clamp
    pub fn move_by(&mut self, delta: f32, arena_height: f32) {
        self.dy = delta;
        self.y += delta;
        self.clamp_y(arena_height);
    }

    /// Place the paddle so its center sits at `target_y`, clamped
    pub fn center_on(&mut self, target_y: f32, arena_height: f32) {
        let old_y = self.y;
        self.y = target_y - self.height / 2.0;
        self.clamp_y(arena_height);
        self.dy = self.y - old_y;
    }

    pub fn is_enlarged(&self) -> bool {
        self.height > self.base_height
    }

    /// Grow to the enlarged height and re-clamp
    pub fn enlarge(&mut self, arena_height: f32) {
        self.height = self.base_height * ENLARGE_FACTOR;
        self.clamp_y(arena_height);
    }

    /// Back to the base height and re-clamp
    pub fn restore_height(&mut self, arena_height: f32) {
        self.height = self.base_height;
        self.clamp_y(arena_height);
    }

    /// Start an impact shake anchored at the current x
    pub fn start_shake(&mut self, intensity: f32) {
        let anchor_x = match self.shake {
            Some(shake) => shake.anchor_x,
            None => self.x,
        };
        self.shake = Some(Shake {
            intensity: intensity.min(SHAKE_MAX_INTENSITY),
            ticks_left: SHAKE_TICKS,
            anchor_x,
        });
    }

    /// Apply one tick of shake. Returns false when no shake was running.
    pub fn update_shake<R: Rng>(&mut self, rng: &mut R) -> bool {
        let Some(mut shake) = self.shake else {
            return false;
        };
        let offset = (rng.random::<f32>() - 0.5) * shake.intensity;
        self.x = shake.anchor_x + offset;
        shake.ticks_left = shake.ticks_left.saturating_sub(1);
        if shake.ticks_left == 0 {
            self.x = shake.anchor_x;
            self.shake = None;
        } else {
            self.shake = Some(shake);
        }
        true
    }

    /// Stop any shake and snap back to the anchor
    pub fn cancel_shake(&mut self) {
        if let Some(shake) = self.shake.take() {
            self.x = shake.anchor_x;
        }
    }
}

/// Trail sample for ball rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub speed: f32,
}

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Base speed; grows per paddle hit, reset on serve
    pub speed: f32,
    /// Base radius; see `GameState::effective_ball_radius`
    pub radius: f32,
    /// Past positions, oldest first
    pub trail: VecDeque<TrailPoint>,
}

impl Ball {
    pub fn new(center: Vec2, radius: f32, speed: f32) -> Self {
        Self {
            pos: center,
            vel: Vec2::new(SERVE_DX, SERVE_DY),
            speed,
            radius,
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    /// Record current position to trail, evicting the oldest sample
    pub fn record_trail(&mut self) {
        let speed = self.vel.length();
        self.trail.push_back(TrailPoint {
            pos: self.pos,
            speed,
        });
        while self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    /// Put the ball back in the middle at base speed.
    ///
    /// `toward` picks the horizontal direction; `None` chooses at random.
    /// The vertical direction is always random.
    pub fn serve<R: Rng>(&mut self, center: Vec2, base_speed: f32, toward: Option<Side>, rng: &mut R) {
        self.pos = center;
        self.speed = base_speed;
        let toward = toward.unwrap_or(if rng.random_bool(0.5) {
            Side::Computer
        } else {
            Side::Player
        });
        let dx = match toward {
            Side::Computer => SERVE_DX,
            Side::Player => -SERVE_DX,
        };
        let dy = if rng.random_bool(0.5) { SERVE_DY } else { -SERVE_DY };
        self.vel = Vec2::new(dx, dy);
    }
}

/// Pickup identifier (unique per game session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickupId(pub u32);

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    SpeedBoost,
    BallEnlarge,
    TrajectoryRandomize,
    Drunken,
    PaddleEnlarge,
}

impl PickupKind {
    pub const ALL: [PickupKind; 5] = [
        PickupKind::SpeedBoost,
        PickupKind::BallEnlarge,
        PickupKind::TrajectoryRandomize,
        PickupKind::Drunken,
        PickupKind::PaddleEnlarge,
    ];

    /// Short label drawn on the pickup
    pub fn label(&self) -> &'static str {
        match self {
            PickupKind::SpeedBoost => "SPD",
            PickupKind::BallEnlarge => "BIG",
            PickupKind::TrajectoryRandomize => "TRJ",
            PickupKind::Drunken => "DRK",
            PickupKind::PaddleEnlarge => "PAD+",
        }
    }

    /// Message shown when collected
    pub fn message(&self) -> &'static str {
        match self {
            PickupKind::SpeedBoost => "Ball Speed Boost!",
            PickupKind::BallEnlarge => "MEGA BALL!",
            PickupKind::TrajectoryRandomize => "Trajectory Shift!",
            PickupKind::Drunken => "Drunken Ball! Woozy!",
            PickupKind::PaddleEnlarge => "Super Paddle!",
        }
    }
}

/// Expiry clock of an active pickup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Expiry {
    /// Timer armed
    Scheduled { timer: TimerHandle, deadline: f64 },
    /// Timer canceled by a pause; resumes with this many ms left
    Suspended { remaining: f64 },
}

/// Lifecycle of a pickup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PickupState {
    /// On the field, waiting for the ball
    Spawned,
    /// Collected, effect live until expiry
    Active(Expiry),
    /// Expired or merged into an existing pickup of its kind
    Consumed,
}

/// A pickup entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: PickupId,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f32,
    pub state: PickupState,
}

impl Pickup {
    pub fn is_spawned(&self) -> bool {
        matches!(self.state, PickupState::Spawned)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PickupState::Active(_))
    }

    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }
}

/// Score and match result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub player: u32,
    pub computer: u32,
    pub winner: Option<Side>,
    pub game_over: bool,
}

impl Score {
    /// Award a point. Ignored once the match is over; returns whether it counted.
    pub fn award(&mut self, side: Side, win_score: u32) -> bool {
        if self.game_over {
            return false;
        }
        let total = match side {
            Side::Player => {
                self.player += 1;
                self.player
            }
            Side::Computer => {
                self.computer += 1;
                self.computer
            }
        };
        if total >= win_score {
            self.game_over = true;
            self.winner = Some(side);
        }
        true
    }

    pub fn total(&self) -> u32 {
        self.player + self.computer
    }
}

/// Complete match state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    pub player: Paddle,
    pub computer: Paddle,
    pub ball: Ball,
    /// Spawned and active pickups (sorted by id)
    pub pickups: Vec<Pickup>,
    pub score: Score,
    /// Physics ticks run so far
    pub time_ticks: u64,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        let player = Paddle::new(
            Side::Player,
            config.player_paddle_x(),
            config.paddle_width,
            config.paddle_height,
            config.arena_height,
        );
        let computer = Paddle::new(
            Side::Computer,
            config.computer_paddle_x(),
            config.paddle_width,
            config.paddle_height,
            config.arena_height,
        );
        let center = Vec2::new(config.arena_width / 2.0, config.arena_height / 2.0);
        let ball = Ball::new(center, config.ball_radius, config.ball_base_speed);
        Self {
            config,
            player,
            computer,
            ball,
            pickups: Vec::new(),
            score: Score::default(),
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new pickup ID
    pub fn next_pickup_id(&mut self) -> PickupId {
        let id = self.next_id;
        self.next_id += 1;
        PickupId(id)
    }

    pub fn arena_center(&self) -> Vec2 {
        Vec2::new(self.config.arena_width / 2.0, self.config.arena_height / 2.0)
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Player => &self.player,
            Side::Computer => &self.computer,
        }
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Player => &mut self.player,
            Side::Computer => &mut self.computer,
        }
    }

    /// Whether an effect of this kind is live
    pub fn is_active(&self, kind: PickupKind) -> bool {
        self.pickups.iter().any(|p| p.kind == kind && p.is_active())
    }

    pub fn active_pickups(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups.iter().filter(|p| p.is_active())
    }

    pub fn spawned_pickups(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups.iter().filter(|p| p.is_spawned())
    }

    /// Ball radius with the enlarge effect applied
    pub fn effective_ball_radius(&self) -> f32 {
        effective_radius(self.ball.radius, self.is_active(PickupKind::BallEnlarge))
    }

    /// Ball speed a paddle hit launches with
    pub fn effective_ball_speed(&self) -> f32 {
        effective_speed(self.ball.speed, self.is_active(PickupKind::SpeedBoost))
    }

    pub fn ball_circle(&self) -> Circle {
        Circle::new(self.ball.pos, self.effective_ball_radius())
    }

    /// Paddles back to their anchors and centers, base height, no shake or flash
    pub fn reset_paddles(&mut self) {
        let arena_height = self.config.arena_height;
        let anchors = [
            (Side::Player, self.config.player_paddle_x()),
            (Side::Computer, self.config.computer_paddle_x()),
        ];
        for (side, x) in anchors {
            let paddle = self.paddle_mut(side);
            paddle.shake = None;
            paddle.flash = None;
            paddle.x = x;
            paddle.height = paddle.base_height;
            paddle.dy = 0.0;
            paddle.y = arena_height / 2.0 - paddle.height / 2.0;
        }
    }

    /// Re-anchor paddles after the arena changed size
    pub fn reanchor_paddles(&mut self) {
        let arena_height = self.config.arena_height;
        let anchors = [
            (Side::Player, self.config.player_paddle_x()),
            (Side::Computer, self.config.computer_paddle_x()),
        ];
        for (side, x) in anchors {
            let paddle = self.paddle_mut(side);
            paddle.shake = None;
            paddle.x = x;
            paddle.y = arena_height / 2.0 - paddle.height / 2.0;
            paddle.clamp_y(arena_height);
        }
    }
}

/// Radius derived from the base radius and whether enlarge is active
pub fn effective_radius(base: f32, enlarged: bool) -> f32 {
    if enlarged { base * ENLARGE_FACTOR } else { base }
}

/// Speed derived from the base speed and whether boost is active
pub fn effective_speed(base: f32, boosted: bool) -> f32 {
    if boosted { base * SPEED_BOOST_FACTOR } else { base }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_new_state_centered() {
        let state = GameState::new(GameConfig::default());
        assert_eq!(state.player.x, 50.0);
        assert_eq!(state.computer.x, 925.0);
        assert_eq!(state.player.y, 225.0);
        assert_eq!(state.ball.pos, Vec2::new(500.0, 300.0));
        assert_eq!(state.ball.vel, Vec2::new(5.0, 5.0));
        assert_eq!(state.ball.speed, 7.0);
    }

    #[test]
    fn test_trail_evicts_oldest() {
        let mut ball = Ball::new(Vec2::ZERO, 15.0, 7.0);
        for i in 0..(TRAIL_LENGTH + 5) {
            ball.pos = Vec2::new(i as f32, 0.0);
            ball.record_trail();
        }
        assert_eq!(ball.trail.len(), TRAIL_LENGTH);
        assert_eq!(ball.trail.front().map(|p| p.pos.x), Some(5.0));
        assert_eq!(
            ball.trail.back().map(|p| p.pos.x),
            Some((TRAIL_LENGTH + 4) as f32)
        );
    }

    #[test]
    fn test_shake_snaps_back_to_anchor() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut paddle = Paddle::new(Side::Player, 50.0, 25.0, 150.0, 600.0);
        paddle.start_shake(100.0);
        assert_eq!(paddle.shake.map(|s| s.intensity), Some(SHAKE_MAX_INTENSITY));

        for _ in 0..SHAKE_TICKS - 1 {
            assert!(paddle.update_shake(&mut rng));
            assert!((paddle.x - 50.0).abs() <= SHAKE_MAX_INTENSITY / 2.0);
        }
        assert!(paddle.update_shake(&mut rng));
        assert_eq!(paddle.x, 50.0);
        assert!(paddle.shake.is_none());
        assert!(!paddle.update_shake(&mut rng));
    }

    #[test]
    fn test_enlarge_reclamps_at_bottom() {
        let mut paddle = Paddle::new(Side::Player, 50.0, 25.0, 150.0, 600.0);
        paddle.y = 450.0;
        paddle.enlarge(600.0);
        assert_eq!(paddle.height, 225.0);
        assert_eq!(paddle.y, 375.0);
        paddle.restore_height(600.0);
        assert_eq!(paddle.height, 150.0);
        assert_eq!(paddle.y, 375.0);
    }

    #[test]
    fn test_score_locks_after_win() {
        let mut score = Score::default();
        for _ in 0..5 {
            assert!(score.award(Side::Computer, 5));
        }
        assert!(score.game_over);
        assert_eq!(score.winner, Some(Side::Computer));
        assert!(!score.award(Side::Player, 5));
        assert_eq!(score.total(), 5);
    }

    #[test]
    fn test_serve_direction() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ball = Ball::new(Vec2::ZERO, 15.0, 9.1);
        ball.serve(Vec2::new(500.0, 300.0), 7.0, Some(Side::Player), &mut rng);
        assert_eq!(ball.vel.x, -SERVE_DX);
        assert_eq!(ball.vel.y.abs(), SERVE_DY);
        assert_eq!(ball.speed, 7.0);
        ball.serve(Vec2::new(500.0, 300.0), 7.0, Some(Side::Computer), &mut rng);
        assert_eq!(ball.vel.x, SERVE_DX);
    }

    #[test]
    fn test_effective_values() {
        assert_eq!(effective_radius(15.0, false), 15.0);
        assert_eq!(effective_radius(15.0, true), 22.5);
        assert_eq!(effective_speed(8.0, true), 12.0);
    }
}
