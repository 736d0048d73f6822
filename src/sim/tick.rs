//! Per-frame physics tick
//!
//! Runs only while the match is in `GamePhase::Running`. Step order is fixed:
//! player paddle, computer paddle, ball motion, walls, paddles, scoring, trail.
//! Pickup collection runs afterwards (see `pickups::collect`).

use glam::Vec2;
use rand::Rng;

use super::collision::circle_intersects_rect;
use super::state::{GameState, PickupKind, Side};
use crate::consts::*;

/// Input sampled for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Held movement keys: -1 up, 1 down, 0 none
    pub movement: i8,
    /// Pointer/touch y when one of those control modes is active
    pub pointer_y: Option<f32>,
}

/// Things that happened during a tick, for the state machine and presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    WallHit,
    PaddleHit(Side),
    /// `scorer` got a point; `match_over` if that point won the match
    Scored { scorer: Side, match_over: bool },
}

/// Advance the match by one tick
pub fn tick<R: Rng>(state: &mut GameState, input: &TickInput, rng: &mut R, events: &mut Vec<TickEvent>) {
    state.time_ticks += 1;

    move_player(state, input, rng);
    move_computer(state, rng);
    move_ball(state, rng);
    bounce_off_walls(state, events);

    // Player first: if the ball somehow overlaps both, the player's hit wins
    let ball = state.ball_circle();
    if circle_intersects_rect(ball, state.player.rect()) {
        bounce_off_paddle(state, Side::Player, rng);
        events.push(TickEvent::PaddleHit(Side::Player));
    } else if circle_intersects_rect(ball, state.computer.rect()) {
        bounce_off_paddle(state, Side::Computer, rng);
        events.push(TickEvent::PaddleHit(Side::Computer));
    }

    check_score(state, events);

    state.ball.record_trail();
}

/// Step 1: pointer/touch follow or keyboard movement, then shake
fn move_player<R: Rng>(state: &mut GameState, input: &TickInput, rng: &mut R) {
    let arena_height = state.config.arena_height;
    let speed = state.config.paddle_speed;
    let anchor = state.config.player_paddle_x();
    let paddle = &mut state.player;

    match input.pointer_y {
        Some(y) => paddle.center_on(y, arena_height),
        None => paddle.move_by(f32::from(input.movement.signum()) * speed, arena_height),
    }

    if !paddle.update_shake(rng) {
        paddle.x = anchor;
    }
}

/// Step 2: the AI chases the ball's y outside a dead zone
fn move_computer<R: Rng>(state: &mut GameState, rng: &mut R) {
    let arena_height = state.config.arena_height;
    let speed = state.config.computer_paddle_speed;
    let anchor = state.config.computer_paddle_x();
    let ball_y = state.ball.pos.y;
    let paddle = &mut state.computer;

    if paddle.update_shake(rng) {
        return;
    }
    paddle.x = anchor;

    let center = paddle.center_y();
    let delta = if center < ball_y - COMPUTER_DEAD_ZONE {
        speed
    } else if center > ball_y + COMPUTER_DEAD_ZONE {
        -speed
    } else {
        0.0
    };
    paddle.move_by(delta, arena_height);
}

/// Step 3: integrate velocity; the drunken effect adds fresh jitter every tick
fn move_ball<R: Rng>(state: &mut GameState, rng: &mut R) {
    let drunk = state.is_active(PickupKind::Drunken);
    let ball = &mut state.ball;
    ball.pos += ball.vel;
    if drunk {
        ball.pos += Vec2::new(
            rng.random_range(-DRUNKEN_JITTER..=DRUNKEN_JITTER),
            rng.random_range(-DRUNKEN_JITTER..=DRUNKEN_JITTER),
        );
    }
}

/// Step 4: elastic bounce off top and bottom using the effective radius
fn bounce_off_walls(state: &mut GameState, events: &mut Vec<TickEvent>) {
    let radius = state.effective_ball_radius();
    let arena_height = state.config.arena_height;
    let ball = &mut state.ball;

    if ball.pos.y + radius > arena_height {
        ball.pos.y = arena_height - radius;
        ball.vel.y = -ball.vel.y;
        events.push(TickEvent::WallHit);
    } else if ball.pos.y - radius < 0.0 {
        ball.pos.y = radius;
        ball.vel.y = -ball.vel.y;
        events.push(TickEvent::WallHit);
    }
}

/// Step 5: deflect off a paddle.
///
/// The hit offset from the paddle center maps linearly to +/-60 degrees. A
/// speed boost launches at 1.5x without the permanent per-hit increment.
pub fn bounce_off_paddle<R: Rng>(state: &mut GameState, side: Side, rng: &mut R) {
    let boosted = state.is_active(PickupKind::SpeedBoost);
    let launch_speed = state.effective_ball_speed();
    let increment = state.config.ball_speed_increment;
    let half_arena = state.config.arena_width / 2.0;

    let paddle = state.paddle(side);
    let offset = ((state.ball.pos.y - paddle.center_y()) / (paddle.height / 2.0)).clamp(-1.0, 1.0);
    let angle = offset * MAX_BOUNCE_ANGLE + rng.random_range(-BOUNCE_ANGLE_JITTER..=BOUNCE_ANGLE_JITTER);
    let direction = if state.ball.pos.x < half_arena { 1.0 } else { -1.0 };

    let ball = &mut state.ball;
    ball.vel = Vec2::new(
        direction * launch_speed * angle.cos(),
        launch_speed * angle.sin(),
    );
    if !boosted {
        ball.speed += increment;
    }

    let flash = rng.random_range(0..PADDLE_FLASH_PALETTE_LEN);
    let paddle = state.paddle_mut(side);
    paddle.start_shake(launch_speed / SHAKE_SPEED_DIVISOR);
    paddle.flash = Some(flash);
}

/// Number of colors a paddle may flash to
pub const PADDLE_FLASH_PALETTE_LEN: usize = 4;

/// Step 6: ball past the left or right edge (base radius, enlargement ignored)
fn check_score(state: &mut GameState, events: &mut Vec<TickEvent>) {
    if state.score.game_over {
        return;
    }
    let radius = state.ball.radius;
    let x = state.ball.pos.x;

    let scorer = if x - radius < 0.0 {
        Side::Computer
    } else if x + radius > state.config.arena_width {
        Side::Player
    } else {
        return;
    };

    let win_score = state.config.win_score;
    if state.score.award(scorer, win_score) {
        events.push(TickEvent::Scored {
            scorer,
            match_over: state.score.game_over,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::state::{Expiry, Pickup, PickupId, PickupState};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn new_state() -> GameState {
        GameState::new(GameConfig::default())
    }

    fn activate(state: &mut GameState, kind: PickupKind) {
        let id = state.next_pickup_id();
        state.pickups.push(Pickup {
            id,
            kind,
            pos: Vec2::ZERO,
            radius: PICKUP_RADIUS,
            state: PickupState::Active(Expiry::Suspended { remaining: 5000.0 }),
        });
    }

    #[test]
    fn test_ball_moves_by_velocity() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        tick(&mut state, &TickInput::default(), &mut rng, &mut events);
        assert_eq!(state.ball.pos, Vec2::new(505.0, 305.0));
        assert!(events.is_empty());
        assert_eq!(state.ball.trail.len(), 1);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_wall_bounce_is_elastic() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut events = Vec::new();
        state.ball.pos = Vec2::new(500.0, 590.0);
        state.ball.vel = Vec2::new(3.0, 6.0);

        tick(&mut state, &TickInput::default(), &mut rng, &mut events);

        assert_eq!(state.ball.vel, Vec2::new(3.0, -6.0));
        assert_eq!(state.ball.pos.y, 600.0 - BALL_RADIUS);
        assert_eq!(events, vec![TickEvent::WallHit]);
    }

    #[test]
    fn test_wall_bounce_uses_enlarged_radius() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = Vec::new();
        activate(&mut state, PickupKind::BallEnlarge);
        state.ball.pos = Vec2::new(500.0, 25.0);
        state.ball.vel = Vec2::new(-4.0, -5.0);

        tick(&mut state, &TickInput::default(), &mut rng, &mut events);

        assert_eq!(state.ball.pos.y, BALL_RADIUS * ENLARGE_FACTOR);
        assert_eq!(state.ball.vel, Vec2::new(-4.0, 5.0));
    }

    #[test]
    fn test_dead_center_hit_on_right_paddle() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(4);
        state.ball.pos = Vec2::new(915.0, state.computer.center_y());
        state.ball.vel = Vec2::new(5.0, 5.0);

        bounce_off_paddle(&mut state, Side::Computer, &mut rng);

        assert!((state.ball.vel.x + 7.0).abs() < 0.01, "dx = {}", state.ball.vel.x);
        assert!(state.ball.vel.y.abs() < 7.0 * 0.051, "dy = {}", state.ball.vel.y);
        assert!((state.ball.speed - 7.3).abs() < 1e-5);
        assert!(state.computer.shake.is_some());
        assert!(state.computer.flash.is_some());
    }

    #[test]
    fn test_edge_hit_deflects_up_to_sixty_degrees() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(5);
        // Ball well below the paddle's bottom edge: offset clamps to 1
        state.ball.pos = Vec2::new(60.0, state.player.y + state.player.height + 10.0);

        bounce_off_paddle(&mut state, Side::Player, &mut rng);

        let angle = state.ball.vel.y.atan2(state.ball.vel.x);
        assert!(state.ball.vel.x > 0.0);
        assert!((angle - MAX_BOUNCE_ANGLE).abs() <= BOUNCE_ANGLE_JITTER + 1e-4);
    }

    #[test]
    fn test_speed_boost_launches_faster_without_increment() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(6);
        activate(&mut state, PickupKind::SpeedBoost);
        state.ball.pos = Vec2::new(60.0, state.player.center_y());

        bounce_off_paddle(&mut state, Side::Player, &mut rng);

        assert!((state.ball.vel.length() - 10.5).abs() < 1e-3);
        assert_eq!(state.ball.speed, 7.0);
    }

    #[test]
    fn test_player_collision_wins_over_computer() {
        let config = GameConfig {
            arena_width: 120.0,
            ..GameConfig::default()
        };
        let mut state = GameState::new(config);
        // Paddles at x=50 and x=45 overlap on a tiny arena
        let mut rng = Pcg32::seed_from_u64(8);
        let mut events = Vec::new();
        state.ball.pos = Vec2::new(55.0, 300.0);
        state.ball.vel = Vec2::ZERO;
        tick(&mut state, &TickInput::default(), &mut rng, &mut events);
        assert!(events.contains(&TickEvent::PaddleHit(Side::Player)));
        assert!(!events.contains(&TickEvent::PaddleHit(Side::Computer)));
    }

    #[test]
    fn test_left_exit_scores_for_computer() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut events = Vec::new();
        state.ball.pos = Vec2::new(16.0, 550.0);
        state.ball.vel = Vec2::new(-5.0, 0.0);

        tick(&mut state, &TickInput::default(), &mut rng, &mut events);

        assert_eq!(state.score.computer, 1);
        assert_eq!(
            events.last(),
            Some(&TickEvent::Scored {
                scorer: Side::Computer,
                match_over: false
            })
        );
    }

    #[test]
    fn test_enlarged_ball_scores_on_base_radius() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut events = Vec::new();
        activate(&mut state, PickupKind::BallEnlarge);
        state.ball.pos = Vec2::new(25.0, 550.0);
        state.ball.vel = Vec2::new(-5.0, 0.0);

        // x=20: the enlarged edge is past 0 but the base edge is not
        tick(&mut state, &TickInput::default(), &mut rng, &mut events);
        assert_eq!(state.ball.pos.x, 20.0);
        assert_eq!(state.score.computer, 0);
        assert!(events.is_empty());

        state.ball.pos.x = 12.0;
        tick(&mut state, &TickInput::default(), &mut rng, &mut events);
        assert_eq!(state.score.computer, 1);
    }

    #[test]
    fn test_no_score_after_game_over() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(10);
        let mut events = Vec::new();
        state.score.player = 5;
        state.score.game_over = true;
        state.score.winner = Some(Side::Player);
        state.ball.pos = Vec2::new(990.0, 550.0);
        state.ball.vel = Vec2::new(5.0, 0.0);

        tick(&mut state, &TickInput::default(), &mut rng, &mut events);

        assert_eq!(state.score.total(), 5);
        assert!(events.is_empty());
    }

    #[test]
    fn test_drunken_jitter_is_not_integrated() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut events = Vec::new();
        activate(&mut state, PickupKind::Drunken);
        state.ball.vel = Vec2::new(1.0, 0.0);
        let start = state.ball.pos;

        tick(&mut state, &TickInput::default(), &mut rng, &mut events);

        let moved = state.ball.pos - start;
        assert_eq!(state.ball.vel, Vec2::new(1.0, 0.0));
        assert!((moved.x - 1.0).abs() <= DRUNKEN_JITTER);
        assert!(moved.y.abs() <= DRUNKEN_JITTER);
    }

    #[test]
    fn test_computer_holds_inside_dead_zone() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(12);
        let mut events = Vec::new();
        state.ball.vel = Vec2::ZERO;
        state.ball.pos.y = state.computer.center_y() + 30.0;
        let y = state.computer.y;
        tick(&mut state, &TickInput::default(), &mut rng, &mut events);
        assert_eq!(state.computer.y, y);

        state.ball.pos.y = state.computer.center_y() + 100.0;
        tick(&mut state, &TickInput::default(), &mut rng, &mut events);
        assert_eq!(state.computer.y, y + COMPUTER_PADDLE_SPEED);
    }

    #[test]
    fn test_pointer_overrides_keys() {
        let mut state = new_state();
        let mut rng = Pcg32::seed_from_u64(13);
        let mut events = Vec::new();
        let input = TickInput {
            movement: 1,
            pointer_y: Some(100.0),
        };
        tick(&mut state, &input, &mut rng, &mut events);
        assert_eq!(state.player.y, 25.0);
    }

    proptest! {
        #[test]
        fn prop_paddles_stay_in_bounds(
            seed in any::<u64>(),
            steps in prop::collection::vec((-1i8..=1, prop::option::of(-200.0f32..800.0)), 1..200),
            enlarged in any::<bool>(),
        ) {
            let mut state = new_state();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut events = Vec::new();
            if enlarged {
                state.player.enlarge(state.config.arena_height);
            }
            for (movement, pointer_y) in steps {
                let input = TickInput { movement, pointer_y };
                tick(&mut state, &input, &mut rng, &mut events);
                for paddle in [&state.player, &state.computer] {
                    prop_assert!(paddle.y >= 0.0);
                    prop_assert!(paddle.y <= state.config.arena_height - paddle.height + 1e-3);
                }
            }
        }

        #[test]
        fn prop_wall_bounce_flips_only_dy(
            x in 200.0f32..800.0,
            dx in -10.0f32..10.0,
            dy in 0.5f32..10.0,
            bottom in any::<bool>(),
        ) {
            let mut state = new_state();
            let mut rng = Pcg32::seed_from_u64(0);
            let mut events = Vec::new();
            let (y, dy) = if bottom { (600.0 - BALL_RADIUS, dy) } else { (BALL_RADIUS, -dy) };
            state.ball.pos = Vec2::new(x, y);
            state.ball.vel = Vec2::new(dx, dy);

            tick(&mut state, &TickInput::default(), &mut rng, &mut events);

            prop_assert_eq!(state.ball.vel, Vec2::new(dx, -dy));
            let expected_y = if bottom { 600.0 - BALL_RADIUS } else { BALL_RADIUS };
            prop_assert!((state.ball.pos.y - expected_y).abs() < 1e-3);
        }
    }
}
