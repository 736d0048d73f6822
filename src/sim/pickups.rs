//! Pickup lifecycle: spawn, collect, stack, expire, suspend on pause
//!
//! Pickups live in `GameState::pickups` in id order. A spawned pickup becomes
//! active when the ball touches it; activating a kind that is already active
//! refreshes the existing pickup's expiry and drops the new one, so there is at
//! most one active pickup per kind and one expiry timer per active pickup.

use glam::Vec2;
use rand::Rng;

use super::collision::{Circle, circle_intersects_rect, circles_overlap, distance};
use super::state::{Expiry, GameState, Pickup, PickupId, PickupKind, PickupState};
use super::timer::{TimerEvent, TimerHandle, TimerQueue};
use crate::consts::*;

/// What the pickup manager did, for messages and sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupEvent {
    Spawned(PickupId, PickupKind),
    /// A fresh effect started
    Activated(PickupKind),
    /// An already-active kind was collected again and its timer restarted
    Refreshed(PickupKind),
    Expired(PickupKind),
}

/// Owns the spawn interval; everything else is in `GameState`
#[derive(Debug, Clone, Default)]
pub struct PickupManager {
    spawn_timer: Option<TimerHandle>,
}

impl PickupManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_spawning(&self) -> bool {
        self.spawn_timer.is_some()
    }

    /// (Re)start the spawn interval with one immediate attempt
    pub fn start_spawner<R: Rng>(
        &mut self,
        state: &mut GameState,
        timers: &mut TimerQueue,
        now: f64,
        rng: &mut R,
    ) -> Option<PickupEvent> {
        self.stop_spawner(timers);
        let period = state.config.pickup_spawn_interval_ms;
        self.spawn_timer = Some(timers.schedule_interval(now, period, TimerEvent::SpawnPickup));
        try_spawn(state, rng)
    }

    pub fn stop_spawner(&mut self, timers: &mut TimerQueue) {
        if let Some(handle) = self.spawn_timer.take() {
            timers.cancel(handle);
        }
    }

    /// Pause: stop spawning and freeze every active pickup's remaining time
    pub fn suspend(&mut self, state: &mut GameState, timers: &mut TimerQueue, now: f64) {
        self.stop_spawner(timers);
        for pickup in &mut state.pickups {
            if let PickupState::Active(Expiry::Scheduled { timer, deadline }) = pickup.state {
                let remaining = timers
                    .suspend(timer, now)
                    .unwrap_or_else(|| (deadline - now).max(0.0));
                pickup.state = PickupState::Active(Expiry::Suspended { remaining });
            }
        }
    }

    /// Resume: re-arm each frozen pickup for exactly its remaining time, restart spawning
    pub fn resume<R: Rng>(
        &mut self,
        state: &mut GameState,
        timers: &mut TimerQueue,
        now: f64,
        rng: &mut R,
    ) -> Option<PickupEvent> {
        for pickup in &mut state.pickups {
            if let PickupState::Active(Expiry::Suspended { remaining }) = pickup.state {
                pickup.state = PickupState::Active(arm_expiry(timers, pickup.id, now, remaining));
            }
        }
        self.start_spawner(state, timers, now, rng)
    }

    /// Restart: cancel every pickup timer, undo paddle growth, empty the field
    pub fn clear(&mut self, state: &mut GameState, timers: &mut TimerQueue) {
        self.stop_spawner(timers);
        for pickup in &state.pickups {
            if let PickupState::Active(Expiry::Scheduled { timer, .. }) = pickup.state {
                timers.cancel(timer);
            }
        }
        if state.is_active(PickupKind::PaddleEnlarge) {
            let arena_height = state.config.arena_height;
            state.player.restore_height(arena_height);
        }
        state.pickups.clear();
    }
}

/// One spawn attempt: random kind, random spot in the central half of the
/// arena. Dropped silently if it lands on a paddle or too close to the ball.
pub fn try_spawn<R: Rng>(state: &mut GameState, rng: &mut R) -> Option<PickupEvent> {
    let kind = PickupKind::ALL[rng.random_range(0..PickupKind::ALL.len())];
    let radius = state.config.pickup_radius;
    let (w, h) = (state.config.arena_width, state.config.arena_height);
    let pos = Vec2::new(
        rng.random::<f32>() * (w * 0.5 - radius * 2.0) + w * 0.25 + radius,
        rng.random::<f32>() * (h * 0.5 - radius * 2.0) + h * 0.25 + radius,
    );
    let candidate = Circle::new(pos, radius);

    let on_paddle = circle_intersects_rect(candidate, state.player.rect())
        || circle_intersects_rect(candidate, state.computer.rect());
    let near_ball = distance(pos, state.ball.pos) < state.ball.radius + radius + PICKUP_SPAWN_MARGIN;
    if on_paddle || near_ball {
        log::debug!("Pickup spawn conflict at ({:.0}, {:.0}), retrying next interval", pos.x, pos.y);
        return None;
    }

    let id = state.next_pickup_id();
    state.pickups.push(Pickup {
        id,
        kind,
        pos,
        radius,
        state: PickupState::Spawned,
    });
    log::info!("Spawned pickup {:?} at ({:.0}, {:.0})", kind, pos.x, pos.y);
    Some(PickupEvent::Spawned(id, kind))
}

/// Activate every spawned pickup the ball is touching
pub fn collect<R: Rng>(
    state: &mut GameState,
    timers: &mut TimerQueue,
    now: f64,
    rng: &mut R,
    events: &mut Vec<PickupEvent>,
) {
    let ball = state.ball_circle();
    let touched: Vec<PickupId> = state
        .spawned_pickups()
        .filter(|p| circles_overlap(ball, p.circle()))
        .map(|p| p.id)
        .collect();

    for id in touched {
        if let Some(event) = activate(state, timers, id, now, rng) {
            events.push(event);
        }
    }
    state.pickups.retain(|p| p.state != PickupState::Consumed);
}

/// Turn a spawned pickup into an active one, or fold it into the active
/// pickup of the same kind
pub fn activate<R: Rng>(
    state: &mut GameState,
    timers: &mut TimerQueue,
    id: PickupId,
    now: f64,
    rng: &mut R,
) -> Option<PickupEvent> {
    let duration = state.config.pickup_duration_ms;
    let kind = state.pickups.iter().find(|p| p.id == id && p.is_spawned())?.kind;
    log::info!("Collected pickup {:?}", kind);

    let existing = state
        .pickups
        .iter_mut()
        .find(|p| p.kind == kind && p.id != id && p.is_active());
    if let Some(existing) = existing {
        log::debug!("Stacking {:?}: refreshing duration", kind);
        if let PickupState::Active(Expiry::Scheduled { timer, .. }) = existing.state {
            timers.cancel(timer);
        }
        existing.state = PickupState::Active(arm_expiry(timers, existing.id, now, duration));
        set_state(state, id, PickupState::Consumed);
        return Some(PickupEvent::Refreshed(kind));
    }

    apply_effect(state, kind, rng);
    let expiry = arm_expiry(timers, id, now, duration);
    set_state(state, id, PickupState::Active(expiry));
    Some(PickupEvent::Activated(kind))
}

/// The expiry timer fired: drop the pickup and undo its effect if it was the
/// last of its kind
pub fn expire(state: &mut GameState, id: PickupId) -> Option<PickupEvent> {
    let idx = state.pickups.iter().position(|p| p.id == id && p.is_active())?;
    let kind = state.pickups[idx].kind;
    state.pickups.remove(idx);

    if state.is_active(kind) {
        log::debug!("Expired one {:?}, others still active", kind);
    } else {
        log::info!("{:?} wore off", kind);
        revert_effect(state, kind);
    }
    Some(PickupEvent::Expired(kind))
}

fn arm_expiry(timers: &mut TimerQueue, id: PickupId, now: f64, delay: f64) -> Expiry {
    let timer = timers.schedule(now, delay, TimerEvent::ExpirePickup(id));
    Expiry::Scheduled {
        timer,
        deadline: now + delay,
    }
}

fn set_state(state: &mut GameState, id: PickupId, new_state: PickupState) {
    if let Some(p) = state.pickups.iter_mut().find(|p| p.id == id) {
        p.state = new_state;
    }
}

/// Immediate part of an effect. Speed, size and drunken are read live from
/// the active set, so only trajectory and paddle growth do anything here.
fn apply_effect<R: Rng>(state: &mut GameState, kind: PickupKind, rng: &mut R) {
    match kind {
        PickupKind::SpeedBoost | PickupKind::BallEnlarge | PickupKind::Drunken => {}
        PickupKind::TrajectoryRandomize => {
            let vel = &mut state.ball.vel;
            vel.x = shifted_component(vel.x, rng);
            vel.y = shifted_component(vel.y, rng);
        }
        PickupKind::PaddleEnlarge => {
            let arena_height = state.config.arena_height;
            state.player.enlarge(arena_height);
        }
    }
}

fn revert_effect(state: &mut GameState, kind: PickupKind) {
    if kind == PickupKind::PaddleEnlarge {
        let arena_height = state.config.arena_height;
        state.player.restore_height(arena_height);
    }
}

/// Random offset in [-5, 5], then at least 2 in magnitude
fn shifted_component<R: Rng>(v: f32, rng: &mut R) -> f32 {
    let v = v + rng.random_range(-TRAJECTORY_OFFSET..=TRAJECTORY_OFFSET);
    if v == 0.0 {
        if rng.random_bool(0.5) {
            TRAJECTORY_MIN_COMPONENT
        } else {
            -TRAJECTORY_MIN_COMPONENT
        }
    } else if v.abs() < TRAJECTORY_MIN_COMPONENT {
        TRAJECTORY_MIN_COMPONENT.copysign(v)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn new_state() -> GameState {
        GameState::new(GameConfig::default())
    }

    fn place(state: &mut GameState, kind: PickupKind, pos: Vec2) -> PickupId {
        let id = state.next_pickup_id();
        state.pickups.push(Pickup {
            id,
            kind,
            pos,
            radius: PICKUP_RADIUS,
            state: PickupState::Spawned,
        });
        id
    }

    fn expiry_timers(timers: &TimerQueue) -> usize {
        timers.count_matching(|e| matches!(e, TimerEvent::ExpirePickup(_)))
    }

    #[test]
    fn test_spawn_lands_in_central_region() {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut spawned = 0;
        for _ in 0..200 {
            let mut state = new_state();
            // Ball out of the way so only the region matters
            state.ball.pos = Vec2::new(-1000.0, -1000.0);
            if let Some(PickupEvent::Spawned(_, _)) = try_spawn(&mut state, &mut rng) {
                spawned += 1;
                let p = &state.pickups[0];
                assert!(p.pos.x >= 250.0 + PICKUP_RADIUS && p.pos.x <= 750.0 - PICKUP_RADIUS);
                assert!(p.pos.y >= 150.0 + PICKUP_RADIUS && p.pos.y <= 450.0 - PICKUP_RADIUS);
                assert!(p.is_spawned());
            }
        }
        assert_eq!(spawned, 200);
    }

    #[test]
    fn test_spawn_near_ball_is_dropped() {
        let mut rng = Pcg32::seed_from_u64(22);
        let mut state = new_state();
        // Huge ball covering the whole central region
        state.ball.radius = 1000.0;
        assert_eq!(try_spawn(&mut state, &mut rng), None);
        assert!(state.pickups.is_empty());
    }

    #[test]
    fn test_spawn_on_paddle_is_dropped() {
        let mut rng = Pcg32::seed_from_u64(23);
        let mut state = new_state();
        state.ball.pos = Vec2::new(-1000.0, -1000.0);
        // Paddle stretched across the whole arena
        state.player.x = 0.0;
        state.player.y = 0.0;
        state.player.width = 1000.0;
        state.player.height = 600.0;
        assert_eq!(try_spawn(&mut state, &mut rng), None);
    }

    #[test]
    fn test_collect_activates_and_arms_timer() {
        let mut rng = Pcg32::seed_from_u64(24);
        let mut state = new_state();
        let mut timers = TimerQueue::new();
        let mut events = Vec::new();
        let pos = state.ball.pos + Vec2::new(40.0, 0.0);
        place(&mut state, PickupKind::BallEnlarge, pos);

        collect(&mut state, &mut timers, 1000.0, &mut rng, &mut events);

        assert_eq!(events, vec![PickupEvent::Activated(PickupKind::BallEnlarge)]);
        assert!(state.is_active(PickupKind::BallEnlarge));
        assert_eq!(state.effective_ball_radius(), 22.5);
        assert_eq!(expiry_timers(&timers), 1);
    }

    #[test]
    fn test_out_of_reach_pickup_stays_spawned() {
        let mut rng = Pcg32::seed_from_u64(25);
        let mut state = new_state();
        let mut timers = TimerQueue::new();
        let mut events = Vec::new();
        let pos = state.ball.pos + Vec2::new(45.0, 0.0);
        place(&mut state, PickupKind::Drunken, pos);

        collect(&mut state, &mut timers, 0.0, &mut rng, &mut events);

        assert!(events.is_empty());
        assert!(state.pickups[0].is_spawned());
    }

    #[test]
    fn test_stacking_refreshes_single_timer() {
        let mut rng = Pcg32::seed_from_u64(26);
        let mut state = new_state();
        let mut timers = TimerQueue::new();
        let mut events = Vec::new();
        let ball = state.ball.pos;

        let first = place(&mut state, PickupKind::SpeedBoost, ball);
        collect(&mut state, &mut timers, 0.0, &mut rng, &mut events);
        place(&mut state, PickupKind::SpeedBoost, ball);
        collect(&mut state, &mut timers, 3000.0, &mut rng, &mut events);

        assert_eq!(
            events,
            vec![
                PickupEvent::Activated(PickupKind::SpeedBoost),
                PickupEvent::Refreshed(PickupKind::SpeedBoost),
            ]
        );
        assert_eq!(state.active_pickups().count(), 1);
        assert_eq!(state.pickups[0].id, first);
        assert_eq!(expiry_timers(&timers), 1);
        match state.pickups[0].state {
            PickupState::Active(Expiry::Scheduled { deadline, .. }) => assert_eq!(deadline, 8000.0),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_trajectory_from_rest_gets_min_components() {
        for seed in 0..100 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut state = new_state();
            state.ball.vel = Vec2::ZERO;
            apply_effect(&mut state, PickupKind::TrajectoryRandomize, &mut rng);
            assert!(state.ball.vel.x.abs() >= TRAJECTORY_MIN_COMPONENT);
            assert!(state.ball.vel.y.abs() >= TRAJECTORY_MIN_COMPONENT);
            assert!(state.ball.vel.x.abs() <= TRAJECTORY_OFFSET);
        }
    }

    #[test]
    fn test_paddle_enlarge_and_expire() {
        let mut rng = Pcg32::seed_from_u64(27);
        let mut state = new_state();
        let mut timers = TimerQueue::new();
        let mut events = Vec::new();
        state.player.y = 450.0;
        let ball = state.ball.pos;
        let id = place(&mut state, PickupKind::PaddleEnlarge, ball);

        collect(&mut state, &mut timers, 0.0, &mut rng, &mut events);
        assert_eq!(state.player.height, PADDLE_HEIGHT * ENLARGE_FACTOR);
        assert_eq!(state.player.y, 600.0 - PADDLE_HEIGHT * ENLARGE_FACTOR);
        assert_eq!(state.computer.height, PADDLE_HEIGHT);

        assert_eq!(expire(&mut state, id), Some(PickupEvent::Expired(PickupKind::PaddleEnlarge)));
        assert_eq!(state.player.height, PADDLE_HEIGHT);
        assert!(state.pickups.is_empty());
        assert_eq!(expire(&mut state, id), None);
    }

    #[test]
    fn test_suspend_and_resume_preserve_remaining() {
        let mut rng = Pcg32::seed_from_u64(28);
        let mut state = new_state();
        let mut timers = TimerQueue::new();
        let mut manager = PickupManager::new();
        let mut events = Vec::new();
        let ball = state.ball.pos;
        place(&mut state, PickupKind::Drunken, ball);
        collect(&mut state, &mut timers, 0.0, &mut rng, &mut events);

        manager.suspend(&mut state, &mut timers, 2000.0);
        assert_eq!(
            state.pickups[0].state,
            PickupState::Active(Expiry::Suspended { remaining: 3000.0 })
        );
        assert_eq!(expiry_timers(&timers), 0);

        state.ball.pos = Vec2::new(-1000.0, -1000.0);
        manager.resume(&mut state, &mut timers, 60_000.0, &mut rng);
        match state.pickups[0].state {
            PickupState::Active(Expiry::Scheduled { deadline, .. }) => assert_eq!(deadline, 63_000.0),
            other => panic!("unexpected state {other:?}"),
        }
        assert!(manager.is_spawning());
    }

    #[test]
    fn test_clear_reverts_paddle_and_cancels_timers() {
        let mut rng = Pcg32::seed_from_u64(29);
        let mut state = new_state();
        let mut timers = TimerQueue::new();
        let mut manager = PickupManager::new();
        let mut events = Vec::new();
        let ball = state.ball.pos;
        place(&mut state, PickupKind::PaddleEnlarge, ball);
        collect(&mut state, &mut timers, 0.0, &mut rng, &mut events);
        manager.start_spawner(&mut state, &mut timers, 0.0, &mut rng);

        manager.clear(&mut state, &mut timers);

        assert!(state.pickups.is_empty());
        assert_eq!(state.player.height, PADDLE_HEIGHT);
        assert!(timers.is_empty());
        assert!(!manager.is_spawning());
    }
}
