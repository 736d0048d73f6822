//! Game state machine and frame driver
//!
//! `Game` owns the match state, the phase, every timer and the RNG. The
//! browser calls `frame` once per animation frame; input callbacks either
//! update `InputState` or queue an `Action` that is applied at the start of
//! the next frame, so all mutation happens inside `frame` in a fixed order:
//! queued actions, due timers, physics tick (running only), draw.

use std::mem;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::pickups::{self, PickupEvent, PickupManager};
use super::state::{GamePhase, GameState, PickupKind, Side};
use super::tick::{TickEvent, tick};
use super::timer::{TimerEvent, TimerHandle, TimerQueue};
use crate::config::GameConfig;
use crate::consts::*;
use crate::input::{InputCommand, InputState};
use crate::presenter::{BallStats, ButtonState, ControlButtons, Countdown, Presenter, Snapshot, SoundCue};

/// Player-facing controls (buttons and their keyboard shortcuts)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    TogglePause,
    Restart,
}

/// What happens when a countdown reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterCountdown {
    /// New game: random serve direction, start spawning pickups
    Kickoff,
    /// After a point: serve toward the side that conceded
    Serve { toward: Side },
}

#[derive(Debug, Clone, Copy)]
struct CountdownRun {
    remaining: u32,
    then: AfterCountdown,
    timer: TimerHandle,
}

/// One game session
pub struct Game {
    state: GameState,
    phase: GamePhase,
    timers: TimerQueue,
    pickups: PickupManager,
    input: InputState,
    rng: Pcg32,
    countdown: Option<CountdownRun>,
    countdown_display: Countdown,
    go_banner_timer: Option<TimerHandle>,
    flash_timers: [Option<TimerHandle>; 2],
    message_timer: Option<TimerHandle>,
    /// A game has been started at least once
    started: bool,
    pending: Vec<Action>,
    tick_events: Vec<TickEvent>,
    pickup_events: Vec<PickupEvent>,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let input = InputState::new(config.arena_height);
        Self {
            state: GameState::new(config),
            phase: GamePhase::Idle,
            timers: TimerQueue::new(),
            pickups: PickupManager::new(),
            input,
            rng: Pcg32::seed_from_u64(seed),
            countdown: None,
            countdown_display: Countdown::Hidden,
            go_banner_timer: None,
            flash_timers: [None; 2],
            message_timer: None,
            started: false,
            pending: Vec::new(),
            tick_events: Vec::new(),
            pickup_events: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access to entities (tools and tests); the phase stays private
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn is_spawning_pickups(&self) -> bool {
        self.pickups.is_spawning()
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown_display
    }

    /// Queue a control action for the next frame
    pub fn request(&mut self, action: Action) {
        self.pending.push(action);
    }

    /// Key pressed; space and R are only live once a game has started
    pub fn key_down(&mut self, code: &str) {
        match self.input.key_down(code) {
            Some(InputCommand::TogglePause) if self.started => self.request(Action::TogglePause),
            Some(InputCommand::Restart) if self.started => self.request(Action::Restart),
            _ => {}
        }
    }

    pub fn key_up(&mut self, code: &str) {
        self.input.key_up(code);
    }

    pub fn click(&mut self) {
        self.input.click(self.started);
    }

    pub fn pointer_move(&mut self, y: f32) {
        self.input.pointer_move(y);
    }

    pub fn touch_start(&mut self, y: f32) {
        let paused = self.phase != GamePhase::Running;
        self.input.touch_start(y, paused);
    }

    pub fn touch_move(&mut self, y: f32) {
        let paused = self.phase != GamePhase::Running;
        self.input.touch_move(y, paused);
    }

    pub fn touch_end(&mut self, now: f64) {
        if let Some(InputCommand::TogglePause) = self.input.touch_end(now)
            && self.started
        {
            self.request(Action::TogglePause);
        }
    }

    /// The canvas changed size: re-anchor paddles, recenter the ball once playing
    pub fn resize(&mut self, arena_width: f32, arena_height: f32) {
        self.state.config.arena_width = arena_width;
        self.state.config.arena_height = arena_height;
        self.state.reanchor_paddles();
        if self.started {
            let center = self.state.arena_center();
            let base_speed = self.state.config.ball_base_speed;
            self.state
                .ball
                .serve(center, base_speed, Some(Side::Computer), &mut self.rng);
        }
    }

    /// Run one animation frame at time `now` (ms)
    pub fn frame(&mut self, now: f64, presenter: &mut dyn Presenter) {
        for action in mem::take(&mut self.pending) {
            self.apply(action, now, presenter);
        }

        while let Some(event) = self.timers.pop_due(now) {
            self.on_timer(event, now, presenter);
        }

        if self.phase == GamePhase::Running {
            self.step(now, presenter);
        }

        presenter.draw(&self.snapshot());
        if self.phase == GamePhase::Running {
            presenter.update_ball_stats(self.ball_stats());
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: &self.state,
            phase: self.phase,
            countdown: self.countdown_display,
            ball_radius: self.state.effective_ball_radius(),
        }
    }

    pub fn ball_stats(&self) -> BallStats {
        BallStats {
            speed: self.state.ball.speed,
            boosted: self.state.is_active(PickupKind::SpeedBoost),
            radius: self.state.effective_ball_radius(),
        }
    }

    fn apply(&mut self, action: Action, now: f64, presenter: &mut dyn Presenter) {
        match action {
            Action::Start => self.start(now, presenter),
            Action::TogglePause => self.toggle_pause(now, presenter),
            Action::Restart => self.restart(now, presenter),
        }
    }

    /// Idle -> counting down
    pub fn start(&mut self, now: f64, presenter: &mut dyn Presenter) {
        if self.phase != GamePhase::Idle {
            log::debug!("Start ignored in {:?}", self.phase);
            return;
        }
        self.started = true;
        log::info!("Game started");
        self.begin_countdown(AfterCountdown::Kickoff, now, presenter);
    }

    /// Running <-> paused; anything else is a no-op
    pub fn toggle_pause(&mut self, now: f64, presenter: &mut dyn Presenter) {
        match self.phase {
            GamePhase::Running => {
                self.pickups.suspend(&mut self.state, &mut self.timers, now);
                self.state.player.cancel_shake();
                self.state.computer.cancel_shake();
                self.cancel_flashes();
                log::info!("Game paused");
                self.set_phase(GamePhase::Paused, presenter);
            }
            GamePhase::Paused => {
                log::info!("Game resumed");
                self.set_phase(GamePhase::Running, presenter);
                self.pickups
                    .resume(&mut self.state, &mut self.timers, now, &mut self.rng);
            }
            phase => log::debug!("Pause ignored in {:?}", phase),
        }
    }

    /// Full reset and a fresh countdown, from any phase except mid-countdown
    pub fn restart(&mut self, now: f64, presenter: &mut dyn Presenter) {
        if self.phase == GamePhase::CountingDown {
            log::debug!("Restart ignored during countdown");
            return;
        }

        self.pickups.clear(&mut self.state, &mut self.timers);
        self.timers.clear();
        self.countdown = None;
        self.go_banner_timer = None;
        self.flash_timers = [None; 2];
        self.message_timer = None;
        presenter.hide_transient_message();

        self.state.score = Default::default();
        self.state.reset_paddles();
        self.state.ball.pos = self.state.arena_center();
        self.state.ball.speed = self.state.config.ball_base_speed;
        self.state.ball.clear_trail();
        self.input.reset_for_restart();
        self.started = true;

        presenter.update_score_display(0, 0);
        log::info!("Restart sequence initiated");
        self.begin_countdown(AfterCountdown::Kickoff, now, presenter);
    }

    /// Drop pending flash reverts and show both paddles in their own colors
    fn cancel_flashes(&mut self) {
        for side in [Side::Player, Side::Computer] {
            if let Some(timer) = self.flash_timers[side_index(side)].take() {
                self.timers.cancel(timer);
            }
            self.state.paddle_mut(side).flash = None;
        }
    }

    fn set_phase(&mut self, phase: GamePhase, presenter: &mut dyn Presenter) {
        if self.phase != phase {
            log::debug!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
        presenter.set_control_buttons_state(self.control_buttons());
    }

    pub fn control_buttons(&self) -> ControlButtons {
        use ButtonState::*;
        let (start, pause, restart) = match self.phase {
            GamePhase::Idle => (Enabled, Hidden, Hidden),
            GamePhase::CountingDown => (Hidden, Disabled, Disabled),
            GamePhase::Running | GamePhase::Paused => (Hidden, Enabled, Enabled),
            GamePhase::GameOver => (Hidden, Disabled, Enabled),
        };
        ControlButtons {
            start,
            pause,
            pause_shows_resume: self.phase == GamePhase::Paused,
            restart,
        }
    }

    fn begin_countdown(&mut self, then: AfterCountdown, now: f64, presenter: &mut dyn Presenter) {
        if let Some(run) = self.countdown.take() {
            self.timers.cancel(run.timer);
        }
        if let Some(timer) = self.go_banner_timer.take() {
            self.timers.cancel(timer);
        }
        let timer = self
            .timers
            .schedule(now, COUNTDOWN_STEP_MS, TimerEvent::CountdownTick);
        self.countdown = Some(CountdownRun {
            remaining: COUNTDOWN_SECONDS,
            then,
            timer,
        });
        self.show_countdown(Countdown::Value(COUNTDOWN_SECONDS), presenter);
        self.set_phase(GamePhase::CountingDown, presenter);
    }

    fn show_countdown(&mut self, countdown: Countdown, presenter: &mut dyn Presenter) {
        self.countdown_display = countdown;
        presenter.show_countdown(countdown);
    }

    fn on_countdown_tick(&mut self, now: f64, presenter: &mut dyn Presenter) {
        let Some(mut run) = self.countdown.take() else {
            return;
        };
        run.remaining = run.remaining.saturating_sub(1);
        if run.remaining > 0 {
            run.timer = self
                .timers
                .schedule(now, COUNTDOWN_STEP_MS, TimerEvent::CountdownTick);
            self.countdown = Some(run);
            self.show_countdown(Countdown::Value(run.remaining), presenter);
            return;
        }

        self.show_countdown(Countdown::Go, presenter);
        self.go_banner_timer = Some(self.timers.schedule(now, GO_BANNER_MS, TimerEvent::HideGoBanner));

        let center = self.state.arena_center();
        let base_speed = self.state.config.ball_base_speed;
        self.set_phase(GamePhase::Running, presenter);
        match run.then {
            AfterCountdown::Kickoff => {
                self.state.ball.serve(center, base_speed, None, &mut self.rng);
                self.state.ball.clear_trail();
                self.pickups
                    .start_spawner(&mut self.state, &mut self.timers, now, &mut self.rng);
                log::info!("Countdown finished, game active");
            }
            AfterCountdown::Serve { toward } => {
                self.state
                    .ball
                    .serve(center, base_speed, Some(toward), &mut self.rng);
                self.state.ball.clear_trail();
            }
        }
    }

    fn on_timer(&mut self, event: TimerEvent, now: f64, presenter: &mut dyn Presenter) {
        match event {
            TimerEvent::CountdownTick => self.on_countdown_tick(now, presenter),
            TimerEvent::HideGoBanner => {
                self.go_banner_timer = None;
                if self.countdown_display == Countdown::Go {
                    self.show_countdown(Countdown::Hidden, presenter);
                }
            }
            TimerEvent::SpawnPickup => {
                if self.phase == GamePhase::Running {
                    pickups::try_spawn(&mut self.state, &mut self.rng);
                }
            }
            TimerEvent::ExpirePickup(id) => {
                pickups::expire(&mut self.state, id);
            }
            TimerEvent::FlashRevert(side) => {
                self.flash_timers[side_index(side)] = None;
                self.state.paddle_mut(side).flash = None;
            }
            TimerEvent::HidePickupMessage => {
                self.message_timer = None;
                presenter.hide_transient_message();
            }
        }
    }

    /// One running tick: physics, then pickups
    fn step(&mut self, now: f64, presenter: &mut dyn Presenter) {
        let input = self.input.tick_input();
        let mut events = mem::take(&mut self.tick_events);
        tick(&mut self.state, &input, &mut self.rng, &mut events);

        for event in events.drain(..) {
            match event {
                TickEvent::WallHit => presenter.play_sound(SoundCue::WallHit),
                TickEvent::PaddleHit(side) => {
                    let slot = &mut self.flash_timers[side_index(side)];
                    if let Some(timer) = slot.take() {
                        self.timers.cancel(timer);
                    }
                    *slot = Some(self.timers.schedule(now, FLASH_DURATION_MS, TimerEvent::FlashRevert(side)));
                    presenter.play_sound(SoundCue::PaddleHit);
                }
                TickEvent::Scored { scorer, match_over } => {
                    self.on_score(scorer, match_over, now, presenter);
                }
            }
        }
        self.tick_events = events;

        if self.phase != GamePhase::Running {
            return;
        }

        let mut events = mem::take(&mut self.pickup_events);
        pickups::collect(&mut self.state, &mut self.timers, now, &mut self.rng, &mut events);
        for event in events.drain(..) {
            if let PickupEvent::Activated(kind) = event {
                self.show_pickup_message(kind.message(), now, presenter);
                presenter.play_sound(SoundCue::PickupCollect);
            }
        }
        self.pickup_events = events;
    }

    fn on_score(&mut self, scorer: Side, match_over: bool, now: f64, presenter: &mut dyn Presenter) {
        let score = &self.state.score;
        log::info!("{} scores ({} - {})", scorer.name(), score.player, score.computer);
        presenter.update_score_display(score.player, score.computer);
        presenter.trigger_score_effect();
        presenter.play_sound(SoundCue::Score);

        if match_over {
            self.pickups.stop_spawner(&mut self.timers);
            log::info!("Game over, {} wins", scorer.name());
            presenter.play_sound(SoundCue::GameOver);
            self.set_phase(GamePhase::GameOver, presenter);
        } else {
            self.begin_countdown(
                AfterCountdown::Serve {
                    toward: scorer.opponent(),
                },
                now,
                presenter,
            );
        }
    }

    fn show_pickup_message(&mut self, text: &str, now: f64, presenter: &mut dyn Presenter) {
        if let Some(timer) = self.message_timer.take() {
            self.timers.cancel(timer);
        }
        presenter.show_transient_message(text, PICKUP_MESSAGE_MS);
        self.message_timer = Some(self.timers.schedule(now, PICKUP_MESSAGE_MS, TimerEvent::HidePickupMessage));
    }
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Player => 0,
        Side::Computer => 1,
    }
}
