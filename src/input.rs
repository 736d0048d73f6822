//! Keyboard, pointer and touch input
//!
//! Movement keys are level-sampled once per tick; space and R are edge
//! commands. Pointer and touch control are mutually exclusive, and keyboard
//! movement applies whenever neither is on.

use crate::consts::DOUBLE_TAP_MS;
use crate::sim::TickInput;

/// How the player paddle is steered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    #[default]
    Keyboard,
    /// Paddle follows the mouse (toggled by clicking the canvas)
    Pointer,
    /// Paddle follows the finger
    Touch,
}

/// One-shot commands produced by input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    TogglePause,
    Restart,
}

/// Current input as seen by the simulation
#[derive(Debug, Clone)]
pub struct InputState {
    up_w: bool,
    up_arrow: bool,
    down_s: bool,
    down_arrow: bool,
    mode: ControlMode,
    /// Last pointer/touch y in arena coordinates
    pointer_y: f32,
    last_tap_ms: Option<f64>,
}

impl InputState {
    pub fn new(arena_height: f32) -> Self {
        Self {
            up_w: false,
            up_arrow: false,
            down_s: false,
            down_arrow: false,
            mode: ControlMode::Keyboard,
            pointer_y: arena_height / 2.0,
            last_tap_ms: None,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn pointer_y(&self) -> f32 {
        self.pointer_y
    }

    /// Key pressed (`KeyboardEvent.code`)
    pub fn key_down(&mut self, code: &str) -> Option<InputCommand> {
        match code {
            "KeyW" => self.up_w = true,
            "ArrowUp" => self.up_arrow = true,
            "KeyS" => self.down_s = true,
            "ArrowDown" => self.down_arrow = true,
            "Space" => return Some(InputCommand::TogglePause),
            "KeyR" => return Some(InputCommand::Restart),
            _ => {}
        }
        None
    }

    /// Key released (`KeyboardEvent.code`)
    pub fn key_up(&mut self, code: &str) {
        match code {
            "KeyW" => self.up_w = false,
            "ArrowUp" => self.up_arrow = false,
            "KeyS" => self.down_s = false,
            "ArrowDown" => self.down_arrow = false,
            _ => {}
        }
    }

    /// Both bindings are equivalent: holding W and ArrowUp is not faster
    pub fn movement(&self) -> i8 {
        let up = self.up_w || self.up_arrow;
        let down = self.down_s || self.down_arrow;
        i8::from(down) - i8::from(up)
    }

    /// Canvas click toggles pointer control once a game has started
    pub fn click(&mut self, game_started: bool) {
        if !game_started || self.mode == ControlMode::Touch {
            return;
        }
        self.mode = match self.mode {
            ControlMode::Pointer => {
                log::info!("Mouse control OFF");
                ControlMode::Keyboard
            }
            _ => {
                log::info!("Mouse control ON");
                ControlMode::Pointer
            }
        };
    }

    /// Mouse moved; tracked only while pointer control is on
    pub fn pointer_move(&mut self, y: f32) {
        if self.mode == ControlMode::Pointer {
            self.pointer_y = y;
        }
    }

    /// Finger down switches to touch control
    pub fn touch_start(&mut self, y: f32, paused: bool) {
        self.mode = ControlMode::Touch;
        if !paused {
            self.pointer_y = y;
        }
    }

    pub fn touch_move(&mut self, y: f32, paused: bool) {
        if self.mode == ControlMode::Touch && !paused {
            self.pointer_y = y;
        }
    }

    /// Finger up; two within `DOUBLE_TAP_MS` toggle pause
    pub fn touch_end(&mut self, now_ms: f64) -> Option<InputCommand> {
        let double = self
            .last_tap_ms
            .map(|last| {
                let gap = now_ms - last;
                gap > 0.0 && gap < DOUBLE_TAP_MS
            })
            .unwrap_or(false);
        self.last_tap_ms = Some(now_ms);
        double.then_some(InputCommand::TogglePause)
    }

    /// Restart turns pointer control off; touch stays on
    pub fn reset_for_restart(&mut self) {
        if self.mode == ControlMode::Pointer {
            self.mode = ControlMode::Keyboard;
        }
    }

    /// Sample for the next tick
    pub fn tick_input(&self) -> TickInput {
        let pointer_y = match self.mode {
            ControlMode::Keyboard => None,
            ControlMode::Pointer | ControlMode::Touch => Some(self.pointer_y),
        };
        TickInput {
            movement: self.movement(),
            pointer_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_are_equivalent() {
        let mut input = InputState::new(600.0);
        input.key_down("KeyW");
        assert_eq!(input.movement(), -1);
        input.key_down("ArrowUp");
        assert_eq!(input.movement(), -1);
        input.key_up("KeyW");
        assert_eq!(input.movement(), -1);
        input.key_up("ArrowUp");
        assert_eq!(input.movement(), 0);
        input.key_down("ArrowDown");
        assert_eq!(input.movement(), 1);
        input.key_down("KeyW");
        assert_eq!(input.movement(), 0);
    }

    #[test]
    fn test_command_keys() {
        let mut input = InputState::new(600.0);
        assert_eq!(input.key_down("Space"), Some(InputCommand::TogglePause));
        assert_eq!(input.key_down("KeyR"), Some(InputCommand::Restart));
        assert_eq!(input.key_down("KeyS"), None);
    }

    #[test]
    fn test_click_toggles_pointer_only_after_start() {
        let mut input = InputState::new(600.0);
        input.click(false);
        assert_eq!(input.mode(), ControlMode::Keyboard);
        input.click(true);
        assert_eq!(input.mode(), ControlMode::Pointer);
        input.pointer_move(120.0);
        assert_eq!(input.tick_input().pointer_y, Some(120.0));
        input.click(true);
        assert_eq!(input.mode(), ControlMode::Keyboard);
        assert_eq!(input.tick_input().pointer_y, None);
    }

    #[test]
    fn test_touch_overrides_pointer() {
        let mut input = InputState::new(600.0);
        input.click(true);
        input.touch_start(80.0, false);
        assert_eq!(input.mode(), ControlMode::Touch);
        input.click(true);
        assert_eq!(input.mode(), ControlMode::Touch);
        input.touch_move(90.0, true);
        assert_eq!(input.pointer_y(), 80.0);
        input.touch_move(90.0, false);
        assert_eq!(input.pointer_y(), 90.0);
    }

    #[test]
    fn test_double_tap() {
        let mut input = InputState::new(600.0);
        assert_eq!(input.touch_end(1000.0), None);
        assert_eq!(input.touch_end(1200.0), Some(InputCommand::TogglePause));
        assert_eq!(input.touch_end(2000.0), None);
    }
}
