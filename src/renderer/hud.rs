//! DOM side of the presenter: score, buttons, pickup message, ball stats
//!
//! Every element is optional. A page without one of them still plays; the
//! missing piece is logged once at startup and skipped afterwards.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement};

use crate::presenter::{ButtonState, ControlButtons};

/// How long the score flash CSS class stays on (ms)
const SCORE_EFFECT_MS: i32 = 500;
const SCORE_EFFECT_CLASS: &str = "score-effect";

pub const START_BUTTON_ID: &str = "startButton";
pub const PAUSE_BUTTON_ID: &str = "pauseButton";
pub const RESTART_BUTTON_ID: &str = "restartButton";

pub struct Hud {
    player_score: Option<Element>,
    computer_score: Option<Element>,
    message: Option<HtmlElement>,
    stats: Option<HtmlElement>,
    start: Option<HtmlButtonElement>,
    pause: Option<HtmlButtonElement>,
    restart: Option<HtmlButtonElement>,
    container: Option<Element>,
    score_panel: Option<Element>,
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    let found = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok());
    if found.is_none() {
        log::warn!("Element #{} missing, skipping it", id);
    }
    found
}

fn by_selector(document: &Document, selector: &str) -> Option<Element> {
    let found = document.query_selector(selector).ok().flatten();
    if found.is_none() {
        log::warn!("Element {} missing, skipping it", selector);
    }
    found
}

impl Hud {
    pub fn new(document: &Document) -> Self {
        Self {
            player_score: by_id(document, "player-score"),
            computer_score: by_id(document, "computer-score"),
            message: by_id(document, "pickupMessage"),
            stats: by_id(document, "ballStats"),
            start: by_id(document, START_BUTTON_ID),
            pause: by_id(document, PAUSE_BUTTON_ID),
            restart: by_id(document, RESTART_BUTTON_ID),
            container: by_selector(document, ".game-container"),
            score_panel: by_selector(document, ".score"),
        }
    }

    pub fn set_scores(&self, player: u32, computer: u32) {
        if let Some(el) = &self.player_score {
            el.set_text_content(Some(&player.to_string()));
        }
        if let Some(el) = &self.computer_score {
            el.set_text_content(Some(&computer.to_string()));
        }
    }

    /// Add the flash class to the arena and score panel, drop it again shortly after
    pub fn flash_score(&self) {
        let targets: Vec<Element> = [&self.container, &self.score_panel]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        for el in &targets {
            let _ = el.class_list().add_1(SCORE_EFFECT_CLASS);
        }

        let Some(window) = web_sys::window() else { return };
        let clear = Closure::once_into_js(move || {
            for el in &targets {
                let _ = el.class_list().remove_1(SCORE_EFFECT_CLASS);
            }
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            clear.unchecked_ref(),
            SCORE_EFFECT_MS,
        );
    }

    pub fn show_message(&self, text: &str) {
        if let Some(el) = &self.message {
            el.set_text_content(Some(text));
            let _ = el.style().set_property("opacity", "1");
        }
    }

    pub fn hide_message(&self) {
        if let Some(el) = &self.message {
            let _ = el.style().set_property("opacity", "0");
        }
    }

    pub fn set_stats(&self, text: &str) {
        if let Some(el) = &self.stats {
            el.set_inner_text(text);
        }
    }

    pub fn set_buttons(&self, buttons: ControlButtons) {
        apply_button(self.start.as_ref(), buttons.start);
        apply_button(self.pause.as_ref(), buttons.pause);
        apply_button(self.restart.as_ref(), buttons.restart);
        if let Some(pause) = &self.pause {
            let label = if buttons.pause_shows_resume {
                "Resume (Space)"
            } else {
                "Pause (Space)"
            };
            pause.set_text_content(Some(label));
        }
    }
}

fn apply_button(button: Option<&HtmlButtonElement>, state: ButtonState) {
    let Some(button) = button else { return };
    let display = match state {
        ButtonState::Hidden => "none",
        ButtonState::Enabled | ButtonState::Disabled => "inline-block",
    };
    let _ = button.style().set_property("display", display);
    button.set_disabled(state == ButtonState::Disabled);
}
