//! Canvas 2D presenter
//!
//! Draws the arena every frame and forwards the non-canvas callbacks to the
//! DOM (`Hud`) and Web Audio (`AudioManager`).

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::hud::Hud;
use super::shapes::{self, TrailBlob};
use crate::audio::AudioManager;
use crate::consts::PADDLE_CORNER_RADIUS;
use crate::presenter::{BallStats, ControlButtons, Countdown, Presenter, Snapshot, SoundCue};
use crate::sim::{GamePhase, Paddle, Side};

const COUNTDOWN_FONT: &str = "bold 80px 'Arial Black', Gadget, sans-serif";
const PAUSED_FONT: &str = "bold 60px 'Arial Black', Gadget, sans-serif";
const WINNER_FONT: &str = "bold 70px 'Arial Black', Gadget, sans-serif";
const SUBTITLE_FONT: &str = "30px 'Arial', sans-serif";
const LABEL_FONT: &str = "bold 12px Arial";

pub struct CanvasPresenter {
    ctx: CanvasRenderingContext2d,
    hud: Hud,
    audio: AudioManager,
}

impl CanvasPresenter {
    pub fn new(ctx: CanvasRenderingContext2d, hud: Hud, audio: AudioManager) -> Self {
        Self { ctx, hud, audio }
    }

    /// Browsers only start audio from inside a user gesture
    pub fn unlock_audio(&self) {
        self.audio.resume();
    }

    fn clear(&self, width: f64, height: f64) {
        self.ctx.set_fill_style_str(shapes::BACKGROUND);
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn draw_net(&self, width: f64, height: f64) {
        let ctx = &self.ctx;
        let dash = js_sys::Array::of2(&JsValue::from_f64(10.0), &JsValue::from_f64(10.0));
        ctx.begin_path();
        let _ = ctx.set_line_dash(&dash);
        ctx.move_to(width / 2.0, 0.0);
        ctx.line_to(width / 2.0, height);
        ctx.set_stroke_style_str(shapes::NET_COLOR);
        ctx.set_line_width(5.0);
        ctx.stroke();
        let _ = ctx.set_line_dash(&js_sys::Array::new());
    }

    fn rounded_rect_path(&self, x: f64, y: f64, w: f64, h: f64, r: f64) {
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.move_to(x + r, y);
        ctx.line_to(x + w - r, y);
        ctx.quadratic_curve_to(x + w, y, x + w, y + r);
        ctx.line_to(x + w, y + h - r);
        ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
        ctx.line_to(x + r, y + h);
        ctx.quadratic_curve_to(x, y + h, x, y + h - r);
        ctx.line_to(x, y + r);
        ctx.quadratic_curve_to(x, y, x + r, y);
        ctx.close_path();
    }

    fn set_shadow(&self, on: bool) {
        let ctx = &self.ctx;
        if on {
            ctx.set_shadow_color("rgba(0, 0, 0, 0.5)");
            ctx.set_shadow_blur(10.0);
            ctx.set_shadow_offset_x(2.0);
            ctx.set_shadow_offset_y(2.0);
        } else {
            ctx.set_shadow_color("transparent");
            ctx.set_shadow_blur(0.0);
            ctx.set_shadow_offset_x(0.0);
            ctx.set_shadow_offset_y(0.0);
        }
    }

    fn draw_paddle(&self, paddle: &Paddle) {
        let ctx = &self.ctx;
        let (x, y) = (f64::from(paddle.x), f64::from(paddle.y));
        let (w, h) = (f64::from(paddle.width), f64::from(paddle.height));
        let r = f64::from(PADDLE_CORNER_RADIUS);

        self.set_shadow(true);
        ctx.set_fill_style_str(shapes::paddle_color(paddle));
        self.rounded_rect_path(x, y, w, h, r);
        ctx.fill();
        self.set_shadow(false);

        // Volume
        let gradient = ctx.create_linear_gradient(x, y, x + w, y + h);
        let _ = gradient.add_color_stop(0.0, "rgba(255, 255, 255, 0.3)");
        let _ = gradient.add_color_stop(0.5, "rgba(255, 255, 255, 0.1)");
        let _ = gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0.2)");
        ctx.set_fill_style_canvas_gradient(&gradient);
        self.rounded_rect_path(x, y, w, h, r);
        ctx.fill();

        ctx.set_stroke_style_str("rgba(255, 255, 255, 0.4)");
        ctx.set_line_width(2.0);
        self.rounded_rect_path(x, y, w, h, r);
        ctx.stroke();
    }

    fn circle(&self, x: f64, y: f64, r: f64, color: &str) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        let _ = ctx.arc(x, y, r, 0.0, TAU);
        ctx.close_path();
        ctx.fill();
    }

    /// Filled circle with drop shadow and a glossy highlight
    fn glossy_circle(&self, x: f64, y: f64, r: f64, color: &str) {
        let ctx = &self.ctx;
        self.set_shadow(true);
        self.circle(x, y, r, color);
        self.set_shadow(false);
        if r <= 3.0 {
            return;
        }

        if let Ok(gradient) = ctx.create_radial_gradient(x - r * 0.3, y - r * 0.3, r * 0.1, x, y, r) {
            let _ = gradient.add_color_stop(0.0, "rgba(255, 255, 255, 0.8)");
            let _ = gradient.add_color_stop(0.3, "rgba(255, 255, 255, 0.2)");
            let _ = gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0.2)");
            ctx.set_fill_style_canvas_gradient(&gradient);
            ctx.begin_path();
            let _ = ctx.arc(x, y, r, 0.0, TAU);
            ctx.fill();
        }
        self.circle(x - r * 0.25, y - r * 0.25, r * 0.4, "rgba(255, 255, 255, 0.9)");
    }

    fn draw_trail(&self, blobs: &[TrailBlob]) {
        for blob in blobs {
            let ratio = f64::from(blob.ratio);
            let flicker = (rand::random::<f64>() - 0.5) * 2.0;
            for _ in 0..blob.segments {
                let spread = (rand::random::<f64>() - 0.5) * 4.0 * ratio;
                let radius = f64::from(blob.radius) * (0.8 + rand::random::<f64>() * 0.4);
                self.circle(
                    f64::from(blob.pos.x) + flicker + spread,
                    f64::from(blob.pos.y) + flicker + spread,
                    radius,
                    &blob.css,
                );
            }
        }
    }

    fn draw_pickups(&self, snapshot: &Snapshot<'_>) {
        let ctx = &self.ctx;
        for pickup in snapshot.state.spawned_pickups() {
            let (x, y) = (f64::from(pickup.pos.x), f64::from(pickup.pos.y));
            let color = shapes::pickup_color(pickup.kind);
            self.glossy_circle(x, y, f64::from(pickup.radius), color);

            ctx.set_font(LABEL_FONT);
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            ctx.set_stroke_style_str("black");
            ctx.set_line_width(2.0);
            let _ = ctx.stroke_text(pickup.kind.label(), x, y);
            ctx.set_fill_style_str(color);
            let _ = ctx.fill_text(pickup.kind.label(), x, y);
        }
    }

    fn centered_text(&self, text: &str, font: &str, color: &str, x: f64, y: f64) {
        let ctx = &self.ctx;
        ctx.set_font(font);
        ctx.set_fill_style_str(color);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text(text, x, y);
    }

    fn draw_overlays(&self, snapshot: &Snapshot<'_>, width: f64, height: f64) {
        let (cx, cy) = (width / 2.0, height / 2.0);

        if let Some(text) = snapshot.countdown.text() {
            self.centered_text(&text, COUNTDOWN_FONT, "rgba(255, 255, 255, 0.9)", cx, cy);
        }

        if snapshot.show_paused_overlay() {
            self.ctx.set_fill_style_str("rgba(0, 0, 0, 0.7)");
            self.ctx.fill_rect(0.0, 0.0, width, height);
            self.centered_text("PAUSED", PAUSED_FONT, "white", cx, cy);
        }

        if snapshot.phase == GamePhase::GameOver
            && let Some(winner) = snapshot.winner()
        {
            self.ctx.set_fill_style_str("rgba(0, 0, 0, 0.75)");
            self.ctx.fill_rect(0.0, 0.0, width, height);
            let title = format!("{} Win!", winner.name());
            self.centered_text(&title, WINNER_FONT, shapes::side_color(winner), cx, cy - 40.0);
            self.centered_text("Restart to Play Again", SUBTITLE_FONT, "#fffdf5", cx, cy + 40.0);
        }
    }
}

impl Presenter for CanvasPresenter {
    fn draw(&mut self, snapshot: &Snapshot<'_>) {
        let state = snapshot.state;
        let width = f64::from(state.config.arena_width);
        let height = f64::from(state.config.arena_height);

        self.clear(width, height);
        self.draw_net(width, height);
        self.draw_paddle(state.paddle(Side::Player));
        self.draw_paddle(state.paddle(Side::Computer));

        let blobs = shapes::trail_blobs(state.ball.trail.iter().copied(), snapshot.ball_radius);
        self.draw_trail(&blobs);
        self.glossy_circle(
            f64::from(state.ball.pos.x),
            f64::from(state.ball.pos.y),
            f64::from(snapshot.ball_radius),
            shapes::BALL_COLOR,
        );

        self.draw_pickups(snapshot);
        self.draw_overlays(snapshot, width, height);
    }

    fn update_score_display(&mut self, player: u32, computer: u32) {
        self.hud.set_scores(player, computer);
    }

    fn trigger_score_effect(&mut self) {
        self.hud.flash_score();
    }

    fn show_transient_message(&mut self, text: &str, _duration_ms: f64) {
        self.hud.show_message(text);
    }

    fn hide_transient_message(&mut self) {
        self.hud.hide_message();
    }

    fn show_countdown(&mut self, _countdown: Countdown) {
        // Drawn on the canvas from the snapshot
    }

    fn set_control_buttons_state(&mut self, buttons: ControlButtons) {
        self.hud.set_buttons(buttons);
    }

    fn update_ball_stats(&mut self, stats: BallStats) {
        self.hud.set_stats(&stats.text());
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.audio.play(cue);
    }
}
