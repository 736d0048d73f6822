//! Colors and trail geometry for the canvas renderer
//!
//! Pure functions only, so the styling rules are testable off the browser.

use glam::Vec2;

use crate::consts::{TRAIL_LENGTH, TRAIL_MAX_SPEED, TRAIL_MIN_SPEED};
use crate::sim::state::TrailPoint;
use crate::sim::{PADDLE_FLASH_PALETTE_LEN, Paddle, PickupKind, Side};

pub const BACKGROUND: &str = "rgba(30, 76, 100, 0.35)";
pub const NET_COLOR: &str = "#555";
pub const BALL_COLOR: &str = "#ffffff";
pub const PLAYER_COLOR: &str = "#ff6b6b";
pub const COMPUTER_COLOR: &str = "#4ecdc4";

/// Colors a paddle may flash to when hit
pub const FLASH_PALETTE: [&str; PADDLE_FLASH_PALETTE_LEN] = ["#ff6b6b", "#4ecdc4", "#ff9f43", "#0abde3"];

pub fn side_color(side: Side) -> &'static str {
    match side {
        Side::Player => PLAYER_COLOR,
        Side::Computer => COMPUTER_COLOR,
    }
}

/// Flash color while one is set, otherwise the side's own color
pub fn paddle_color(paddle: &Paddle) -> &'static str {
    paddle
        .flash
        .and_then(|i| FLASH_PALETTE.get(i).copied())
        .unwrap_or_else(|| side_color(paddle.side))
}

pub fn pickup_color(kind: PickupKind) -> &'static str {
    match kind {
        PickupKind::SpeedBoost => "#7a9d96",
        PickupKind::BallEnlarge => "#9bc1c1",
        PickupKind::TrajectoryRandomize => "#d4a5a5",
        PickupKind::Drunken => "#c8a5a5",
        PickupKind::PaddleEnlarge => "#a8c8c8",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Fire ramp: white when slow, bright red when fast
const TRAIL_RAMP: [Rgb; 5] = [
    Rgb(255, 255, 255),
    Rgb(255, 255, 200),
    Rgb(255, 200, 100),
    Rgb(255, 100, 50),
    Rgb(255, 50, 0),
];

/// 0 at or below the trail threshold, 1 at full speed
pub fn trail_speed_ratio(speed: f32) -> f32 {
    if speed <= TRAIL_MIN_SPEED {
        return 0.0;
    }
    ((speed - TRAIL_MIN_SPEED) / (TRAIL_MAX_SPEED - TRAIL_MIN_SPEED)).min(1.0)
}

/// Blend along the fire ramp
pub fn trail_color(ratio: f32) -> Rgb {
    let last = TRAIL_RAMP.len() - 1;
    let scaled = ratio.clamp(0.0, 1.0) * last as f32;
    let index = (scaled.floor() as usize).min(last);
    let next = (index + 1).min(last);
    let blend = scaled.fract();

    let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * blend).floor() as u8;
    let (from, to) = (TRAIL_RAMP[index], TRAIL_RAMP[next]);
    Rgb(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// One trail sample ready to draw (the canvas adds flicker on top)
#[derive(Debug, Clone, PartialEq)]
pub struct TrailBlob {
    pub pos: Vec2,
    pub radius: f32,
    pub ratio: f32,
    pub css: String,
    /// Overlapping circles drawn for this sample
    pub segments: u32,
}

/// Turn the recorded trail into blobs, oldest first.
///
/// Older samples fade and shrink; faster samples stay visible for longer.
pub fn trail_blobs(trail: impl ExactSizeIterator<Item = TrailPoint>, ball_radius: f32) -> Vec<TrailBlob> {
    let len = trail.len();
    trail
        .enumerate()
        .filter_map(|(i, point)| {
            let age = (len - i) as f32;
            let opacity = 1.0 - age / TRAIL_LENGTH as f32;
            let ratio = trail_speed_ratio(point.speed);
            let visible = (TRAIL_LENGTH as f32 * (0.5 + ratio * 0.5)).floor();
            let radius = ball_radius * (1.0 - age / (visible * 1.2));
            if radius < 1.0 {
                return None;
            }
            let Rgb(r, g, b) = trail_color(ratio);
            Some(TrailBlob {
                pos: point.pos,
                radius,
                ratio,
                css: format!("rgba({r}, {g}, {b}, {:.3})", (opacity * 0.8).max(0.0)),
                segments: (3.0 + ratio * 2.0).floor() as u32,
            })
        })
        .collect()
}
