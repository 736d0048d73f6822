//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::presenter::SoundCue;

const MASTER_VOLUME: f32 = 0.8;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: MASTER_VOLUME,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Play a sound cue
    pub fn play(&self, cue: SoundCue) {
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let vol = self.volume;
        match cue {
            SoundCue::PaddleHit => self.play_paddle_hit(ctx, vol),
            SoundCue::WallHit => self.play_wall_hit(ctx, vol),
            SoundCue::Score => self.play_score(ctx, vol),
            SoundCue::PickupCollect => self.play_pickup(ctx, vol),
            SoundCue::GameOver => self.play_game_over(ctx, vol),
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Paddle hit - solid thump
    fn play_paddle_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(110.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.12).ok();
    }

    /// Wall hit - short ping
    fn play_wall_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 440.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.08)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Point scored - two rising notes
    fn play_score(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [523.0, 784.0].iter().enumerate() {
            let delay = i as f64 * 0.12;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.3).ok();
            }
        }
    }

    /// Pickup collect - upward chirp with a fifth on top
    fn play_pickup(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        for (base, level) in [(660.0_f32, 0.22), (990.0, 0.1)] {
            let Some((osc, gain)) = self.create_osc(ctx, base, OscillatorType::Sine) else {
                continue;
            };
            osc.frequency().set_value_at_time(base, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(base * 2.0, t + 0.18)
                .ok();
            gain.gain().set_value_at_time(0.001, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(vol * level, t + 0.03)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.28)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }
    }

    /// Match over - long sliding sawtooth
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 330.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(330.0, t).ok();
        osc.frequency()
            .linear_ramp_to_value_at_time(82.0, t + 1.1)
            .ok();
        gain.gain().set_value_at_time(vol * 0.18, t).ok();
        gain.gain()
            .set_value_at_time(vol * 0.18, t + 0.7)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.001, t + 1.2)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 1.25).ok();
    }
}
