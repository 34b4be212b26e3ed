//! Time model: approach-circle scale, judgement tiers and the play clock.
//!
//! All times are milliseconds. `dt` is always `scheduled - now`, so it is
//! positive while a circle is still approaching and negative once it is late.

use serde::Serialize;

/// How far ahead of its time a circle becomes visible.
pub const APPROACH_LEAD_MS: f64 = 2000.0;
/// Approach ring size (in radii) at the moment a circle appears.
pub const APPROACH_MAX_SCALE: f64 = 2.5;

/// Outer ring scale: shrinks linearly from 2.5x at 2000 ms out to 1x at 0,
/// flat outside that range.
pub fn approach_scale(dt: f64) -> f64 {
    (1.0 + (dt / APPROACH_LEAD_MS) * (APPROACH_MAX_SCALE - 1.0)).clamp(1.0, APPROACH_MAX_SCALE)
}

/// Circle opacity, fading in on approach and out after its time.
pub fn fade_alpha(dt: f64) -> f64 {
    (1.0 - dt.abs() / APPROACH_LEAD_MS).clamp(0.0, 1.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Judgement {
    Perfect,
    Good,
    Ok,
    Miss,
}

impl Judgement {
    pub const PERFECT_MS: f64 = 100.0;
    pub const GOOD_MS: f64 = 180.0;
    pub const OK_MS: f64 = 300.0;

    /// Tier for a hit attempt `offset_ms` away from the circle's time
    /// (sign ignored), with nothing beyond `window_ms` counting.
    pub fn from_offset(offset_ms: f64, window_ms: f64) -> Judgement {
        let off = offset_ms.abs();
        if off > window_ms || off.is_nan() {
            Judgement::Miss
        } else if off <= Self::PERFECT_MS {
            Judgement::Perfect
        } else if off <= Self::GOOD_MS {
            Judgement::Good
        } else if off <= Self::OK_MS {
            Judgement::Ok
        } else {
            Judgement::Miss
        }
    }

    pub fn points(self) -> u32 {
        match self {
            Judgement::Perfect => 300,
            Judgement::Good => 150,
            Judgement::Ok => 50,
            Judgement::Miss => 0,
        }
    }

    pub fn is_hit(self) -> bool {
        self != Judgement::Miss
    }

    /// Popup text and colour for the hit burst.
    pub fn label(self) -> (&'static str, &'static str) {
        match self {
            Judgement::Perfect => ("300", "#66ccff"),
            Judgement::Good => ("150", "#88ff88"),
            Judgement::Ok => ("50", "#ffcc44"),
            Judgement::Miss => ("Miss", "#ff4444"),
        }
    }
}

/// A circle left unhit this long past its time is a miss.
pub fn is_expired(dt: f64, window_ms: f64) -> bool {
    -dt > window_ms
}

// --- Play clock -------------------------------------------------------------

/// Maps wall-clock time (`performance.now()`) to song time, with pause/resume.
///
/// An audio playback position, when available, always wins over wall time.
#[derive(Clone, Debug, Default)]
pub struct PlayClock {
    /// Wall time corresponding to song time 0.
    start_ms: f64,
    /// Wall time at which the current pause began.
    paused_at: Option<f64>,
}

impl PlayClock {
    pub fn new(wall_ms: f64) -> Self {
        Self { start_ms: wall_ms, paused_at: None }
    }

    /// Song time in ms. `audio_ms` is the media element position, if playing.
    pub fn now(&self, wall_ms: f64, audio_ms: Option<f64>) -> f64 {
        match audio_ms {
            Some(a) if a.is_finite() => a,
            _ => self.paused_at.unwrap_or(wall_ms) - self.start_ms,
        }
    }

    pub fn paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self, wall_ms: f64) {
        if self.paused_at.is_none() {
            self.paused_at = Some(wall_ms);
        }
    }

    /// Shifts the anchor by the time spent paused.
    pub fn resume(&mut self, wall_ms: f64) {
        if let Some(at) = self.paused_at.take() {
            self.start_ms += wall_ms - at;
        }
    }

    pub fn reset(&mut self, wall_ms: f64) {
        self.start_ms = wall_ms;
        self.paused_at = None;
    }
}
