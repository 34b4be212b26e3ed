//! Rhythm game configuration.
//!
//! Every field is a plain number so the page can hand over a partial JS object
//! (`{ bpm: 140 }`) and let the rest fall back to [`GameConfig::default`].
//! Nothing here fails: out-of-range values are clamped by [`GameConfig::sanitized`].

use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;
pub const DEFAULT_RADIUS: f64 = 50.0;
/// Max |dt| in ms at which a hit attempt still registers.
pub const DEFAULT_HIT_WINDOW_MS: f64 = 300.0;
/// First circle lands one second into the song.
pub const DEFAULT_BASE_OFFSET_MS: f64 = 1000.0;
pub const DEFAULT_BPM: f64 = 60.0;
/// Used when the song length is unknown (audio metadata not loaded yet).
pub const DEFAULT_DURATION_SECS: f64 = 110.0;

const BPM_RANGE: (f64, f64) = (30.0, 400.0);
const HIT_WINDOW_RANGE: (f64, f64) = (1.0, 1000.0);
const MIN_RADIUS: f64 = 4.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    pub hit_window_ms: f64,
    pub base_offset_ms: f64,
    pub bpm: f64,
    pub duration_secs: f64,
    /// Fixed seed for reproducible beatmaps; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            radius: DEFAULT_RADIUS,
            hit_window_ms: DEFAULT_HIT_WINDOW_MS,
            base_offset_ms: DEFAULT_BASE_OFFSET_MS,
            bpm: DEFAULT_BPM,
            duration_secs: DEFAULT_DURATION_SECS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Clamp / default every field into a playable range.
    pub fn sanitized(&self) -> Self {
        let width = positive_or(self.width, DEFAULT_WIDTH);
        let height = positive_or(self.height, DEFAULT_HEIGHT);
        let max_radius = (width.min(height) / 2.0).max(MIN_RADIUS);
        let radius = positive_or(self.radius, DEFAULT_RADIUS).clamp(MIN_RADIUS, max_radius);
        let bpm = positive_or(self.bpm, DEFAULT_BPM).clamp(BPM_RANGE.0, BPM_RANGE.1);
        let hit_window_ms = positive_or(self.hit_window_ms, DEFAULT_HIT_WINDOW_MS)
            .clamp(HIT_WINDOW_RANGE.0, HIT_WINDOW_RANGE.1);
        let duration_secs = positive_or(self.duration_secs, DEFAULT_DURATION_SECS);
        let base_offset_ms = if self.base_offset_ms.is_finite() {
            self.base_offset_ms.max(0.0)
        } else {
            DEFAULT_BASE_OFFSET_MS
        };

        let out = Self {
            width,
            height,
            radius,
            hit_window_ms,
            base_offset_ms,
            bpm,
            duration_secs,
            seed: self.seed,
        };
        if out != *self {
            log::warn!("game config adjusted: {:?} -> {:?}", self, out);
        }
        out
    }

    /// Beat spacing in whole milliseconds.
    pub fn interval_ms(&self) -> f64 {
        (60_000.0 / self.bpm).round()
    }

    /// Number of beats that fit in the song.
    pub fn beat_count(&self) -> usize {
        (self.duration_secs * self.bpm / 60.0).floor().max(0.0) as usize
    }
}

fn positive_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { fallback }
}
