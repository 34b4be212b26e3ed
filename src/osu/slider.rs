//! Slider notes: press on the start circle, follow the ball to the end
//! circle, release on time.

use serde::Serialize;

use super::beatmap::Point;

/// Fixed award for a completed slider.
pub const SLIDER_BONUS: u32 = 300;
/// Release tolerance around the slider's end time.
pub const RELEASE_TOLERANCE_MS: f64 = 200.0;
/// How far (in radii) the pointer may stray from the ball while holding.
pub const FOLLOW_TOLERANCE: f64 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SliderState {
    Idle,
    Held,
    Completed,
    Abandoned,
}

/// Result of feeding one pointer event to a slider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliderEvent {
    /// Event did not apply to this slider.
    Ignored,
    Grabbed,
    Completed,
    Abandoned,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slider {
    pub start_ms: f64,
    pub end_ms: f64,
    pub start: Point,
    pub end: Point,
    pub state: SliderState,
}

impl Slider {
    pub fn new(start_ms: f64, end_ms: f64, start: Point, end: Point) -> Self {
        Self { start_ms, end_ms: end_ms.max(start_ms), start, end, state: SliderState::Idle }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, SliderState::Completed | SliderState::Abandoned)
    }

    /// Fraction of the path travelled at `now`, clamped to [0, 1].
    pub fn progress(&self, now: f64) -> f64 {
        let span = self.end_ms - self.start_ms;
        if span <= 0.0 {
            return 1.0;
        }
        ((now - self.start_ms) / span).clamp(0.0, 1.0)
    }

    /// Where the follow ball sits at `now`.
    pub fn ball(&self, now: f64) -> Point {
        self.start.lerp(self.end, self.progress(now))
    }

    /// Idle -> Held when pressed on the start circle during the slider's span.
    pub fn pointer_down(&mut self, pos: Point, now: f64, radius: f64) -> SliderEvent {
        if self.state != SliderState::Idle {
            return SliderEvent::Ignored;
        }
        let in_span = now >= self.start_ms && now <= self.end_ms;
        if in_span && pos.distance(self.start) <= radius {
            self.state = SliderState::Held;
            SliderEvent::Grabbed
        } else {
            SliderEvent::Ignored
        }
    }

    /// Held -> Abandoned when the pointer strays too far from the ball.
    pub fn pointer_move(&mut self, pos: Point, now: f64, radius: f64) -> SliderEvent {
        if self.state != SliderState::Held {
            return SliderEvent::Ignored;
        }
        if pos.distance(self.ball(now)) > FOLLOW_TOLERANCE * radius {
            self.state = SliderState::Abandoned;
            SliderEvent::Abandoned
        } else {
            SliderEvent::Ignored
        }
    }

    /// Held -> Completed on a timely release over the end circle, otherwise
    /// Held -> Abandoned.
    pub fn pointer_up(&mut self, pos: Point, now: f64, radius: f64) -> SliderEvent {
        if self.state != SliderState::Held {
            return SliderEvent::Ignored;
        }
        let on_time = (now - self.end_ms).abs() <= RELEASE_TOLERANCE_MS;
        if on_time && pos.distance(self.end) <= radius {
            self.state = SliderState::Completed;
            SliderEvent::Completed
        } else {
            self.state = SliderState::Abandoned;
            SliderEvent::Abandoned
        }
    }

    /// Gives up on a slider nobody finished before the release window closed.
    pub fn expire(&mut self, now: f64) -> SliderEvent {
        if self.is_resolved() || now <= self.end_ms + RELEASE_TOLERANCE_MS {
            return SliderEvent::Ignored;
        }
        self.state = SliderState::Abandoned;
        SliderEvent::Abandoned
    }
}
