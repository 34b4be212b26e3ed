//! osu!-style rhythm game core.
//!
//! Circles appear two seconds before their beat with a shrinking approach ring;
//! pressing on a circle near its beat scores by timing tier. The page feeds in
//! pointer events and calls [`Game::tick`] once per animation frame; each tick
//! returns a [`Frame`] describing what to draw.
//!
//! Pointer events are queued and only applied inside `tick`, in arrival order
//! and at their own timestamps, so a frame never sees half-applied input.

pub mod beatmap;
pub mod judge;
pub mod slider;
pub mod timing;

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::GameConfig;
pub use beatmap::{Beatmap, HitObject, Point};
pub use judge::{HitOutcome, JudgementCounts, PlaySession};
pub use slider::{Slider, SliderEvent, SliderState};
pub use timing::{Judgement, PlayClock};

/// Never more than this many circles on screen at once.
pub const MAX_VISIBLE_CIRCLES: usize = 4;
/// Lifetime of a hit / miss popup.
pub const FEEDBACK_TTL_MS: f64 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// Pointer event in playfield coordinates, stamped with song time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputEvent {
    pub kind: PointerKind,
    pub pos: Point,
    pub at_ms: f64,
}

impl InputEvent {
    pub fn down(x: f64, y: f64, at_ms: f64) -> Self {
        Self { kind: PointerKind::Down, pos: Point::new(x, y), at_ms }
    }
    pub fn moved(x: f64, y: f64, at_ms: f64) -> Self {
        Self { kind: PointerKind::Move, pos: Point::new(x, y), at_ms }
    }
    pub fn up(x: f64, y: f64, at_ms: f64) -> Self {
        Self { kind: PointerKind::Up, pos: Point::new(x, y), at_ms }
    }
}

/// Transient "300" / "Miss" popup.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub text: &'static str,
    pub color: &'static str,
    pub pos: Point,
    pub born_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleCircle {
    pub index: usize,
    pub pos: Point,
    pub number: u8,
    pub approach: f64,
    pub alpha: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleSlider {
    pub index: usize,
    pub start: Point,
    pub end: Point,
    pub ball: Point,
    pub progress: f64,
    pub approach: f64,
    pub state: SliderState,
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub now: f64,
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub running: bool,
    pub paused: bool,
    pub radius: f64,
    pub circles: Vec<VisibleCircle>,
    pub sliders: Vec<VisibleSlider>,
    pub feedback: Vec<Feedback>,
}

/// End-of-play summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
    pub score: u32,
    pub max_combo: u32,
    pub counts: JudgementCounts,
    pub sliders_completed: u32,
    pub sliders_abandoned: u32,
}

/// Frame-driven owner of one play: beatmap, sliders, score and pending input.
#[derive(Debug)]
pub struct Game {
    cfg: GameConfig,
    beatmap: Beatmap,
    sliders: Vec<Slider>,
    session: PlaySession,
    inputs: VecDeque<InputEvent>,
    feedback: Vec<Feedback>,
    paused: bool,
}

impl Game {
    pub fn new(cfg: GameConfig) -> Self {
        Self {
            cfg: cfg.sanitized(),
            beatmap: Beatmap::default(),
            sliders: Vec::new(),
            session: PlaySession::default(),
            inputs: VecDeque::new(),
            feedback: Vec::new(),
            paused: false,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    pub fn session(&self) -> &PlaySession {
        &self.session
    }

    pub fn objects(&self) -> &[HitObject] {
        &self.beatmap.objects
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn is_running(&self) -> bool {
        self.session.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Starts a fresh play with a generated beatmap, seeded from the config
    /// when a seed is set.
    pub fn start(&mut self) {
        let mut rng = match self.cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.start_with_rng(&mut rng);
    }

    pub fn start_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let map = beatmap::generate(&self.cfg, rng);
        self.start_with_beatmap(map);
    }

    /// Starts a play over a prebuilt beatmap. Sliders from a previous play
    /// are dropped.
    pub fn start_with_beatmap(&mut self, map: Beatmap) {
        log::info!(
            "play started: {} circles at {} bpm, radius {}",
            map.len(),
            self.cfg.bpm,
            self.cfg.radius
        );
        self.beatmap = map;
        self.sliders.clear();
        self.session = PlaySession::started();
        self.inputs.clear();
        self.feedback.clear();
        self.paused = false;
    }

    /// Adds a slider note to the current play, keeping sliders ordered by start.
    pub fn add_slider(&mut self, slider: Slider) {
        let at = self.sliders.partition_point(|s| s.start_ms <= slider.start_ms);
        self.sliders.insert(at, slider);
    }

    /// Queues a pointer event for the next tick. Dropped while paused or idle.
    pub fn push_input(&mut self, ev: InputEvent) {
        if self.session.running && !self.paused {
            self.inputs.push_back(ev);
        }
    }

    pub fn pause(&mut self) {
        if self.session.running && !self.paused {
            log::info!("play paused at score {}", self.session.score);
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            log::info!("play resumed");
            self.paused = false;
        }
    }

    /// Advances the play to `now`: applies queued input, expires late notes,
    /// ages popups and detects the end of the map.
    pub fn tick(&mut self, now: f64) -> Frame {
        if self.session.running && !self.paused {
            while let Some(ev) = self.inputs.pop_front() {
                self.handle(ev);
            }
            self.expire(now);
            self.feedback.retain(|f| now - f.born_ms < FEEDBACK_TTL_MS);

            if self.session.exhausted(&self.beatmap.objects)
                && self.sliders.iter().all(Slider::is_resolved)
            {
                self.session.running = false;
                log::info!("play finished: {:?}", self.summary());
            }
        }
        self.frame(now)
    }

    pub fn summary(&self) -> Scoreboard {
        let count = |st: SliderState| self.sliders.iter().filter(|s| s.state == st).count() as u32;
        Scoreboard {
            score: self.session.score,
            max_combo: self.session.max_combo,
            counts: self.session.counts,
            sliders_completed: count(SliderState::Completed),
            sliders_abandoned: count(SliderState::Abandoned),
        }
    }

    /// Snapshot for drawing; no state changes.
    pub fn frame(&self, now: f64) -> Frame {
        let window = self.cfg.hit_window_ms;
        let circles = self
            .beatmap
            .objects
            .iter()
            .enumerate()
            .skip(self.session.pending)
            .take_while(|(_, o)| o.time_ms - now <= timing::APPROACH_LEAD_MS)
            .filter(|(_, o)| !timing::is_expired(o.time_ms - now, window))
            .take(MAX_VISIBLE_CIRCLES)
            .map(|(index, o)| {
                let dt = o.time_ms - now;
                VisibleCircle {
                    index,
                    pos: o.pos,
                    number: o.number,
                    approach: timing::approach_scale(dt),
                    alpha: timing::fade_alpha(dt),
                }
            })
            .collect();

        let sliders = self
            .sliders
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.state != SliderState::Completed
                    && now >= s.start_ms - timing::APPROACH_LEAD_MS
                    && now <= s.end_ms + slider::RELEASE_TOLERANCE_MS
            })
            .map(|(index, s)| VisibleSlider {
                index,
                start: s.start,
                end: s.end,
                ball: s.ball(now),
                progress: s.progress(now),
                approach: timing::approach_scale(s.start_ms - now),
                state: s.state,
            })
            .collect();

        Frame {
            now,
            score: self.session.score,
            combo: self.session.combo,
            max_combo: self.session.max_combo,
            running: self.session.running,
            paused: self.paused,
            radius: self.cfg.radius,
            circles,
            sliders,
            feedback: self.feedback.clone(),
        }
    }

    fn handle(&mut self, ev: InputEvent) {
        self.expire(ev.at_ms);
        let r = self.cfg.radius;
        match ev.kind {
            PointerKind::Down => {
                let grabbed = self
                    .sliders
                    .iter_mut()
                    .any(|s| s.pointer_down(ev.pos, ev.at_ms, r) == SliderEvent::Grabbed);
                if grabbed {
                    return;
                }
                let window = self.cfg.hit_window_ms;
                if let Some(out) =
                    self.session.attempt_hit(&self.beatmap.objects, ev.pos, ev.at_ms, r, window)
                {
                    self.popup(out.judgement, out.pos, ev.at_ms);
                }
            }
            PointerKind::Move => {
                for i in 0..self.sliders.len() {
                    let outcome = self.sliders[i].pointer_move(ev.pos, ev.at_ms, r);
                    self.settle_slider(i, outcome, ev.at_ms);
                }
            }
            PointerKind::Up => {
                for i in 0..self.sliders.len() {
                    let outcome = self.sliders[i].pointer_up(ev.pos, ev.at_ms, r);
                    self.settle_slider(i, outcome, ev.at_ms);
                }
            }
        }
    }

    fn expire(&mut self, now: f64) {
        let missed = self
            .session
            .expire(&self.beatmap.objects, now, self.cfg.hit_window_ms);
        for out in missed {
            self.popup(Judgement::Miss, out.pos, now);
        }
        for i in 0..self.sliders.len() {
            let outcome = self.sliders[i].expire(now);
            self.settle_slider(i, outcome, now);
        }
    }

    fn settle_slider(&mut self, index: usize, outcome: SliderEvent, now: f64) {
        let end = self.sliders[index].end;
        match outcome {
            SliderEvent::Completed => {
                self.session.apply_bonus(slider::SLIDER_BONUS);
                self.popup(Judgement::Perfect, end, now);
                log::debug!("slider {index} completed");
            }
            SliderEvent::Abandoned => {
                self.session.break_combo();
                let ball = self.sliders[index].ball(now);
                self.popup(Judgement::Miss, ball, now);
                log::debug!("slider {index} abandoned");
            }
            SliderEvent::Grabbed | SliderEvent::Ignored => {}
        }
    }

    fn popup(&mut self, judgement: Judgement, pos: Point, now: f64) {
        let (text, color) = judgement.label();
        self.feedback.push(Feedback { text, color, pos, born_ms: now });
    }
}
