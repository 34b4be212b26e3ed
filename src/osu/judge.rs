//! Hit judgement and the per-play score state.

use serde::Serialize;

use super::beatmap::{HitObject, Point};
use super::timing::{Judgement, is_expired};

/// Tally of judgements for the end-of-play scoreboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct JudgementCounts {
    pub perfect: u32,
    pub good: u32,
    pub ok: u32,
    pub miss: u32,
}

impl JudgementCounts {
    fn record(&mut self, j: Judgement) {
        match j {
            Judgement::Perfect => self.perfect += 1,
            Judgement::Good => self.good += 1,
            Judgement::Ok => self.ok += 1,
            Judgement::Miss => self.miss += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.perfect + self.good + self.ok + self.miss
    }
}

/// What happened to the circle at the head of the queue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitOutcome {
    pub index: usize,
    pub judgement: Judgement,
    pub pos: Point,
}

/// Score state for one play. Reset by constructing a new one at game start.
#[derive(Clone, Debug, Default)]
pub struct PlaySession {
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub running: bool,
    /// Index of the next unresolved circle. Only ever moves forward.
    pub pending: usize,
    pub counts: JudgementCounts,
}

impl PlaySession {
    pub fn started() -> Self {
        Self { running: true, ..Self::default() }
    }

    pub fn exhausted(&self, objects: &[HitObject]) -> bool {
        self.pending >= objects.len()
    }

    /// Adds a hit of the given tier (or a miss) to score and combo.
    pub fn apply(&mut self, judgement: Judgement) {
        self.counts.record(judgement);
        if judgement.is_hit() {
            self.score += judgement.points();
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        } else {
            self.combo = 0;
        }
    }

    /// Adds a fixed bonus that counts toward combo (completed sliders).
    pub fn apply_bonus(&mut self, points: u32) {
        self.score += points;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
    }

    pub fn break_combo(&mut self) {
        self.combo = 0;
    }

    /// Judges a pointer-down at `pos` against the next pending circle.
    ///
    /// Returns `None` when nothing is pending or the play is not running.
    /// A press outside the circle or outside the window is a miss and the
    /// circle is gone for good.
    pub fn attempt_hit(
        &mut self,
        objects: &[HitObject],
        pos: Point,
        now: f64,
        radius: f64,
        window_ms: f64,
    ) -> Option<HitOutcome> {
        if !self.running {
            return None;
        }
        let index = self.pending;
        let obj = objects.get(index)?;
        let dt = obj.time_ms - now;
        let judgement = if pos.distance(obj.pos) <= radius {
            Judgement::from_offset(dt, window_ms)
        } else {
            Judgement::Miss
        };
        self.apply(judgement);
        self.pending += 1;
        log::debug!("circle {index} judged {judgement:?} (dt {dt:.1} ms)");
        Some(HitOutcome { index, judgement, pos: obj.pos })
    }

    /// Resolves every pending circle that is now past its window as a miss.
    pub fn expire(&mut self, objects: &[HitObject], now: f64, window_ms: f64) -> Vec<HitOutcome> {
        let mut missed = Vec::new();
        if !self.running {
            return missed;
        }
        while let Some(obj) = objects.get(self.pending) {
            if !is_expired(obj.time_ms - now, window_ms) {
                break;
            }
            self.apply(Judgement::Miss);
            missed.push(HitOutcome { index: self.pending, judgement: Judgement::Miss, pos: obj.pos });
            self.pending += 1;
        }
        missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: f64 = 50.0;
    const W: f64 = 300.0;

    fn circles(n: usize) -> Vec<HitObject> {
        (0..n)
            .map(|i| HitObject {
                time_ms: 1000.0 + i as f64 * 1000.0,
                pos: Point::new(100.0 + i as f64 * 120.0, 200.0),
                number: (i % 6) as u8 + 1,
            })
            .collect()
    }

    #[test]
    fn hit_tiers_depend_on_offset_only_when_on_target() {
        let objs = circles(1);
        for (offset, points) in [(50.0, 300), (150.0, 150), (250.0, 50), (350.0, 0)] {
            let mut s = PlaySession::started();
            let out = s.attempt_hit(&objs, objs[0].pos, 1000.0 + offset, R, W).unwrap();
            assert_eq!(out.judgement.points(), points);
            assert_eq!(s.score, points);
            assert_eq!(s.pending, 1);
        }
    }

    #[test]
    fn off_target_press_is_a_miss_and_discards_the_circle() {
        let objs = circles(2);
        let mut s = PlaySession::started();
        s.apply(Judgement::Perfect);
        let out = s.attempt_hit(&objs, Point::new(0.0, 0.0), 1000.0, R, W).unwrap();
        assert_eq!(out.judgement, Judgement::Miss);
        assert_eq!(s.combo, 0);
        assert_eq!(s.pending, 1);
    }

    #[test]
    fn press_when_idle_or_exhausted_is_ignored() {
        let objs = circles(1);
        let mut s = PlaySession::default();
        assert!(s.attempt_hit(&objs, objs[0].pos, 1000.0, R, W).is_none());

        let mut s = PlaySession::started();
        s.pending = 1;
        assert!(s.attempt_hit(&objs, objs[0].pos, 1000.0, R, W).is_none());
        assert_eq!(s.counts.total(), 0);
    }

    #[test]
    fn combo_resets_and_max_combo_remembers() {
        for n in 0..5u32 {
            let mut s = PlaySession::started();
            for _ in 0..n {
                s.apply(Judgement::Good);
            }
            s.apply(Judgement::Miss);
            assert_eq!(s.combo, 0);
            assert_eq!(s.max_combo, n);
        }
    }

    #[test]
    fn expiry_walks_the_cursor_forward() {
        let objs = circles(3);
        let mut s = PlaySession::started();
        s.apply(Judgement::Perfect);
        assert!(s.expire(&objs, 1300.0, W).is_empty());

        let missed = s.expire(&objs, 2301.0, W);
        assert_eq!(missed.len(), 2);
        assert_eq!(missed[1].index, 1);
        assert_eq!(s.pending, 2);
        assert_eq!(s.combo, 0);
        assert_eq!(s.counts.miss, 2);
    }
}
