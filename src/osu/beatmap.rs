//! Beatmap generation: one circle per beat, scattered over the playfield so
//! that consecutive circles neither overlap nor line up.
//!
//! Placement only looks back at the last [`LOOKBACK`] circles. Older circles
//! can still end up under newer ones; widening the window changes how dense
//! a map feels, so it stays at four.

use rand::Rng;
use serde::Serialize;

use crate::config::GameConfig;

/// Number of previously placed circles a new candidate is checked against.
pub const LOOKBACK: usize = 4;
/// Attempts per beat before the last candidate is taken as-is.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 200;
/// Min center distance, in radii.
pub const MIN_SPACING: f64 = 2.2;
/// Min distance from the path between earlier circles, in radii.
pub const MIN_PATH_CLEARANCE: f64 = 1.5;
/// Combo numbers run 1..=6 and wrap.
pub const NUMBER_CYCLE: usize = 6;

// --- Geometry ---------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation, `t` in [0, 1].
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// Shortest distance from `p` to the segment `a`-`b`.
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(a.lerp(b, t))
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// True when segments `p1`-`p2` and `q1`-`q2` cross at a single interior point.
/// Touching endpoints and colinear overlap do not count.
pub fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

// --- Hit objects ------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitObject {
    pub time_ms: f64,
    pub pos: Point,
    /// Combo number shown inside the circle.
    pub number: u8,
}

/// Combo number for the `index`-th circle.
pub fn sequence_number(index: usize) -> u8 {
    (index % NUMBER_CYCLE) as u8 + 1
}

#[derive(Clone, Debug, Default)]
pub struct Beatmap {
    pub objects: Vec<HitObject>,
    /// Beats whose position was accepted after running out of attempts.
    pub capped_beats: usize,
}

impl Beatmap {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Checks a candidate against the recent placement window (oldest first).
pub fn placement_ok(candidate: Point, recent: &[Point], radius: f64) -> bool {
    let min_spacing = MIN_SPACING * radius;
    if recent.iter().any(|p| p.distance(candidate) < min_spacing) {
        return false;
    }

    let min_clearance = MIN_PATH_CLEARANCE * radius;
    for pair in recent.windows(2) {
        if segment_distance(candidate, pair[0], pair[1]) < min_clearance {
            return false;
        }
    }

    // New path segment must not cut through earlier ones. The segment ending at
    // the last point shares an endpoint with the new one and is skipped.
    if let Some(&last) = recent.last() {
        let n = recent.len();
        for pair in recent.windows(2).take(n.saturating_sub(2)) {
            if segments_cross(last, candidate, pair[0], pair[1]) {
                return false;
            }
        }
    }
    true
}

/// Draws up to [`MAX_PLACEMENT_ATTEMPTS`] candidates inside `bounds` and
/// returns the first acceptable one. The bool is `false` when the cap was hit
/// and the final candidate was taken regardless.
pub fn place_next<R: Rng + ?Sized>(
    rng: &mut R,
    recent: &[Point],
    bounds: (Point, Point),
    radius: f64,
) -> (Point, bool) {
    let (lo, hi) = bounds;
    let mut candidate = lo;
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        candidate = Point::new(sample(rng, lo.x, hi.x), sample(rng, lo.y, hi.y));
        if placement_ok(candidate, recent, radius) {
            return (candidate, true);
        }
    }
    (candidate, false)
}

fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

/// Builds the full beatmap for one play. `cfg` is expected to be sanitized.
pub fn generate<R: Rng + ?Sized>(cfg: &GameConfig, rng: &mut R) -> Beatmap {
    let count = cfg.beat_count();
    let interval = cfg.interval_ms();
    let r = cfg.radius;
    let bounds = (Point::new(r, r), Point::new(cfg.width - r, cfg.height - r));

    let mut objects: Vec<HitObject> = Vec::with_capacity(count);
    let mut capped_beats = 0;
    for i in 0..count {
        let start = objects.len().saturating_sub(LOOKBACK);
        let recent: Vec<Point> = objects[start..].iter().map(|o| o.pos).collect();
        let (pos, satisfied) = place_next(rng, &recent, bounds, r);
        if !satisfied {
            capped_beats += 1;
        }
        objects.push(HitObject {
            time_ms: cfg.base_offset_ms + i as f64 * interval,
            pos,
            number: sequence_number(i),
        });
    }

    if capped_beats > 0 {
        log::warn!("beatmap placement gave up on {capped_beats} of {count} beats");
    }
    log::debug!("generated beatmap: {count} circles, {interval} ms apart");
    Beatmap { objects, capped_beats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sequence_numbers_wrap_after_six() {
        let nums: Vec<u8> = (0..8).map(sequence_number).collect();
        assert_eq!(nums, vec![1, 2, 3, 4, 5, 6, 1, 2]);
    }

    #[test]
    fn segment_distance_projects_and_clamps() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(segment_distance(Point::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(segment_distance(Point::new(-4.0, 3.0), a, b), 5.0);
        assert_eq!(segment_distance(Point::new(1.0, 1.0), a, a), 2f64.sqrt());
    }

    #[test]
    fn crossing_needs_interior_intersection() {
        let o = Point::new(0.0, 0.0);
        assert!(segments_cross(o, Point::new(10.0, 10.0), Point::new(0.0, 10.0), Point::new(10.0, 0.0)));
        // shared endpoint
        assert!(!segments_cross(o, Point::new(10.0, 0.0), o, Point::new(0.0, 10.0)));
        // parallel
        assert!(!segments_cross(o, Point::new(10.0, 0.0), Point::new(0.0, 1.0), Point::new(10.0, 1.0)));
    }

    #[test]
    fn placement_rejects_near_and_colinear_candidates() {
        let r = 50.0;
        let recent = [Point::new(100.0, 100.0), Point::new(400.0, 100.0)];
        // too close to the last circle
        assert!(!placement_ok(Point::new(450.0, 100.0), &recent, r));
        // right on the path between the two circles
        assert!(!placement_ok(Point::new(250.0, 120.0), &recent, r));
        assert!(placement_ok(Point::new(250.0, 400.0), &recent, r));
    }

    #[test]
    fn placement_rejects_crossing_paths() {
        let r = 10.0;
        let recent = [
            Point::new(0.0, 200.0),
            Point::new(400.0, 200.0),
            Point::new(200.0, 0.0),
        ];
        // from (200,0) straight down crosses the first segment
        assert!(!placement_ok(Point::new(200.0, 400.0), &recent, r));
        assert!(placement_ok(Point::new(100.0, 50.0), &recent, r));
    }

    #[test]
    fn generated_times_follow_the_tempo() {
        let cfg = GameConfig { bpm: 120.0, duration_secs: 10.0, ..GameConfig::default() };
        let map = generate(&cfg, &mut StdRng::seed_from_u64(7));
        assert_eq!(map.len(), 20);
        for (i, o) in map.objects.iter().enumerate() {
            assert_eq!(o.time_ms, 1000.0 + i as f64 * 500.0);
            assert_eq!(o.number, sequence_number(i));
        }
    }

    #[test]
    fn generated_positions_stay_inside_the_inset_playfield() {
        let cfg = GameConfig { duration_secs: 60.0, ..GameConfig::default() };
        let map = generate(&cfg, &mut StdRng::seed_from_u64(99));
        for o in &map.objects {
            assert!(o.pos.x >= cfg.radius && o.pos.x <= cfg.width - cfg.radius);
            assert!(o.pos.y >= cfg.radius && o.pos.y <= cfg.height - cfg.radius);
        }
    }

    #[test]
    fn tiny_playfield_exhausts_attempts_without_failing() {
        let cfg = GameConfig {
            width: 120.0,
            height: 120.0,
            radius: 50.0,
            duration_secs: 5.0,
            ..GameConfig::default()
        };
        let map = generate(&cfg, &mut StdRng::seed_from_u64(1));
        assert_eq!(map.len(), 5);
        // every beat after the first has nowhere legal to go
        assert_eq!(map.capped_beats, 4);
    }
}
