#![forbid(unsafe_code)]

//! Noise-displaced polylines with branch children.
//!
//! A [`NoiseLine`] smooths a control polygon with Catmull-Rom and pushes each
//! dense point along its normal by a Perlin sample. The line owns its
//! children; each child carves a window out of the parent's current points
//! and grows its own smaller, independently displaced branch there.
//!
//! Children never point back at their parent. The parent lends its points to
//! each child during [`NoiseLine::update`], so a child cannot outlive the data
//! it reads.
//!
//! # Displacement
//!
//! For point `i` of `n`, with range `R` and amplitude `a`:
//!
//! ```text
//! env = sin(pi * i / (n - 1))
//! s1  = noise(i / base - offset, offset)
//! s2  = noise(j / base + offset, offset)   // j = i (open), min(i, n-1-i) (closed)
//! open:   av = R * a * 0.5 * (s1 + s2) * env
//! closed: av = R * a * 0.5 * (s1 * env + s2 * (1 - env))
//! ```
//!
//! so `|av| <= R * a`, open ends pin to the polygon, and a closed curve meets
//! itself at the seam.

use std::f64::consts::PI;
use std::time::Duration;

use cardfx_core::{Point, PerlinNoise, Xorshift, polyline_length, spline_into};
use serde::{Deserialize, Serialize};

/// Default upper bound of the randomized window re-roll interval.
pub const DEFAULT_MAX_INTERVAL_MS: f64 = 2000.0;

/// Noise shaping for a line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseOptions {
    /// Points per noise lattice cell along the line.
    pub base: f64,
    /// Displacement as a fraction of the line's range.
    pub amplitude: f64,
    /// Phase advance per frame.
    pub speed: f64,
    /// Phase accumulator.
    #[serde(skip)]
    pub offset: f64,
}

impl Default for NoiseOptions {
    fn default() -> Self {
        Self {
            base: 30.0,
            amplitude: 0.5,
            speed: 0.002,
            offset: 0.0,
        }
    }
}

/// Write displaced `base` points into `out`.
fn displace(
    base: &[Point],
    out: &mut Vec<Point>,
    noise: &PerlinNoise,
    opts: &NoiseOptions,
    range: f64,
    closed: bool,
) {
    out.clear();
    let n = base.len();
    if n == 0 {
        return;
    }
    let lattice = if opts.base > 0.0 { opts.base } else { 1.0 };
    let scale = range * opts.amplitude * 0.5;
    let off = opts.offset;
    let last = (n - 1).max(1) as f64;

    out.reserve(n);
    for (i, &p) in base.iter().enumerate() {
        let next = base[(i + 1) % n];
        let theta = p.angle_to(next);
        let env = if n > 1 { (PI * i as f64 / last).sin() } else { 0.0 };
        let s1 = noise.noise2d(i as f64 / lattice - off, off);
        let j = if closed { i.min(n - 1 - i) } else { i };
        let s2 = noise.noise2d(j as f64 / lattice + off, off);
        let av = if closed {
            scale * (s1 * env + s2 * (1.0 - env))
        } else {
            scale * (s1 + s2) * env
        };
        out.push(Point::new(p.x - theta.sin() * av, p.y + theta.cos() * av));
    }
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

/// Handle to a child owned by a [`NoiseLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildId(usize);

impl ChildId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A branch drawn over a window `[start_step, end_step)` of its parent.
#[derive(Debug, Clone)]
pub struct ChildLine {
    options: NoiseOptions,
    noise: PerlinNoise,
    rng: Xorshift,
    start_step: usize,
    end_step: usize,
    last_change: Option<Duration>,
    max_interval_ms: f64,
    controls: [Point; 3],
    base: Vec<Point>,
    points: Vec<Point>,
}

impl ChildLine {
    fn new(options: NoiseOptions, seed: u32) -> Self {
        Self {
            options,
            noise: PerlinNoise::new(seed),
            rng: Xorshift::new(seed.rotate_left(16) ^ 0x5bd1_e995),
            start_step: 0,
            end_step: 0,
            last_change: None,
            max_interval_ms: DEFAULT_MAX_INTERVAL_MS,
            controls: [Point::ORIGIN; 3],
            base: Vec::new(),
            points: Vec::new(),
        }
    }

    /// Current window into the parent's points.
    #[must_use]
    pub const fn window(&self) -> (usize, usize) {
        (self.start_step, self.end_step)
    }

    /// Timestamp of the last window re-roll.
    #[must_use]
    pub const fn last_change(&self) -> Option<Duration> {
        self.last_change
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub const fn options(&self) -> &NoiseOptions {
        &self.options
    }

    fn needs_reroll(&mut self, parent_len: usize, now: Duration) -> bool {
        let Some(last) = self.last_change else {
            return true;
        };
        if self.end_step > parent_len || self.start_step >= self.end_step {
            return true;
        }
        let elapsed_ms = now.saturating_sub(last).as_secs_f64() * 1000.0;
        elapsed_ms > self.rng.next_f64() * self.max_interval_ms
    }

    fn reroll(&mut self, parent_len: usize, now: Duration) {
        let plen = parent_len;
        let step_min = plen / 10;
        let start = ((self.rng.next_f64() * plen as f64 * 0.6).floor() as usize).min(plen - 1);
        let room = plen.saturating_sub(start + step_min);
        let end = start + step_min + (self.rng.next_f64() * room as f64 * 0.5).floor() as usize;
        // Prefer at least two points so the branch can be drawn.
        let min_end = (start + 2).min(plen);
        self.start_step = start;
        self.end_step = end.clamp(min_end, plen);
        self.last_change = Some(now);
        tracing::trace!(
            start = self.start_step,
            end = self.end_step,
            parent_len = plen,
            "child window re-rolled"
        );
    }

    fn update(&mut self, parent: &[Point], now: Duration, step_scale: f64) {
        let plen = parent.len();
        if plen == 0 {
            return;
        }
        if self.needs_reroll(plen, now) {
            self.reroll(plen, now);
        }
        let window = &parent[self.start_step..self.end_step];
        if window.len() < 2 {
            return;
        }
        // Three evenly spaced controls across the window.
        let sep = (window.len() - 1) as f64 / 2.0;
        for (i, slot) in self.controls.iter_mut().enumerate() {
            *slot = window[((sep * i as f64).floor() as usize).min(window.len() - 1)];
        }
        let segments = ((window.len() as f64 / 1.5).floor() as usize).max(1);
        spline_into(&self.controls, segments, false, &mut self.base);
        let range = self.controls[0].distance(self.controls[2]);
        displace(
            &self.base,
            &mut self.points,
            &self.noise,
            &self.options,
            range,
            false,
        );
        self.options.offset += self.options.speed * step_scale;
    }
}

// ---------------------------------------------------------------------------
// NoiseLine
// ---------------------------------------------------------------------------

/// A smoothed, noise-displaced polyline that owns its branch children.
#[derive(Debug, Clone)]
pub struct NoiseLine {
    segments_num: usize,
    options: NoiseOptions,
    noise: PerlinNoise,
    seed: u32,
    base: Vec<Point>,
    points: Vec<Point>,
    children: Vec<ChildLine>,
}

impl NoiseLine {
    /// Create a line that subdivides every control span into
    /// `segments_num` points. The noise field is seeded once from `seed`.
    #[must_use]
    pub fn new(segments_num: usize, options: NoiseOptions, seed: u32) -> Self {
        Self {
            segments_num: segments_num.max(1),
            options,
            noise: PerlinNoise::new(seed),
            seed,
            base: Vec::new(),
            points: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Current displaced points (empty until the first valid update).
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub const fn options(&self) -> &NoiseOptions {
        &self.options
    }

    #[must_use]
    pub const fn segments_num(&self) -> usize {
        self.segments_num
    }

    /// Add a child; its window is rolled on the next update.
    pub fn create_child(&mut self, options: NoiseOptions) -> ChildId {
        let id = ChildId(self.children.len());
        let seed = self
            .seed
            .wrapping_add((id.0 as u32 + 1).wrapping_mul(0x2545_f491));
        self.children.push(ChildLine::new(options, seed));
        id
    }

    /// Add a child with an explicit window, stamped as rolled at `now`.
    ///
    /// A window that does not fit the parent's points is re-rolled on the
    /// next update.
    pub fn create_child_with_window(
        &mut self,
        options: NoiseOptions,
        start_step: usize,
        end_step: usize,
        now: Duration,
    ) -> ChildId {
        let id = self.create_child(options);
        let child = &mut self.children[id.0];
        child.start_step = start_step;
        child.end_step = end_step;
        child.last_change = Some(now);
        id
    }

    /// Override the re-roll interval bound for every child.
    pub fn set_child_interval_ms(&mut self, max_interval_ms: f64) {
        let v = max_interval_ms.max(0.0);
        for child in &mut self.children {
            child.max_interval_ms = v;
        }
    }

    #[must_use]
    pub fn child(&self, id: ChildId) -> Option<&ChildLine> {
        self.children.get(id.0)
    }

    #[must_use]
    pub fn children(&self) -> &[ChildLine] {
        &self.children
    }

    /// Recompute points from `controls` and advance the phase by one frame.
    pub fn update(&mut self, controls: &[Point], closed: bool, now: Duration) {
        self.update_scaled(controls, closed, now, 1.0);
    }

    /// Like [`update`](Self::update), advancing the phase by `step_scale`
    /// frames.
    ///
    /// Fewer than two controls leave the previous points untouched.
    pub fn update_scaled(&mut self, controls: &[Point], closed: bool, now: Duration, step_scale: f64) {
        if !self.update_without_children(controls, closed, step_scale) {
            return;
        }
        for child in &mut self.children {
            child.update(&self.points, now, step_scale);
        }
    }

    /// Update only this line's own points, leaving children untouched.
    /// Returns `false` when there were too few controls to do anything.
    pub fn update_without_children(&mut self, controls: &[Point], closed: bool, step_scale: f64) -> bool {
        if controls.len() < 2 {
            return false;
        }
        let range = polyline_length(controls, closed);
        spline_into(controls, self.segments_num, closed, &mut self.base);
        displace(
            &self.base,
            &mut self.points,
            &self.noise,
            &self.options,
            range,
            closed,
        );
        self.options.offset += self.options.speed * step_scale;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardfx_core::{RoundedRect, spline};

    fn card_controls() -> Vec<Point> {
        RoundedRect::new(340.0, 540.0, 32.0, 8.0).control_polygon()
    }

    fn line(len: usize) -> Vec<Point> {
        (0..len).map(|i| Point::new(i as f64 * 4.0, 0.0)).collect()
    }

    #[test]
    fn default_options() {
        let o = NoiseOptions::default();
        assert_eq!((o.base, o.amplitude, o.speed, o.offset), (30.0, 0.5, 0.002, 0.0));
    }

    #[test]
    fn closed_update_point_count() {
        let mut nl = NoiseLine::new(8, NoiseOptions::default(), 1);
        nl.update(&card_controls(), true, Duration::ZERO);
        assert_eq!(nl.points().len(), 12 * 8);
    }

    #[test]
    fn too_few_controls_is_noop() {
        let mut nl = NoiseLine::new(4, NoiseOptions::default(), 1);
        nl.update(&card_controls(), true, Duration::ZERO);
        let before = nl.points().to_vec();
        let offset = nl.options().offset;
        nl.update(&[Point::ORIGIN], true, Duration::ZERO);
        assert_eq!(nl.points(), before.as_slice());
        assert_eq!(nl.options().offset, offset);
    }

    #[test]
    fn displacement_bounded_by_range_times_amplitude() {
        let opts = NoiseOptions {
            amplitude: 0.01,
            ..NoiseOptions::default()
        };
        let controls = card_controls();
        let range = polyline_length(&controls, true);
        let base = spline(&controls, 8, true);
        let mut nl = NoiseLine::new(8, opts, 9);
        for frame in 0..50 {
            nl.update(&controls, true, Duration::from_millis(frame * 16));
            for (p, b) in nl.points().iter().zip(&base) {
                assert!(p.distance(*b) <= range * opts.amplitude + 1e-9);
            }
        }
    }

    #[test]
    fn open_line_endpoints_are_pinned() {
        let controls = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 20.0),
            Point::new(100.0, 0.0),
        ];
        let mut nl = NoiseLine::new(10, NoiseOptions::default(), 4);
        nl.update(&controls, false, Duration::ZERO);
        let pts = nl.points();
        assert_eq!(pts[0], controls[0]);
        assert!(pts[pts.len() - 1].distance(controls[2]) < 1e-6);
    }

    #[test]
    fn closed_line_seam_matches() {
        let controls = card_controls();
        let base = spline(&controls, 8, true);
        let mut nl = NoiseLine::new(8, NoiseOptions { amplitude: 0.02, ..Default::default() }, 5);
        nl.update(&controls, true, Duration::ZERO);
        let pts = nl.points();
        let n = pts.len();
        let d_first = pts[0] - base[0];
        let d_last = pts[n - 1] - base[n - 1];
        // Same displacement magnitude at both ends of the seam.
        assert!((d_first.length() - d_last.length()).abs() < 1e-6);
    }

    #[test]
    fn offset_advances_per_update() {
        let mut nl = NoiseLine::new(4, NoiseOptions::default(), 1);
        nl.update(&card_controls(), true, Duration::ZERO);
        nl.update_scaled(&card_controls(), true, Duration::ZERO, 2.0);
        assert!((nl.options().offset - 0.006).abs() < 1e-12);
    }

    #[test]
    fn same_seed_same_points() {
        let mut a = NoiseLine::new(8, NoiseOptions::default(), 77);
        let mut b = NoiseLine::new(8, NoiseOptions::default(), 77);
        for f in 0..5 {
            a.update(&card_controls(), true, Duration::from_millis(f * 16));
            b.update(&card_controls(), true, Duration::from_millis(f * 16));
        }
        assert_eq!(a.points(), b.points());
    }

    #[test]
    fn child_window_invariant_holds() {
        let mut nl = NoiseLine::new(8, NoiseOptions::default(), 3);
        let ids: Vec<ChildId> = (0..4).map(|_| nl.create_child(NoiseOptions::default())).collect();
        for f in 0..200u64 {
            nl.update(&card_controls(), true, Duration::from_millis(f * 16));
            let plen = nl.points().len();
            for &id in &ids {
                let (start, end) = nl.child(id).map(ChildLine::window).unwrap_or_default();
                assert!(start < end && end <= plen, "({start}, {end}) vs {plen}");
            }
        }
    }

    #[test]
    fn child_rerolls_when_parent_shrinks() {
        let mut nl = NoiseLine::new(1, NoiseOptions::default(), 11);
        let t0 = Duration::from_secs(5);
        // 40 open points.
        let long = line(40);
        let id = nl.create_child_with_window(NoiseOptions::default(), 20, 39, t0);
        nl.update(&long, false, t0);
        assert_eq!(nl.child(id).map(ChildLine::window), Some((20, 39)));

        // Parent shrinks to 10 points; same timestamp, so only the size
        // check can force the roll.
        let short = line(10);
        nl.update(&short, false, t0);
        let (start, end) = nl.child(id).map(ChildLine::window).unwrap_or_default();
        assert!(start < end && end <= 10, "({start}, {end})");
    }

    #[test]
    fn oversized_initial_window_rerolls_on_first_update() {
        let mut nl = NoiseLine::new(2, NoiseOptions::default(), 12);
        let now = Duration::from_millis(100);
        let id = nl.create_child_with_window(NoiseOptions::default(), 0, 10_000, now);
        nl.update(&line(25), false, now);
        let plen = nl.points().len();
        let (start, end) = nl.child(id).map(ChildLine::window).unwrap_or_default();
        assert!(end <= plen && start < end);
        assert!(!nl.child(id).map(ChildLine::points).unwrap_or_default().is_empty());
    }

    #[test]
    fn child_points_follow_window() {
        let mut nl = NoiseLine::new(4, NoiseOptions::default(), 21);
        let id = nl.create_child(NoiseOptions { amplitude: 0.0, ..Default::default() });
        nl.update(&card_controls(), true, Duration::ZERO);
        let child = nl.child(id).expect("child exists");
        let (start, end) = child.window();
        let window = &nl.points()[start..end];
        let pts = child.points();
        // With zero amplitude the branch starts and ends on its window.
        assert_eq!(pts[0], window[0]);
        assert!(pts[pts.len() - 1].distance(window[window.len() - 1]) < 1e-6);
    }

    #[test]
    fn child_waits_for_interval() {
        let mut nl = NoiseLine::new(4, NoiseOptions::default(), 8);
        let id = nl.create_child(NoiseOptions::default());
        nl.set_child_interval_ms(1.0e12);
        nl.update(&card_controls(), true, Duration::ZERO);
        let first = nl.child(id).map(ChildLine::window);
        for f in 1..20u64 {
            nl.update(&card_controls(), true, Duration::from_millis(f * 16));
        }
        assert_eq!(nl.child(id).map(ChildLine::window), first);
    }
}
