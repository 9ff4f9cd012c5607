#![forbid(unsafe_code)]

//! Catmull-Rom smoothing of control polygons.
//!
//! Each span between two controls is subdivided into `segments_num` points
//! at `t = (j + 1) / segments_num`, so a span emits its end control but not
//! its start. Closed curves wrap around; open curves duplicate the end
//! controls as phantom neighbors and prepend the first control so the output
//! starts and ends exactly on the polygon.

use crate::geometry::Point;

/// Scalar Catmull-Rom interpolation between `p1` and `p2`.
#[inline]
#[must_use]
pub fn catmull_rom(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let v0 = (p2 - p0) * 0.5;
    let v1 = (p3 - p1) * 0.5;
    let t2 = t * t;
    let t3 = t2 * t;
    (2.0 * p1 - 2.0 * p2 + v0 + v1) * t3 + (-3.0 * p1 + 3.0 * p2 - 2.0 * v0 - v1) * t2 + v0 * t + p1
}

/// Smooth `controls` into a dense point sequence.
///
/// - closed: `controls.len() * segments_num` points, the last equal to the
///   first control.
/// - open: `(controls.len() - 1) * segments_num + 1` points, from the first
///   control to the last.
///
/// `segments_num == 0` is treated as 1. Fewer than two controls are returned
/// unchanged.
#[must_use]
pub fn spline(controls: &[Point], segments_num: usize, closed: bool) -> Vec<Point> {
    let mut out = Vec::new();
    spline_into(controls, segments_num, closed, &mut out);
    out
}

/// [`spline`] into a caller-owned buffer (cleared first), so per-frame
/// callers can reuse the allocation.
pub fn spline_into(controls: &[Point], segments_num: usize, closed: bool, out: &mut Vec<Point>) {
    out.clear();
    let n = controls.len();
    if n < 2 {
        out.extend_from_slice(controls);
        return;
    }
    let seg = segments_num.max(1);

    // Neighbor lookup on the virtually padded control list.
    let at = |k: isize| -> Point {
        if closed {
            controls[k.rem_euclid(n as isize) as usize]
        } else {
            controls[k.clamp(0, n as isize - 1) as usize]
        }
    };

    let spans = if closed { n } else { n - 1 };
    out.reserve(spans * seg + usize::from(!closed));
    if !closed {
        out.push(controls[0]);
    }
    for i in 0..spans as isize {
        let p0 = at(i - 1);
        let p1 = at(i);
        let p2 = at(i + 1);
        let p3 = at(i + 2);
        for j in 0..seg {
            let t = (j + 1) as f64 / seg as f64;
            out.push(Point::new(
                catmull_rom(p0.x, p1.x, p2.x, p3.x, t),
                catmull_rom(p0.y, p1.y, p2.y, p3.y, t),
            ));
        }
    }
}

/// Total length of a polyline, including the closing segment when `closed`.
#[must_use]
pub fn polyline_length(points: &[Point], closed: bool) -> f64 {
    let open: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    match (closed, points.first(), points.last()) {
        (true, Some(first), Some(last)) => open + last.distance(*first),
        _ => open,
    }
}
