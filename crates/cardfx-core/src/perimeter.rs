#![forbid(unsafe_code)]

//! Arc-length mapping around a rounded rectangle.
//!
//! The path is inset by `padding` from the container edges. Distance 0 is
//! the left end of the top edge; the walk proceeds clockwise through eight
//! segments:
//!
//! ```text
//!   0 ──top──▶ ╮ TR
//!   ▲          │
//! left       right
//!   │          ▼
//! BL ╰ ◀─bottom─╯ BR
//! ```
//!
//! Angles are tangent directions in radians (screen space, +y down).

use std::f64::consts::{FRAC_PI_2, PI};

use crate::geometry::{Bounds, Point};

/// A point on the perimeter with its tangent direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerimeterSample {
    pub point: Point,
    pub angle: f64,
}

/// Rounded rectangle inset inside a `width x height` container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    width: f64,
    height: f64,
    radius: f64,
    padding: f64,
}

#[inline]
fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

impl RoundedRect {
    /// Create the shape, clamping `radius` into
    /// `[0, max(0, min(width, height) - 2 * padding) / 2]`.
    ///
    /// Negative or non-finite inputs are treated as zero, and `padding` is
    /// capped at half the smaller side.
    #[must_use]
    pub fn new(width: f64, height: f64, radius: f64, padding: f64) -> Self {
        let width = non_negative(width);
        let height = non_negative(height);
        let padding = non_negative(padding).min(width.min(height) * 0.5);
        let max_radius = (width.min(height) - 2.0 * padding).max(0.0) * 0.5;
        Self {
            width,
            height,
            radius: non_negative(radius).min(max_radius),
            padding,
        }
    }

    /// Shape filling `bounds` with the given radius and padding.
    #[must_use]
    pub fn from_bounds(bounds: Bounds, radius: f64, padding: f64) -> Self {
        Self::new(bounds.width, bounds.height, radius, padding)
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Effective (clamped) corner radius.
    #[inline]
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    #[must_use]
    pub const fn padding(&self) -> f64 {
        self.padding
    }

    #[inline]
    fn horizontal_len(&self) -> f64 {
        (self.width - 2.0 * self.padding - 2.0 * self.radius).max(0.0)
    }

    #[inline]
    fn vertical_len(&self) -> f64 {
        (self.height - 2.0 * self.padding - 2.0 * self.radius).max(0.0)
    }

    #[inline]
    fn corner_len(&self) -> f64 {
        PI * self.radius * 0.5
    }

    /// Total perimeter length `2(w-2p-2r) + 2(h-2p-2r) + 2*pi*r`.
    #[must_use]
    pub fn length(&self) -> f64 {
        2.0 * self.horizontal_len() + 2.0 * self.vertical_len() + 4.0 * self.corner_len()
    }

    /// Map an arc-length distance to a point and tangent angle.
    ///
    /// `distance` wraps modulo [`length`](Self::length); a zero-length
    /// perimeter returns the start point with angle 0.
    #[must_use]
    pub fn sample(&self, distance: f64) -> PerimeterSample {
        let p = self.padding;
        let r = self.radius;
        let w = self.width;
        let h = self.height;
        let start = Point::new(p + r, p);

        let total = self.length();
        if total <= 0.0 || !distance.is_finite() {
            return PerimeterSample {
                point: start,
                angle: 0.0,
            };
        }
        let mut d = distance.rem_euclid(total);

        let top = self.horizontal_len();
        let side = self.vertical_len();
        let corner = self.corner_len();
        let arc = |d: f64| if r > 0.0 { d / r } else { 0.0 };

        if d < top {
            return PerimeterSample {
                point: Point::new(p + r + d, p),
                angle: 0.0,
            };
        }
        d -= top;
        if d < corner {
            let a = arc(d);
            return PerimeterSample {
                point: Point::new(w - p - r + a.sin() * r, p + r - a.cos() * r),
                angle: a,
            };
        }
        d -= corner;
        if d < side {
            return PerimeterSample {
                point: Point::new(w - p, p + r + d),
                angle: FRAC_PI_2,
            };
        }
        d -= side;
        if d < corner {
            let a = arc(d);
            return PerimeterSample {
                point: Point::new(w - p - r + a.cos() * r, h - p - r + a.sin() * r),
                angle: FRAC_PI_2 + a,
            };
        }
        d -= corner;
        if d < top {
            return PerimeterSample {
                point: Point::new(w - p - r - d, h - p),
                angle: PI,
            };
        }
        d -= top;
        if d < corner {
            let a = arc(d);
            return PerimeterSample {
                point: Point::new(p + r - a.sin() * r, h - p - r + a.cos() * r),
                angle: PI + a,
            };
        }
        d -= corner;
        if d < side {
            return PerimeterSample {
                point: Point::new(p, h - p - r - d),
                angle: -FRAC_PI_2,
            };
        }
        d -= side;
        let a = arc(d.min(corner));
        PerimeterSample {
            point: Point::new(p + r - a.cos() * r, p + r - a.sin() * r),
            angle: -FRAC_PI_2 + a,
        }
    }

    /// `count` samples at equal arc-length spacing starting at distance 0.
    #[must_use]
    pub fn sample_evenly(&self, count: usize) -> Vec<PerimeterSample> {
        if count == 0 {
            return Vec::new();
        }
        let step = self.length() / count as f64;
        (0..count).map(|i| self.sample(i as f64 * step)).collect()
    }

    /// The 12-point control polygon, clockwise from the top edge.
    ///
    /// Each corner contributes the edge end before it, its arc midpoint, and
    /// the edge start after it. With `radius == 0` the three collapse onto
    /// the corner.
    #[must_use]
    pub fn control_polygon(&self) -> Vec<Point> {
        let p = self.padding;
        let r = self.radius;
        let (w, h) = (self.width, self.height);
        // Arc midpoint offset from the corner's circle center.
        let m = r * std::f64::consts::FRAC_1_SQRT_2;

        let left = p;
        let right = w - p;
        let top = p;
        let bottom = h - p;

        vec![
            Point::new(left + r, top),
            Point::new(right - r, top),
            Point::new(right - r + m, top + r - m),
            Point::new(right, top + r),
            Point::new(right, bottom - r),
            Point::new(right - r + m, bottom - r + m),
            Point::new(right - r, bottom),
            Point::new(left + r, bottom),
            Point::new(left + r - m, bottom - r + m),
            Point::new(left, bottom - r),
            Point::new(left, top + r),
            Point::new(left + r - m, top + r - m),
        ]
    }
}
