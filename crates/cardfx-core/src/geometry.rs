#![forbid(unsafe_code)]

//! Points and container bounds.
//!
//! All coordinates are `f64` device pixels. Bounds carry the device pixel
//! ratio so effects can scale per-pixel constants (cell pitch, stroke width).

use std::ops::{Add, Div, Mul, Sub};

/// A 2D point (or vector) in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Angle (radians) of the vector from `self` to `other`.
    #[inline]
    #[must_use]
    pub fn angle_to(self, other: Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Length of this point treated as a vector.
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

/// Measured container bounds.
///
/// `width` and `height` are device pixels (CSS pixels already multiplied by
/// `dpr`). Zero-area bounds are legal; effects skip drawing for them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    pub const EMPTY: Self = Self {
        width: 0.0,
        height: 0.0,
        dpr: 1.0,
    };

    /// Bounds in device pixels with `dpr = 1`.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_dpr(width, height, 1.0)
    }

    /// Bounds with an explicit device pixel ratio.
    ///
    /// Non-finite or negative sizes collapse to zero; a non-positive ratio
    /// falls back to 1.
    #[must_use]
    pub fn with_dpr(width: f64, height: f64, dpr: f64) -> Self {
        let sanitize = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            width: sanitize(width),
            height: sanitize(height),
            dpr: if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 },
        }
    }

    /// Device-pixel bounds from a CSS-pixel size.
    #[must_use]
    pub fn from_css(css_width: f64, css_height: f64, dpr: f64) -> Self {
        let b = Self::with_dpr(css_width, css_height, dpr);
        Self {
            width: b.width * b.dpr,
            height: b.height * b.dpr,
            dpr: b.dpr,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    /// Whether `p` lies inside `[0, width) x [0, height)`.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width && p.y < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(a + b, Point::new(5.0, 8.0));
        assert_eq!(b - a, Point::new(3.0, 4.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
        assert_eq!(b / 2.0, Point::new(2.0, 3.0));
        assert_eq!(a.distance(b), 5.0);
        assert_eq!((b - a).length(), 5.0);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Point::new(-3.0, 7.0);
        let b = Point::new(9.0, 1.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Point::new(3.0, 4.0));
    }

    #[test]
    fn angle_to_axes() {
        let o = Point::ORIGIN;
        assert_eq!(o.angle_to(Point::new(1.0, 0.0)), 0.0);
        assert!((o.angle_to(Point::new(0.0, 1.0)) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn bounds_sanitize_bad_input() {
        let b = Bounds::with_dpr(f64::NAN, -4.0, 0.0);
        assert_eq!(b, Bounds::EMPTY);
        assert!(b.is_empty());
    }

    #[test]
    fn bounds_from_css_scales_by_dpr() {
        let b = Bounds::from_css(340.0, 540.0, 2.0);
        assert_eq!(b.width, 680.0);
        assert_eq!(b.height, 1080.0);
        assert_eq!(b.dpr, 2.0);
        assert_eq!(b.center(), Point::new(340.0, 540.0));
    }

    #[test]
    fn contains_is_half_open() {
        let b = Bounds::new(10.0, 10.0);
        assert!(b.contains(Point::new(0.0, 0.0)));
        assert!(b.contains(Point::new(9.99, 9.99)));
        assert!(!b.contains(Point::new(10.0, 5.0)));
        assert!(!b.contains(Point::new(-0.1, 5.0)));
    }
}
