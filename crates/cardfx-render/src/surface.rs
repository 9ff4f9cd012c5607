#![forbid(unsafe_code)]

//! Drawing surface boundary.
//!
//! Effects never talk to a platform canvas directly. They issue a small set
//! of immediate-mode calls against [`Surface`]; hosts implement it for a
//! browser canvas, a software pixmap, or a recorder for tests.

use cardfx_core::{Bounds, Point};
use smallvec::SmallVec;

use crate::color::PackedRgba;

/// Line cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Line join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// How a path is stroked.
///
/// `blur` is a shadow blur radius in device pixels drawn in the stroke
/// color; 0 disables it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: PackedRgba,
    pub width: f64,
    pub blur: f64,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl StrokeStyle {
    #[must_use]
    pub const fn new(color: PackedRgba, width: f64) -> Self {
        Self {
            color,
            width,
            blur: 0.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
        }
    }

    #[must_use]
    pub const fn with_blur(mut self, blur: f64) -> Self {
        self.blur = blur;
        self
    }

    #[must_use]
    pub const fn rounded(mut self) -> Self {
        self.cap = LineCap::Round;
        self.join = LineJoin::Round;
        self
    }

    /// Copy with every length scaled by `factor` (device pixel ratio).
    #[must_use]
    pub fn scaled(mut self, factor: f64) -> Self {
        self.width *= factor;
        self.blur *= factor;
        self
    }
}

/// Ordered stroke layers drawn back to front.
pub type StrokeLayers = SmallVec<[StrokeStyle; 4]>;

/// Axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Immediate-mode drawing target.
pub trait Surface {
    /// Current drawable bounds.
    fn bounds(&self) -> Bounds;

    /// Clear to fully transparent.
    fn clear(&mut self);

    /// Stroke a polyline. `closed` joins the last point back to the first.
    fn stroke_path(&mut self, points: &[Point], closed: bool, style: &StrokeStyle);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: PackedRgba);

    /// Draw a single glyph centered on `at`, `size` pixels tall.
    fn fill_glyph(&mut self, glyph: char, at: Point, size: f64, color: PackedRgba);

    /// Stroke the same path once per layer, back to front.
    fn stroke_layers(&mut self, points: &[Point], closed: bool, layers: &[StrokeStyle]) {
        for layer in layers {
            self.stroke_path(points, closed, layer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_builders() {
        let s = StrokeStyle::new(PackedRgba::WHITE, 2.0)
            .with_blur(4.0)
            .rounded()
            .scaled(2.0);
        assert_eq!(s.width, 4.0);
        assert_eq!(s.blur, 8.0);
        assert_eq!(s.cap, LineCap::Round);
        assert_eq!(s.join, LineJoin::Round);
    }

    #[test]
    fn rect_empty() {
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
