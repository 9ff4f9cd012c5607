#![forbid(unsafe_code)]

//! Gradient stops and precomputed color ramps.
//!
//! A [`ColorRamp`] is built once from stops and then indexed per cell, so the
//! per-frame path never interpolates.

use cardfx_render::PackedRgba;

use crate::color::lerp_color;

/// A gradient stop at `offset` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorStop {
    pub offset: f64,
    #[cfg_attr(feature = "serde", serde(with = "packed_css"))]
    pub color: PackedRgba,
}

impl ColorStop {
    #[must_use]
    pub const fn new(offset: f64, color: PackedRgba) -> Self {
        Self { offset, color }
    }
}

/// Evaluate a linear gradient at `t`.
///
/// Stops are expected in ascending offset order. Before the first stop the
/// first color holds; after the last, the last color holds. No stops yields
/// transparent.
#[must_use]
pub fn gradient_at(stops: &[ColorStop], t: f64) -> PackedRgba {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return PackedRgba::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let local = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return lerp_color(a.color, b.color, local);
        }
    }
    last.color
}

/// Immutable table of colors sampled from a gradient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRamp {
    colors: Vec<PackedRgba>,
}

impl ColorRamp {
    /// Sample `stops` at `len` evenly spaced pixel centers.
    ///
    /// Entry `i` is the gradient at `(i + 0.5) / len`, the value a canvas
    /// gradient painted `len` pixels wide shows at column `i`. A `len` of 0
    /// is bumped to 1.
    #[must_use]
    pub fn from_stops(stops: &[ColorStop], len: usize) -> Self {
        let len = len.max(1);
        let colors = (0..len)
            .map(|i| gradient_at(stops, (i as f64 + 0.5) / len as f64))
            .collect();
        Self { colors }
    }

    /// Ramp from explicit colors.
    #[must_use]
    pub fn from_colors(colors: Vec<PackedRgba>) -> Self {
        if colors.is_empty() {
            return Self {
                colors: vec![PackedRgba::TRANSPARENT],
            };
        }
        Self { colors }
    }

    /// Number of entries (always at least 1).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `idx`, clamped to the last entry.
    #[inline]
    #[must_use]
    pub fn get(&self, idx: usize) -> PackedRgba {
        self.colors[idx.min(self.colors.len() - 1)]
    }

    #[must_use]
    pub fn colors(&self) -> &[PackedRgba] {
        &self.colors
    }
}

#[cfg(feature = "serde")]
mod packed_css {
    use cardfx_render::PackedRgba;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::color::CssColor;

    pub fn serialize<S: Serializer>(c: &PackedRgba, s: S) -> Result<S::Ok, S::Error> {
        CssColor(*c).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PackedRgba, D::Error> {
        CssColor::deserialize(d).map(|c| c.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bw() -> [ColorStop; 2] {
        [
            ColorStop::new(0.0, PackedRgba::BLACK),
            ColorStop::new(1.0, PackedRgba::WHITE),
        ]
    }

    #[test]
    fn gradient_clamps_outside_stops() {
        let stops = bw();
        assert_eq!(gradient_at(&stops, -1.0), PackedRgba::BLACK);
        assert_eq!(gradient_at(&stops, 2.0), PackedRgba::WHITE);
        assert_eq!(gradient_at(&[], 0.5), PackedRgba::TRANSPARENT);
    }

    #[test]
    fn gradient_midpoint() {
        let mid = gradient_at(&bw(), 0.5);
        assert_eq!(mid.r(), 127);
        assert_eq!(mid.a(), 255);
    }

    #[test]
    fn ramp_samples_pixel_centers() {
        let ramp = ColorRamp::from_stops(&bw(), 2);
        assert_eq!(ramp.len(), 2);
        // 0.25 and 0.75 of the way.
        assert_eq!(ramp.get(0).r(), 63);
        assert_eq!(ramp.get(1).r(), 191);
    }

    #[test]
    fn ramp_get_clamps() {
        let ramp = ColorRamp::from_stops(&bw(), 4);
        assert_eq!(ramp.get(99), ramp.get(3));
    }

    #[test]
    fn zero_len_and_empty_colors() {
        assert_eq!(ColorRamp::from_stops(&bw(), 0).len(), 1);
        let r = ColorRamp::from_colors(Vec::new());
        assert_eq!(r.len(), 1);
        assert!(!r.is_empty());
        assert_eq!(r.get(0), PackedRgba::TRANSPARENT);
    }

    #[test]
    fn coincident_stops_take_later_color() {
        let stops = [
            ColorStop::new(0.0, PackedRgba::BLACK),
            ColorStop::new(0.5, PackedRgba::BLACK),
            ColorStop::new(0.5, PackedRgba::WHITE),
            ColorStop::new(1.0, PackedRgba::WHITE),
        ];
        assert_eq!(gradient_at(&stops, 0.75), PackedRgba::WHITE);
    }
}
