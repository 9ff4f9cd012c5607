#![forbid(unsafe_code)]

//! Software RGBA raster.
//!
//! A small anti-aliased rasterizer good enough for previews and golden
//! frames: strokes are distance-field capsules, blur is a linear falloff halo
//! composited under the stroke, glyphs use a 3x5 bitmap font for `0`/`1`.
//!
//! Each stroke accumulates coverage into a reusable mask and composites once,
//! so overlapping segments of the same path do not double their alpha.

use cardfx_core::{Bounds, Point};

use crate::color::PackedRgba;
use crate::surface::{Rect, StrokeStyle, Surface};

/// 3x5 bitmaps, row-major, MSB = leftmost column.
const GLYPH_ZERO: [u8; 5] = [0b111, 0b101, 0b101, 0b101, 0b111];
const GLYPH_ONE: [u8; 5] = [0b010, 0b110, 0b010, 0b010, 0b111];
const GLYPH_BLOCK: [u8; 5] = [0b111; 5];

/// Halo peak opacity relative to the stroke color.
const BLUR_PEAK: f64 = 0.5;

/// Owned RGBA pixel buffer implementing [`Surface`].
#[derive(Debug, Clone)]
pub struct Pixmap {
    width: usize,
    height: usize,
    dpr: f64,
    data: Vec<PackedRgba>,
    mask: Vec<f32>,
}

/// Integer pixel window `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy)]
struct Window {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl Window {
    fn width(&self) -> usize {
        self.x1 - self.x0
    }

    fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }
}

impl Pixmap {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_dpr(width, height, 1.0)
    }

    #[must_use]
    pub fn with_dpr(width: usize, height: usize, dpr: f64) -> Self {
        #[cfg(feature = "tracing")]
        tracing::trace!(width, height, dpr, "pixmap allocated");
        Self {
            width,
            height,
            dpr: if dpr > 0.0 { dpr } else { 1.0 },
            data: vec![PackedRgba::TRANSPARENT; width * height],
            mask: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Pixel at `(x, y)`, or `None` when out of range.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<PackedRgba> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    #[must_use]
    pub fn pixels(&self) -> &[PackedRgba] {
        &self.data
    }

    /// Fill every pixel with `color` (no blending).
    pub fn fill(&mut self, color: PackedRgba) {
        self.data.fill(color);
    }

    /// Flatten to `RGBA8` bytes, row-major.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() * 4);
        for px in &self.data {
            out.extend_from_slice(&[px.r(), px.g(), px.b(), px.a()]);
        }
        out
    }

    #[inline]
    fn blend(&mut self, x: usize, y: usize, color: PackedRgba) {
        let idx = y * self.width + x;
        self.data[idx] = color.over(self.data[idx]);
    }

    fn clip(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Window {
        let cx = |v: f64| v.clamp(0.0, self.width as f64) as usize;
        let cy = |v: f64| v.clamp(0.0, self.height as f64) as usize;
        Window {
            x0: cx(x0.floor()),
            y0: cy(y0.floor()),
            x1: cx(x1.ceil()),
            y1: cy(y1.ceil()),
        }
    }

    /// Accumulate max coverage of a capsule around `a..b` into the mask.
    ///
    /// `solid` is the fully covered half-width; coverage then falls off
    /// linearly over `feather` pixels.
    fn cover_segment(&mut self, win: Window, a: Point, b: Point, solid: f64, feather: f64) {
        let reach = solid + feather;
        let seg = self.clip(
            a.x.min(b.x) - reach,
            a.y.min(b.y) - reach,
            a.x.max(b.x) + reach,
            a.y.max(b.y) + reach,
        );
        let ab = b - a;
        let len2 = ab.x * ab.x + ab.y * ab.y;
        for y in seg.y0.max(win.y0)..seg.y1.min(win.y1) {
            for x in seg.x0.max(win.x0)..seg.x1.min(win.x1) {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let t = if len2 > 0.0 {
                    (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = p.distance(a + ab * t);
                let cov = if d <= solid {
                    1.0
                } else if feather > 0.0 {
                    (1.0 - (d - solid) / feather).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let slot = &mut self.mask[(y - win.y0) * win.width() + (x - win.x0)];
                *slot = slot.max(cov as f32);
            }
        }
    }

    fn composite_mask(&mut self, win: Window, color: PackedRgba, peak: f64) {
        for y in win.y0..win.y1 {
            for x in win.x0..win.x1 {
                let cov = f64::from(self.mask[(y - win.y0) * win.width() + (x - win.x0)]);
                if cov > 0.0 {
                    self.blend(x, y, color.with_opacity(cov * peak));
                }
            }
        }
    }

    fn raster_path(&mut self, points: &[Point], closed: bool, solid: f64, feather: f64) -> Window {
        let reach = solid + feather + 1.0;
        let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for p in points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        let win = self.clip(x0 - reach, y0 - reach, x1 + reach, y1 + reach);
        if win.is_empty() {
            return win;
        }
        self.mask.clear();
        self.mask.resize(win.width() * (win.y1 - win.y0), 0.0);

        for pair in points.windows(2) {
            self.cover_segment(win, pair[0], pair[1], solid, feather);
        }
        if closed && let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            self.cover_segment(win, last, first, solid, feather);
        }
        win
    }
}

impl Surface for Pixmap {
    fn bounds(&self) -> Bounds {
        Bounds::with_dpr(self.width as f64, self.height as f64, self.dpr)
    }

    fn clear(&mut self) {
        self.data.fill(PackedRgba::TRANSPARENT);
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, style: &StrokeStyle) {
        if points.len() < 2 || style.color.is_transparent() || style.width <= 0.0 {
            return;
        }
        if points.iter().any(|p| !p.is_finite()) {
            return;
        }
        let half = style.width * 0.5;

        if style.blur > 0.0 {
            let win = self.raster_path(points, closed, half, style.blur);
            if !win.is_empty() {
                self.composite_mask(win, style.color, BLUR_PEAK);
            }
        }
        // One pixel of feather gives the core stroke anti-aliased edges.
        let win = self.raster_path(points, closed, (half - 0.5).max(0.0), 1.0);
        if !win.is_empty() {
            self.composite_mask(win, style.color, 1.0);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: PackedRgba) {
        if rect.is_empty() || color.is_transparent() {
            return;
        }
        let win = self.clip(rect.x, rect.y, rect.x + rect.width, rect.y + rect.height);
        for y in win.y0..win.y1 {
            for x in win.x0..win.x1 {
                self.blend(x, y, color);
            }
        }
    }

    fn fill_glyph(&mut self, glyph: char, at: Point, size: f64, color: PackedRgba) {
        if size <= 0.0 || color.is_transparent() || !at.is_finite() {
            return;
        }
        let rows = match glyph {
            '0' => &GLYPH_ZERO,
            '1' => &GLYPH_ONE,
            _ => &GLYPH_BLOCK,
        };
        let cell_h = size / 5.0;
        let cell_w = size * 0.6 / 3.0;
        let left = at.x - size * 0.3;
        let top = at.y - size * 0.5;
        for (r, bits) in rows.iter().enumerate() {
            for c in 0..3 {
                if bits & (0b100 >> c) != 0 {
                    self.fill_rect(
                        Rect::new(
                            left + c as f64 * cell_w,
                            top + r as f64 * cell_h,
                            cell_w,
                            cell_h,
                        ),
                        color,
                    );
                }
            }
        }
    }
}
