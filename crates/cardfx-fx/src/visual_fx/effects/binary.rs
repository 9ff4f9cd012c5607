#![forbid(unsafe_code)]

//! Binary border: a stream of `0`/`1` glyphs marching clockwise around the
//! card over a thick black band.

use cardfx_core::{Bounds, Point, RoundedRect, Xorshift};
use cardfx_render::{PackedRgba, StrokeStyle, Surface};
use cardfx_style::CssColor;
use serde::{Deserialize, Serialize};

use crate::visual_fx::{BorderFx, EffectKind, FxContext, FxQuality};

/// Device pixels between backing path samples.
const PATH_SPACING: f64 = 4.0;

/// Binary stream tuning. Lengths are CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryParams {
    pub radius: f64,
    pub padding: f64,
    pub font_size: f64,
    /// Pixels per frame.
    pub speed: f64,
    /// Probability that a glyph is random instead of alternating.
    pub flip_chance: f64,
    pub color: CssColor,
    pub backing: CssColor,
    pub backing_width: f64,
}

impl Default for BinaryParams {
    fn default() -> Self {
        Self {
            radius: 32.0,
            padding: 4.0,
            font_size: 14.0,
            speed: 1.0,
            flip_chance: 0.05,
            color: CssColor(PackedRgba::rgb(0, 255, 0)),
            backing: CssColor(PackedRgba::BLACK),
            backing_width: 24.0,
        }
    }
}

/// Glyph stream border.
#[derive(Debug, Clone)]
pub struct BinaryFx {
    params: BinaryParams,
    rng: Xorshift,
    bounds: Bounds,
    shape: RoundedRect,
    path: Vec<Point>,
    glyphs: Vec<(char, Point)>,
    offset: f64,
    quality: FxQuality,
}

impl BinaryFx {
    #[must_use]
    pub fn new(params: BinaryParams, seed: u32) -> Self {
        Self {
            params,
            rng: Xorshift::new(seed),
            bounds: Bounds::EMPTY,
            shape: RoundedRect::new(0.0, 0.0, 0.0, 0.0),
            path: Vec::new(),
            glyphs: Vec::new(),
            offset: 0.0,
            quality: FxQuality::Full,
        }
    }

    /// Glyphs placed by the last update.
    #[must_use]
    pub fn glyphs(&self) -> &[(char, Point)] {
        &self.glyphs
    }

    /// Stream offset in device pixels, in `[0, 2 * font size)`.
    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    fn font_px(&self) -> f64 {
        self.params.font_size.max(1.0) * self.bounds.dpr
    }
}

impl BorderFx for BinaryFx {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn kind(&self) -> EffectKind {
        EffectKind::Binary
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        let dpr = bounds.dpr;
        self.shape =
            RoundedRect::from_bounds(bounds, self.params.radius * dpr, self.params.padding * dpr);
        self.path.clear();
        self.glyphs.clear();
        if bounds.is_empty() {
            return;
        }
        let count = (self.shape.length() / PATH_SPACING).ceil() as usize;
        self.path
            .extend(self.shape.sample_evenly(count.max(4)).into_iter().map(|s| s.point));
    }

    fn update(&mut self, ctx: &FxContext) {
        self.quality = ctx.quality;
        if !ctx.quality.is_enabled() {
            return;
        }
        if ctx.bounds != self.bounds {
            self.resize(ctx.bounds);
        }
        self.glyphs.clear();
        let length = self.shape.length();
        if self.bounds.is_empty() || length <= 0.0 {
            return;
        }

        let font = self.font_px();
        self.offset = (self.offset + self.params.speed * self.bounds.dpr * ctx.step_scale)
            .rem_euclid(font * 2.0);

        let count = (length / font).floor() as usize;
        for i in 0..count {
            let dist = (i as f64 * font + self.offset).rem_euclid(length);
            let glyph = if self.rng.chance(self.params.flip_chance) {
                if self.rng.chance(0.5) { '1' } else { '0' }
            } else if i % 2 == 0 {
                '1'
            } else {
                '0'
            };
            self.glyphs.push((glyph, self.shape.sample(dist).point));
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if !self.quality.is_enabled() || self.bounds.is_empty() {
            return;
        }
        if self.quality != FxQuality::Minimal {
            let backing =
                StrokeStyle::new(self.params.backing.0, self.params.backing_width * self.bounds.dpr);
            surface.stroke_path(&self.path, true, &backing);
        }
        let font = self.font_px();
        let color = self.params.color.0;
        for &(glyph, at) in &self.glyphs {
            surface.fill_glyph(glyph, at, font, color);
        }
    }
}
