#![forbid(unsafe_code)]

//! Frost border: an icy outline warped by slowly drifting turbulence.
//!
//! The outline is the rounded rectangle sampled every few pixels. Each
//! sample is pushed by a displacement field built from three fractal-noise
//! layers that slide across the card over one period:
//!
//! | layer | seed | drift over a period |
//! |-------|------|---------------------|
//! | 1     | 10   | dy 50 -> 0          |
//! | 2     | 10   | dy 0 -> -50         |
//! | 3     | 11   | dx 30 -> 0          |
//!
//! Layers 1 and 2 are averaged, then combined with layer 3 by taking the
//! lighter value per channel. The red channel drives x and the blue channel
//! drives y: `d = scale * (channel - 0.5)`.

use cardfx_core::{Bounds, PerlinNoise, Point, RoundedRect};
use cardfx_render::{PackedRgba, StrokeLayers, StrokeStyle, Surface};
use cardfx_style::CssColor;
use serde::{Deserialize, Serialize};

use crate::visual_fx::{BorderFx, EffectKind, FxContext, FxQuality};

/// Lattice offset separating the blue channel from the red one.
const BLUE_SHIFT: (f64, f64) = (71.3, 29.7);

/// Frost tuning. Lengths are CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrostParams {
    pub radius: f64,
    pub padding: f64,
    /// Distance between outline samples.
    pub spacing: f64,
    pub base_frequency: f64,
    pub octaves: u32,
    pub seeds: [u32; 3],
    pub period_secs: f64,
    /// Displacement map scale.
    pub scale: f64,
    pub halo: CssColor,
    pub glow: CssColor,
    pub core: CssColor,
}

impl Default for FrostParams {
    fn default() -> Self {
        Self {
            radius: 32.0,
            padding: 4.0,
            spacing: 4.0,
            base_frequency: 0.02,
            octaves: 3,
            seeds: [10, 10, 11],
            period_secs: 15.0,
            scale: 12.0,
            halo: CssColor(PackedRgba::rgba(160, 220, 255, 64)),
            glow: CssColor(PackedRgba::rgba(190, 235, 255, 153)),
            core: CssColor(PackedRgba::rgb(232, 248, 255)),
        }
    }
}

impl FrostParams {
    /// Back-to-front stroke layers in CSS pixels.
    #[must_use]
    pub fn layers(&self) -> [StrokeStyle; 3] {
        [
            StrokeStyle::new(self.halo.0, 8.0).with_blur(12.0).rounded(),
            StrokeStyle::new(self.glow.0, 3.0).with_blur(4.0).rounded(),
            StrokeStyle::new(self.core.0, 1.5).rounded(),
        ]
    }
}

/// Per-layer drift at `phase` in `[0, 1)`.
fn drift(phase: f64) -> [(f64, f64); 3] {
    [
        (0.0, 50.0 * (1.0 - phase)),
        (0.0, -50.0 * phase),
        (30.0 * (1.0 - phase), 0.0),
    ]
}

/// Turbulence layers and the per-frame offsets applied to them.
#[derive(Debug, Clone)]
struct Turbulence {
    layers: [PerlinNoise; 3],
    frequency: f64,
    octaves: u32,
    offsets: [(f64, f64); 3],
}

impl Turbulence {
    fn new(params: &FrostParams) -> Self {
        Self {
            layers: params.seeds.map(PerlinNoise::new),
            frequency: params.base_frequency,
            octaves: params.octaves,
            offsets: drift(0.0),
        }
    }

    /// Red and blue channel values in `[0, 1]` for one layer at CSS `(x, y)`.
    fn channels(&self, layer: usize, x: f64, y: f64) -> (f64, f64) {
        let (dx, dy) = self.offsets[layer];
        let sx = (x - dx) * self.frequency;
        let sy = (y - dy) * self.frequency;
        let noise = &self.layers[layer];
        let r = noise.fractal2d(sx, sy, self.octaves);
        let b = noise.fractal2d(sx + BLUE_SHIFT.0, sy + BLUE_SHIFT.1, self.octaves);
        (0.5 + 0.5 * r, 0.5 + 0.5 * b)
    }

    /// Combined (red, blue) at CSS `(x, y)`.
    fn sample(&self, x: f64, y: f64) -> (f64, f64) {
        let (r1, b1) = self.channels(0, x, y);
        let (r2, b2) = self.channels(1, x, y);
        let (r3, b3) = self.channels(2, x, y);
        (((r1 + r2) * 0.5).max(r3), ((b1 + b2) * 0.5).max(b3))
    }
}

/// Turbulence-warped icy outline.
#[derive(Debug, Clone)]
pub struct FrostFx {
    params: FrostParams,
    turbulence: Turbulence,
    bounds: Bounds,
    outline: Vec<Point>,
    points: Vec<Point>,
    quality: FxQuality,
}

impl FrostFx {
    #[must_use]
    pub fn new(params: FrostParams) -> Self {
        let turbulence = Turbulence::new(&params);
        Self {
            params,
            turbulence,
            bounds: Bounds::EMPTY,
            outline: Vec::new(),
            points: Vec::new(),
            quality: FxQuality::Full,
        }
    }

    /// Undisplaced outline samples.
    #[must_use]
    pub fn outline(&self) -> &[Point] {
        &self.outline
    }

    /// Displaced outline from the last update.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    fn phase(&self, time_seconds: f64) -> f64 {
        if self.params.period_secs > 0.0 && time_seconds.is_finite() {
            time_seconds.rem_euclid(self.params.period_secs) / self.params.period_secs
        } else {
            0.0
        }
    }
}

impl BorderFx for FrostFx {
    fn name(&self) -> &'static str {
        "frost"
    }

    fn kind(&self) -> EffectKind {
        EffectKind::Frost
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.outline.clear();
        self.points.clear();
        if bounds.is_empty() {
            return;
        }
        let dpr = bounds.dpr;
        let shape =
            RoundedRect::from_bounds(bounds, self.params.radius * dpr, self.params.padding * dpr);
        let spacing = self.params.spacing.max(1.0) * dpr;
        let count = ((shape.length() / spacing).ceil() as usize).max(4);
        self.outline
            .extend(shape.sample_evenly(count).into_iter().map(|s| s.point));
    }

    fn update(&mut self, ctx: &FxContext) {
        self.quality = ctx.quality;
        if !ctx.quality.is_enabled() {
            return;
        }
        if ctx.bounds != self.bounds {
            self.resize(ctx.bounds);
        }
        self.turbulence.offsets = drift(self.phase(ctx.time_seconds));

        let dpr = self.bounds.dpr;
        let scale = self.params.scale;
        self.points.clear();
        self.points.reserve(self.outline.len());
        for &p in &self.outline {
            let (r, b) = self.turbulence.sample(p.x / dpr, p.y / dpr);
            let dx = scale * (r - 0.5) * dpr;
            let dy = scale * (b - 0.5) * dpr;
            self.points.push(Point::new(p.x + dx, p.y + dy));
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if !self.quality.is_enabled() || self.bounds.is_empty() {
            return;
        }
        let dpr = self.bounds.dpr;
        let layers: StrokeLayers = self
            .quality
            .layers(&self.params.layers().map(|l| l.scaled(dpr)));
        surface.stroke_layers(&self.points, true, &layers);
    }
}
