#![forbid(unsafe_code)]

//! Ambient glow border: a two-color conic gradient rotating around the card
//! center, drawn as short segments of the rounded-rect outline.

use std::f64::consts::TAU;

use cardfx_core::{Bounds, Point, RoundedRect};
use cardfx_render::{PackedRgba, StrokeStyle, Surface};
use cardfx_style::{ColorStop, CssColor, gradient_at};
use serde::{Deserialize, Serialize};

use crate::visual_fx::{BorderFx, EffectKind, FxContext, FxQuality};

/// Glow tuning. Lengths are CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowParams {
    pub radius: f64,
    pub padding: f64,
    pub primary: CssColor,
    pub secondary: CssColor,
    /// Seconds per full turn of the gradient.
    pub period_secs: f64,
    /// Outline pieces, each colored independently.
    pub segments: usize,
    pub halo_width: f64,
    pub halo_blur: f64,
    pub halo_opacity: f64,
    pub core_width: f64,
    pub core_blur: f64,
}

impl Default for GlowParams {
    fn default() -> Self {
        Self {
            radius: 32.0,
            padding: 4.0,
            primary: CssColor(PackedRgba::rgb(0x00, 0xff, 0xc3)),
            secondary: CssColor(PackedRgba::rgb(0xa9, 0x4c, 0xff)),
            period_secs: 4.0,
            segments: 96,
            halo_width: 16.0,
            halo_blur: 24.0,
            halo_opacity: 0.35,
            core_width: 3.0,
            core_blur: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    points: [Point; 3],
    /// Angle of the segment midpoint around the card center.
    angle: f64,
    color: PackedRgba,
}

fn conic_color(stops: &[ColorStop], rotation: f64, angle: f64) -> PackedRgba {
    gradient_at(stops, ((angle - rotation) / TAU).rem_euclid(1.0))
}

/// Rotating conic glow.
#[derive(Debug, Clone)]
pub struct GlowFx {
    params: GlowParams,
    stops: [ColorStop; 3],
    bounds: Bounds,
    segments: Vec<Segment>,
    rotation: f64,
    quality: FxQuality,
}

impl GlowFx {
    #[must_use]
    pub fn new(params: GlowParams) -> Self {
        let stops = [
            ColorStop::new(0.0, params.primary.0),
            ColorStop::new(0.5, params.secondary.0),
            ColorStop::new(1.0, params.primary.0),
        ];
        Self {
            params,
            stops,
            bounds: Bounds::EMPTY,
            segments: Vec::new(),
            rotation: 0.0,
            quality: FxQuality::Full,
        }
    }

    /// Gradient rotation in radians, in `[0, 2pi)`.
    #[must_use]
    pub const fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Conic gradient color at `angle` for the current rotation.
    #[must_use]
    pub fn color_at(&self, angle: f64) -> PackedRgba {
        conic_color(&self.stops, self.rotation, angle)
    }

    /// Segment colors from the last update, clockwise from the top edge.
    pub fn colors(&self) -> impl Iterator<Item = PackedRgba> + '_ {
        self.segments.iter().map(|s| s.color)
    }

    fn layer_templates(&self) -> [StrokeStyle; 2] {
        let dpr = self.bounds.dpr;
        let p = &self.params;
        [
            StrokeStyle::new(PackedRgba::WHITE, p.halo_width)
                .with_blur(p.halo_blur)
                .rounded()
                .scaled(dpr),
            StrokeStyle::new(PackedRgba::WHITE, p.core_width)
                .with_blur(p.core_blur)
                .rounded()
                .scaled(dpr),
        ]
    }
}

impl BorderFx for GlowFx {
    fn name(&self) -> &'static str {
        "glow"
    }

    fn kind(&self) -> EffectKind {
        EffectKind::Glow
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.segments.clear();
        if bounds.is_empty() {
            return;
        }
        let dpr = bounds.dpr;
        let shape =
            RoundedRect::from_bounds(bounds, self.params.radius * dpr, self.params.padding * dpr);
        let n = self.params.segments.max(4);
        let step = shape.length() / n as f64;
        let center = bounds.center();
        self.segments.extend((0..n).map(|i| {
            let d = i as f64 * step;
            let mid = shape.sample(d + step * 0.5).point;
            Segment {
                points: [
                    shape.sample(d).point,
                    mid,
                    shape.sample(d + step).point,
                ],
                angle: center.angle_to(mid),
                color: PackedRgba::TRANSPARENT,
            }
        }));
    }

    fn update(&mut self, ctx: &FxContext) {
        self.quality = ctx.quality;
        if !ctx.quality.is_enabled() {
            return;
        }
        if ctx.bounds != self.bounds {
            self.resize(ctx.bounds);
        }
        self.rotation = if self.params.period_secs > 0.0 && ctx.time_seconds.is_finite() {
            (ctx.time_seconds / self.params.period_secs).rem_euclid(1.0) * TAU
        } else {
            0.0
        };
        let (stops, rotation) = (&self.stops, self.rotation);
        for seg in &mut self.segments {
            seg.color = conic_color(stops, rotation, seg.angle);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if !self.quality.is_enabled() || self.bounds.is_empty() {
            return;
        }
        let layers = self.quality.layers(&self.layer_templates());
        let last = layers.len().saturating_sub(1);
        for (li, template) in layers.iter().enumerate() {
            let opacity = if li == last { 1.0 } else { self.params.halo_opacity };
            for seg in &self.segments {
                let style = StrokeStyle {
                    color: seg.color.with_opacity(opacity),
                    ..*template
                };
                surface.stroke_path(&seg.points, false, &style);
            }
        }
    }
}
