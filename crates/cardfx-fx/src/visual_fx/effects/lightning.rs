#![forbid(unsafe_code)]

//! Lightning border: a closed [`NoiseLine`] around the card's rounded
//! rectangle with short branch lines flickering along it.
//!
//! The main line is stroked three times (wide faint glow, medium glow, hot
//! core); branches reuse the two inner layers.

use cardfx_core::{Bounds, Point, RoundedRect};
use cardfx_render::{PackedRgba, StrokeLayers, StrokeStyle, Surface};
use cardfx_style::CssColor;
use serde::{Deserialize, Serialize};

use super::noise_line::{NoiseLine, NoiseOptions};
use crate::visual_fx::{BorderFx, EffectKind, FxContext, FxQuality};

/// Lightning tuning. Lengths are CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningParams {
    pub radius: f64,
    pub padding: f64,
    /// Spline points per control span.
    pub segments: usize,
    pub line: NoiseOptions,
    /// Number of branch lines.
    pub branches: usize,
    pub branch: NoiseOptions,
    /// Upper bound of the random branch re-roll interval.
    pub branch_interval_ms: f64,
    pub glow: CssColor,
    pub core: CssColor,
}

impl Default for LightningParams {
    fn default() -> Self {
        Self {
            radius: 36.0,
            padding: 4.0,
            segments: 8,
            line: NoiseOptions {
                base: 30.0,
                amplitude: 0.0075,
                speed: 0.01,
                offset: 0.0,
            },
            branches: 3,
            branch: NoiseOptions {
                base: 10.0,
                amplitude: 0.06,
                speed: 0.02,
                offset: 0.0,
            },
            branch_interval_ms: 2000.0,
            glow: CssColor(PackedRgba::rgb(221, 132, 72)),
            core: CssColor(PackedRgba::rgb(255, 179, 128)),
        }
    }
}

impl LightningParams {
    /// Back-to-front stroke layers in CSS pixels.
    #[must_use]
    pub fn layers(&self) -> [StrokeStyle; 3] {
        let glow = self.glow.0;
        [
            StrokeStyle::new(glow.with_opacity(0.2), 8.0)
                .with_blur(10.0)
                .rounded(),
            StrokeStyle::new(glow.with_opacity(0.6), 4.0)
                .with_blur(4.0)
                .rounded(),
            StrokeStyle::new(self.core.0, 2.0).rounded(),
        ]
    }
}

/// Electric arc border.
#[derive(Debug, Clone)]
pub struct LightningFx {
    params: LightningParams,
    line: NoiseLine,
    controls: Vec<Point>,
    bounds: Bounds,
    quality: FxQuality,
}

impl LightningFx {
    #[must_use]
    pub fn new(params: LightningParams, seed: u32) -> Self {
        let mut line = NoiseLine::new(params.segments, params.line, seed);
        for _ in 0..params.branches {
            line.create_child(params.branch);
        }
        line.set_child_interval_ms(params.branch_interval_ms);
        Self {
            params,
            line,
            controls: Vec::new(),
            bounds: Bounds::EMPTY,
            quality: FxQuality::Full,
        }
    }

    #[must_use]
    pub const fn line(&self) -> &NoiseLine {
        &self.line
    }

    #[must_use]
    pub fn controls(&self) -> &[Point] {
        &self.controls
    }

    fn scaled_layers(&self) -> StrokeLayers {
        let dpr = self.bounds.dpr;
        let layers = self.params.layers().map(|l| l.scaled(dpr));
        self.quality.layers(&layers)
    }
}

impl BorderFx for LightningFx {
    fn name(&self) -> &'static str {
        "lightning"
    }

    fn kind(&self) -> EffectKind {
        EffectKind::Lightning
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.controls.clear();
        if bounds.is_empty() {
            return;
        }
        let dpr = bounds.dpr;
        let shape =
            RoundedRect::from_bounds(bounds, self.params.radius * dpr, self.params.padding * dpr);
        self.controls = shape.control_polygon();
    }

    fn update(&mut self, ctx: &FxContext) {
        self.quality = ctx.quality;
        if !ctx.quality.is_enabled() {
            return;
        }
        if ctx.bounds != self.bounds {
            self.resize(ctx.bounds);
        }
        if self.controls.is_empty() {
            return;
        }
        if ctx.quality.allows_branches() {
            self.line
                .update_scaled(&self.controls, true, ctx.now, ctx.step_scale);
        } else {
            self.line
                .update_without_children(&self.controls, true, ctx.step_scale);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if !self.quality.is_enabled() || self.bounds.is_empty() {
            return;
        }
        let layers = self.scaled_layers();
        surface.stroke_layers(self.line.points(), true, &layers);

        if !self.quality.allows_branches() {
            return;
        }
        let inner = &layers[layers.len().saturating_sub(2)..];
        for child in self.line.children() {
            surface.stroke_layers(child.points(), false, inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardfx_render::RecordingSurface;
    use std::time::Duration;

    fn run(fx: &mut LightningFx, ctx: &mut FxContext, frames: usize) {
        fx.resize(ctx.bounds);
        for _ in 0..frames {
            fx.update(ctx);
            ctx.advance(Duration::from_millis(16));
        }
    }

    #[test]
    fn default_amplitude_is_about_twelve_pixels() {
        let mut fx = LightningFx::new(LightningParams::default(), 1);
        fx.resize(Bounds::new(340.0, 540.0));
        let range = cardfx_core::polyline_length(fx.controls(), true);
        let reach = range * LightningParams::default().line.amplitude;
        assert!((10.0..14.0).contains(&reach), "{reach}");
    }

    #[test]
    fn full_quality_draws_line_and_branches() {
        let bounds = Bounds::new(340.0, 540.0);
        let mut fx = LightningFx::new(LightningParams::default(), 2);
        run(&mut fx, &mut FxContext::new(bounds), 3);
        let mut s = RecordingSurface::with_bounds(bounds);
        fx.draw(&mut s);
        // 3 main layers + 2 per branch.
        assert_eq!(s.stroke_count(), 3 + 2 * 3);
        let closed = s.strokes().filter(|(_, closed, _)| *closed).count();
        assert_eq!(closed, 3);
    }

    #[test]
    fn reduced_quality_drops_blur_and_branches() {
        let bounds = Bounds::new(340.0, 540.0);
        let mut fx = LightningFx::new(LightningParams::default(), 3);
        let mut ctx = FxContext::new(bounds);
        ctx.quality = FxQuality::Reduced;
        run(&mut fx, &mut ctx, 2);
        let mut s = RecordingSurface::with_bounds(bounds);
        fx.draw(&mut s);
        assert_eq!(s.stroke_count(), 3);
        assert!(s.strokes().all(|(_, _, style)| style.blur == 0.0));
    }

    #[test]
    fn minimal_quality_core_only() {
        let bounds = Bounds::new(200.0, 300.0);
        let mut fx = LightningFx::new(LightningParams::default(), 4);
        let mut ctx = FxContext::new(bounds);
        ctx.quality = FxQuality::Minimal;
        run(&mut fx, &mut ctx, 2);
        let mut s = RecordingSurface::with_bounds(bounds);
        fx.draw(&mut s);
        let styles: Vec<_> = s.strokes().map(|(_, _, st)| *st).collect();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].color, PackedRgba::rgb(255, 179, 128));
        assert_eq!(styles[0].width, 2.0);
    }

    #[test]
    fn layers_scale_with_dpr() {
        let bounds = Bounds::from_css(170.0, 270.0, 2.0);
        let mut fx = LightningFx::new(LightningParams::default(), 5);
        run(&mut fx, &mut FxContext::new(bounds), 1);
        let mut s = RecordingSurface::with_bounds(bounds);
        fx.draw(&mut s);
        let widest = s.strokes().map(|(_, _, st)| st.width).fold(0.0, f64::max);
        assert_eq!(widest, 16.0);
    }

    #[test]
    fn points_stay_near_the_border() {
        let bounds = Bounds::new(340.0, 540.0);
        let mut fx = LightningFx::new(LightningParams::default(), 6);
        let mut ctx = FxContext::new(bounds);
        run(&mut fx, &mut ctx, 40);
        let pts = fx.line().points();
        assert_eq!(pts.len(), 12 * 8);
        assert!(pts.iter().all(|p| p.x > -20.0 && p.x < 360.0 && p.y > -20.0 && p.y < 560.0));
    }

    #[test]
    fn same_seed_same_frame() {
        let bounds = Bounds::new(340.0, 540.0);
        let render = |seed| {
            let mut fx = LightningFx::new(LightningParams::default(), seed);
            run(&mut fx, &mut FxContext::new(bounds), 10);
            let mut s = RecordingSurface::with_bounds(bounds);
            fx.draw(&mut s);
            s.frame_hash()
        };
        assert_eq!(render(42), render(42));
    }

    #[test]
    fn zero_branches() {
        let params = LightningParams {
            branches: 0,
            ..LightningParams::default()
        };
        let bounds = Bounds::new(300.0, 300.0);
        let mut fx = LightningFx::new(params, 7);
        run(&mut fx, &mut FxContext::new(bounds), 2);
        let mut s = RecordingSurface::with_bounds(bounds);
        fx.draw(&mut s);
        assert_eq!(s.stroke_count(), 3);
    }
}
