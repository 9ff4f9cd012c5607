#![forbid(unsafe_code)]

//! Fire border: a [`CellGrid`] painted through a flame color ramp.
//!
//! The ring of the card (and the cell under the pointer) burns every step;
//! heat climbs inward from there. Cells are drawn as solid blocks or, in
//! [`CellStyle::Bits`], as `0`/`1` glyphs.

use cardfx_core::{Bounds, Xorshift};
use cardfx_render::{PackedRgba, Rect, Surface};
use cardfx_style::{ColorRamp, ColorStop};
use serde::{Deserialize, Serialize};

use super::cell_grid::{CellGrid, Ignition};
use crate::visual_fx::{BorderFx, EffectKind, FxContext, FxQuality};

/// Most automaton steps run in a single frame when catching up in
/// elapsed-time mode.
const MAX_STEPS_PER_FRAME: u32 = 4;

/// Default flame gradient, hottest first.
#[must_use]
pub fn fire_stops() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, PackedRgba::rgb(230, 230, 250)),
        ColorStop::new(0.1, PackedRgba::rgb(255, 255, 0)),
        ColorStop::new(0.3, PackedRgba::rgb(255, 215, 0)),
        ColorStop::new(0.5, PackedRgba::rgb(255, 105, 180)),
        ColorStop::new(0.6, PackedRgba::rgb(255, 99, 71)),
        ColorStop::new(0.8, PackedRgba::rgb(72, 61, 139)),
        ColorStop::new(1.0, PackedRgba::TRANSPARENT),
    ]
}

/// How a cell is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStyle {
    #[default]
    Block,
    Bits,
}

/// Fire tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireParams {
    /// Cell edge in CSS pixels (scaled by dpr).
    pub cell_size: f64,
    /// Ramp entries.
    pub depth: usize,
    pub stops: Vec<ColorStop>,
    /// CSS pixels of grid above the card's top edge.
    pub top_overflow: f64,
    pub style: CellStyle,
}

impl Default for FireParams {
    fn default() -> Self {
        Self {
            cell_size: 8.0,
            depth: 24,
            stops: fire_stops(),
            top_overflow: 0.0,
            style: CellStyle::Block,
        }
    }
}

/// Cellular fire border.
#[derive(Debug, Clone)]
pub struct FireFx {
    params: FireParams,
    ramp: ColorRamp,
    grid: CellGrid,
    rng: Xorshift,
    bounds: Bounds,
    pending_steps: f64,
    quality: FxQuality,
}

impl FireFx {
    #[must_use]
    pub fn new(params: FireParams, seed: u32) -> Self {
        let ramp = ColorRamp::from_stops(&params.stops, params.depth);
        let grid = CellGrid::new(0.0, 0.0, 1.0, 1.0, ramp.len());
        Self {
            params,
            ramp,
            grid,
            rng: Xorshift::new(seed),
            bounds: Bounds::EMPTY,
            pending_steps: 0.0,
            quality: FxQuality::Full,
        }
    }

    #[must_use]
    pub const fn params(&self) -> &FireParams {
        &self.params
    }

    #[must_use]
    pub const fn grid(&self) -> &CellGrid {
        &self.grid
    }

    #[must_use]
    pub const fn ramp(&self) -> &ColorRamp {
        &self.ramp
    }

    fn cell_px(&self) -> f64 {
        let size = if self.params.cell_size > 0.0 { self.params.cell_size } else { 8.0 };
        size * self.bounds.dpr
    }

    fn steps_for(&mut self, step_scale: f64) -> u32 {
        self.pending_steps += step_scale.max(0.0);
        let steps = (self.pending_steps.floor() as u32).min(MAX_STEPS_PER_FRAME);
        self.pending_steps -= f64::from(steps);
        // Drop backlog beyond one frame's worth.
        if self.pending_steps >= 1.0 {
            self.pending_steps = self.pending_steps.fract();
        }
        steps
    }
}

impl BorderFx for FireFx {
    fn name(&self) -> &'static str {
        "fire"
    }

    fn kind(&self) -> EffectKind {
        EffectKind::Fire
    }

    fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        let cell = self.cell_px();
        self.grid = CellGrid::new(bounds.width, bounds.height, cell, cell, self.ramp.len());
    }

    fn update(&mut self, ctx: &FxContext) {
        self.quality = ctx.quality;
        if !ctx.quality.is_enabled() {
            return;
        }
        if ctx.bounds != self.bounds {
            self.resize(ctx.bounds);
        }
        if self.grid.is_empty() {
            return;
        }
        let ignition = Ignition {
            top_overflow: self.params.top_overflow * self.bounds.dpr,
            pointer: ctx.pointer,
        };
        for _ in 0..self.steps_for(ctx.step_scale) {
            self.grid.step(&ignition, &mut self.rng);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if !self.quality.is_enabled() || self.grid.is_empty() {
            return;
        }
        let (cw, ch) = self.grid.cell_size();
        let bits = self.params.style == CellStyle::Bits && self.quality != FxQuality::Minimal;
        let cols = self.grid.cols();
        for (i, &idx) in self.grid.indices().iter().enumerate() {
            let color = self.ramp.get(idx);
            if color.is_transparent() {
                continue;
            }
            let origin = self.grid.origin(i % cols, i / cols);
            if bits {
                let glyph = if idx % 2 == 0 { '1' } else { '0' };
                let center = cardfx_core::Point::new(origin.x + cw * 0.5, origin.y + ch * 0.5);
                surface.fill_glyph(glyph, center, ch, color);
            } else {
                surface.fill_rect(Rect::new(origin.x, origin.y, cw, ch), color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardfx_core::Point;
    use cardfx_render::{DrawCmd, RecordingSurface};
    use cardfx_style::named_color;

    fn run(fx: &mut FireFx, ctx: &mut FxContext, frames: usize) {
        fx.resize(ctx.bounds);
        for _ in 0..frames {
            fx.update(ctx);
            ctx.advance(std::time::Duration::from_millis(16));
        }
    }

    #[test]
    fn stops_match_css_names() {
        let names = [
            "lavender",
            "yellow",
            "gold",
            "hotpink",
            "tomato",
            "darkslateblue",
            "transparent",
        ];
        for (stop, name) in fire_stops().iter().zip(names) {
            assert_eq!(Some(stop.color), named_color(name), "{name}");
        }
    }

    #[test]
    fn ramp_runs_hot_to_clear() {
        let fx = FireFx::new(FireParams::default(), 1);
        assert_eq!(fx.ramp().len(), 24);
        assert_eq!(fx.ramp().get(0).a(), 255);
        assert!(fx.ramp().get(23).a() < 64);
    }

    #[test]
    fn grid_scales_with_dpr() {
        let mut fx = FireFx::new(FireParams::default(), 1);
        fx.resize(Bounds::with_dpr(160.0, 160.0, 2.0));
        assert_eq!((fx.grid().cols(), fx.grid().rows()), (10, 10));
    }

    #[test]
    fn bottom_row_burns() {
        let mut fx = FireFx::new(FireParams::default(), 2);
        let mut ctx = FxContext::new(Bounds::new(100.0, 100.0));
        run(&mut fx, &mut ctx, 1);
        let rows = fx.grid().rows();
        assert!((0..fx.grid().cols()).all(|c| fx.grid().get(c, rows - 1) == Some(0)));
    }

    #[test]
    fn block_style_fills_rects() {
        let mut fx = FireFx::new(FireParams::default(), 3);
        let mut ctx = FxContext::new(Bounds::new(64.0, 64.0));
        run(&mut fx, &mut ctx, 5);
        let mut s = RecordingSurface::new(64.0, 64.0);
        fx.draw(&mut s);
        assert!(s.fill_count() > 0);
        assert_eq!(s.glyph_count(), 0);
    }

    #[test]
    fn bits_style_draws_glyphs() {
        let params = FireParams {
            style: CellStyle::Bits,
            ..FireParams::default()
        };
        let mut fx = FireFx::new(params, 3);
        let mut ctx = FxContext::new(Bounds::new(64.0, 64.0));
        run(&mut fx, &mut ctx, 5);
        let mut s = RecordingSurface::new(64.0, 64.0);
        fx.draw(&mut s);
        assert_eq!(s.fill_count(), 0);
        assert!(s.commands().iter().all(|c| matches!(
            c,
            DrawCmd::Glyph { glyph: '0' | '1', .. }
        )));
    }

    #[test]
    fn pointer_heats_its_cell() {
        let mut fx = FireFx::new(FireParams::default(), 4);
        let mut ctx = FxContext::new(Bounds::new(200.0, 200.0));
        ctx.pointer = Some(Point::new(100.0, 60.0));
        run(&mut fx, &mut ctx, 1);
        assert_eq!(fx.grid().get(12, 7), Some(0));
    }

    #[test]
    fn elapsed_mode_caps_steps() {
        let mut fx = FireFx::new(FireParams::default(), 5);
        assert_eq!(fx.steps_for(0.5), 0);
        assert_eq!(fx.steps_for(0.5), 1);
        assert_eq!(fx.steps_for(10.0), MAX_STEPS_PER_FRAME);
        assert!(fx.pending_steps < 1.0);
    }

    #[test]
    fn same_seed_same_grid() {
        let bounds = Bounds::new(120.0, 80.0);
        let mut a = FireFx::new(FireParams::default(), 9);
        let mut b = FireFx::new(FireParams::default(), 9);
        run(&mut a, &mut FxContext::new(bounds), 20);
        run(&mut b, &mut FxContext::new(bounds), 20);
        assert_eq!(a.grid().indices(), b.grid().indices());
    }
}
