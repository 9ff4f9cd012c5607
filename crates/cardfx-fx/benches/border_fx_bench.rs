//! Benchmarks for the border effects.
//!
//! Performance budgets (340x540 card, one update + draw into a recorder):
//! - NoiseLine closed update, 96 points + 3 children: < 50μs (panic at 250μs)
//! - LightningFx frame Full: < 100μs (panic at 500μs)
//! - FireFx frame (43x68 cells): < 300μs (panic at 1.5ms)
//! - BinaryFx frame: < 50μs (panic at 250μs)
//! - FrostFx frame (~410 samples, 3x3 octaves): < 400μs (panic at 2ms)
//! - GlowFx frame (96 segments): < 50μs (panic at 250μs)
//!
//! Run with: cargo bench -p cardfx-fx --bench border_fx_bench

use std::hint::black_box;
use std::time::Duration;

use cardfx_core::{Bounds, RoundedRect};
use cardfx_fx::{EffectKind, FxContext, FxParams, NoiseLine, NoiseOptions, build_effect};
use cardfx_render::{RecordingSurface, Surface};
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_noise_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("border_fx/noise_line");
    let controls = RoundedRect::new(340.0, 540.0, 36.0, 4.0).control_polygon();

    group.bench_function("closed_96_with_children", |b| {
        let mut line = NoiseLine::new(8, NoiseOptions::default(), 1);
        for _ in 0..3 {
            line.create_child(NoiseOptions::default());
        }
        let mut now = Duration::ZERO;
        b.iter(|| {
            now += Duration::from_millis(16);
            line.update(black_box(&controls), true, now);
            black_box(line.points().len())
        })
    });

    group.finish();
}

fn bench_effect_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("border_fx/frame");
    let bounds = Bounds::new(340.0, 540.0);
    let params = FxParams::default();

    for kind in EffectKind::ALL {
        group.bench_function(kind.name(), |b| {
            let mut fx = build_effect(kind, &params, 7);
            fx.resize(bounds);
            let mut ctx = FxContext::new(bounds);
            let mut surface = RecordingSurface::with_bounds(bounds);
            b.iter(|| {
                surface.clear();
                fx.update(&ctx);
                fx.draw(&mut surface);
                ctx.advance(Duration::from_millis(16));
                black_box(surface.commands().len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_noise_line, bench_effect_frames);
criterion_main!(benches);
