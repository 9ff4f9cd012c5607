//! Benchmarks for the software rasterizer.
//!
//! Performance budgets:
//! - 340x540 closed border stroke, 2px core: < 1ms (panic at 5ms)
//! - same stroke with 10px blur halo: < 4ms (panic at 20ms)
//! - 43x68 cell grid fill (8px cells): < 500μs (panic at 2ms)
//!
//! Run with: cargo bench -p cardfx-render --bench pixmap_bench

use std::hint::black_box;

use cardfx_core::RoundedRect;
use cardfx_render::{PackedRgba, Pixmap, Rect, StrokeStyle, Surface};
use criterion::{Criterion, criterion_group, criterion_main};

fn border_points() -> Vec<cardfx_core::Point> {
    RoundedRect::new(340.0, 540.0, 32.0, 8.0)
        .sample_evenly(400)
        .into_iter()
        .map(|s| s.point)
        .collect()
}

fn bench_strokes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixmap/stroke");
    let pts = border_points();
    let mut pix = Pixmap::new(340, 540);

    group.bench_function("border_core_2px", |b| {
        let style = StrokeStyle::new(PackedRgba::rgb(255, 179, 128), 2.0).rounded();
        b.iter(|| {
            pix.clear();
            pix.stroke_path(black_box(&pts), true, &style);
        })
    });

    group.bench_function("border_blur_10px", |b| {
        let style = StrokeStyle::new(PackedRgba::rgba(221, 132, 72, 51), 8.0).with_blur(10.0);
        b.iter(|| {
            pix.clear();
            pix.stroke_path(black_box(&pts), true, &style);
        })
    });

    group.finish();
}

fn bench_cell_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixmap/cells");
    let mut pix = Pixmap::new(340, 540);
    group.bench_function("grid_43x68", |b| {
        b.iter(|| {
            pix.clear();
            for row in 0..68 {
                for col in 0..43 {
                    let color = PackedRgba::rgba((col * 5) as u8, (row * 3) as u8, 80, 255);
                    pix.fill_rect(
                        Rect::new(f64::from(col) * 8.0, f64::from(row) * 8.0, 8.0, 8.0),
                        black_box(color),
                    );
                }
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_strokes, bench_cell_fill);
criterion_main!(benches);
