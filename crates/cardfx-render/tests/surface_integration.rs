//! Cross-surface checks: the recorder and the rasterizer agree on what a
//! border stroke touches.

use cardfx_core::{Point, RoundedRect};
use cardfx_render::{DrawCmd, PackedRgba, Pixmap, RecordingSurface, StrokeStyle, Surface};

fn border(width: f64, height: f64) -> Vec<Point> {
    RoundedRect::new(width, height, 16.0, 4.0)
        .sample_evenly(200)
        .into_iter()
        .map(|s| s.point)
        .collect()
}

fn draw<S: Surface>(surface: &mut S) {
    let b = surface.bounds();
    let pts = border(b.width, b.height);
    surface.clear();
    surface.stroke_layers(
        &pts,
        true,
        &[
            StrokeStyle::new(PackedRgba::rgba(221, 132, 72, 51), 8.0).with_blur(10.0),
            StrokeStyle::new(PackedRgba::rgb(255, 179, 128), 2.0).rounded(),
        ],
    );
}

#[test]
fn recorder_captures_layers_in_order() {
    let mut rec = RecordingSurface::new(120.0, 80.0);
    draw(&mut rec);
    let cmds = rec.commands();
    assert_eq!(cmds.len(), 3);
    assert_eq!(cmds[0], DrawCmd::Clear);
    let widths: Vec<f64> = rec.strokes().map(|(_, closed, s)| {
        assert!(closed);
        s.width
    }).collect();
    assert_eq!(widths, vec![8.0, 2.0]);
}

#[test]
fn rasterized_border_touches_perimeter_not_center() {
    let mut pix = Pixmap::new(120, 80);
    draw(&mut pix);
    // Top edge runs along y = 4.
    let top = pix.pixel(60, 4).unwrap_or_default();
    assert!(top.a() > 200, "{top:?}");
    // Card interior stays clear.
    assert!(pix.pixel(60, 40).unwrap_or_default().is_transparent());
}

#[test]
fn recorder_hash_is_deterministic_across_runs() {
    let mut a = RecordingSurface::new(200.0, 100.0);
    let mut b = RecordingSurface::new(200.0, 100.0);
    draw(&mut a);
    draw(&mut b);
    assert_eq!(a.frame_hash(), b.frame_hash());
}
