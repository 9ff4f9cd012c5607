#![forbid(unsafe_code)]

//! Headless recording surface for tests and deterministic replay.
//!
//! [`RecordingSurface`] stores every draw call as a [`DrawCmd`] instead of
//! rasterizing it. Tests inspect the command list; hosts that replay frames
//! elsewhere (the web runner, snapshot tooling) hash it with
//! [`RecordingSurface::frame_hash`].
//!
//! # Example
//!
//! ```
//! use cardfx_core::Point;
//! use cardfx_render::{PackedRgba, RecordingSurface, StrokeStyle, Surface};
//!
//! let mut s = RecordingSurface::new(100.0, 50.0);
//! s.stroke_path(
//!     &[Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
//!     false,
//!     &StrokeStyle::new(PackedRgba::WHITE, 1.0),
//! );
//! assert_eq!(s.stroke_count(), 1);
//! ```

use cardfx_core::{Bounds, Point};

use crate::color::PackedRgba;
use crate::surface::{Rect, StrokeStyle, Surface};

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear,
    Stroke {
        points: Vec<Point>,
        closed: bool,
        style: StrokeStyle,
    },
    FillRect {
        rect: Rect,
        color: PackedRgba,
    },
    Glyph {
        glyph: char,
        at: Point,
        size: f64,
        color: PackedRgba,
    },
}

/// A [`Surface`] that records instead of drawing.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    bounds: Bounds,
    commands: Vec<DrawCmd>,
}

const FNV64_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV64_PRIME: u64 = 0x0100_0000_01b3;

impl RecordingSurface {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_bounds(Bounds::new(width, height))
    }

    #[must_use]
    pub fn with_bounds(bounds: Bounds) -> Self {
        Self {
            bounds,
            commands: Vec::new(),
        }
    }

    /// Change the reported bounds (host resize).
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    /// Drain recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCmd> {
        std::mem::take(&mut self.commands)
    }

    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Stroke { .. }))
            .count()
    }

    #[must_use]
    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillRect { .. }))
            .count()
    }

    #[must_use]
    pub fn glyph_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Glyph { .. }))
            .count()
    }

    /// Stroked paths in draw order.
    pub fn strokes(&self) -> impl Iterator<Item = (&[Point], bool, &StrokeStyle)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCmd::Stroke {
                points,
                closed,
                style,
            } => Some((points.as_slice(), *closed, style)),
            _ => None,
        })
    }

    /// Issue every recorded command against `target`, in order.
    pub fn replay(&self, target: &mut dyn Surface) {
        for cmd in &self.commands {
            match cmd {
                DrawCmd::Clear => target.clear(),
                DrawCmd::Stroke {
                    points,
                    closed,
                    style,
                } => target.stroke_path(points, *closed, style),
                DrawCmd::FillRect { rect, color } => target.fill_rect(*rect, *color),
                DrawCmd::Glyph {
                    glyph,
                    at,
                    size,
                    color,
                } => target.fill_glyph(*glyph, *at, *size, *color),
            }
        }
    }

    /// FNV-1a 64 digest over the recorded commands.
    ///
    /// Floats are hashed by bit pattern, so two frames hash equal only when
    /// they are bit-identical.
    #[must_use]
    pub fn frame_hash(&self) -> u64 {
        let mut h = FNV64_OFFSET_BASIS;
        let mut feed = |bytes: &[u8]| {
            for &b in bytes {
                h ^= u64::from(b);
                h = h.wrapping_mul(FNV64_PRIME);
            }
        };
        let point = |p: &Point| {
            let mut buf = [0u8; 16];
            buf[..8].copy_from_slice(&p.x.to_bits().to_le_bytes());
            buf[8..].copy_from_slice(&p.y.to_bits().to_le_bytes());
            buf
        };
        for cmd in &self.commands {
            match cmd {
                DrawCmd::Clear => feed(&[0]),
                DrawCmd::Stroke {
                    points,
                    closed,
                    style,
                } => {
                    feed(&[1, u8::from(*closed)]);
                    feed(&style.color.0.to_le_bytes());
                    feed(&style.width.to_bits().to_le_bytes());
                    feed(&style.blur.to_bits().to_le_bytes());
                    for p in points {
                        feed(&point(p));
                    }
                }
                DrawCmd::FillRect { rect, color } => {
                    feed(&[2]);
                    for v in [rect.x, rect.y, rect.width, rect.height] {
                        feed(&v.to_bits().to_le_bytes());
                    }
                    feed(&color.0.to_le_bytes());
                }
                DrawCmd::Glyph {
                    glyph,
                    at,
                    size,
                    color,
                } => {
                    feed(&[3]);
                    feed(&u32::from(*glyph).to_le_bytes());
                    feed(&point(at));
                    feed(&size.to_bits().to_le_bytes());
                    feed(&color.0.to_le_bytes());
                }
            }
        }
        h
    }
}

impl Surface for RecordingSurface {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCmd::Clear);
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, style: &StrokeStyle) {
        if points.len() < 2 {
            return;
        }
        self.commands.push(DrawCmd::Stroke {
            points: points.to_vec(),
            closed,
            style: *style,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: PackedRgba) {
        if rect.is_empty() || color.is_transparent() {
            return;
        }
        self.commands.push(DrawCmd::FillRect { rect, color });
    }

    fn fill_glyph(&mut self, glyph: char, at: Point, size: f64, color: PackedRgba) {
        self.commands.push(DrawCmd::Glyph {
            glyph,
            at,
            size,
            color,
        });
    }
}
