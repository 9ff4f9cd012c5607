#![forbid(unsafe_code)]

//! Core primitives for cardfx border effects.
//!
//! Everything here is pure and platform-independent:
//!
//! - [`geometry`]: points and container bounds in device pixels.
//! - [`noise`]: seeded xorshift PRNG and 2D Perlin noise.
//! - [`spline`]: Catmull-Rom smoothing of control polygons.
//! - [`perimeter`]: arc-length mapping around a rounded rectangle.

pub mod geometry;
pub mod noise;
pub mod perimeter;
pub mod spline;

pub use geometry::{Bounds, Point};
pub use noise::{PerlinNoise, Xorshift};
pub use perimeter::{PerimeterSample, RoundedRect};
pub use spline::{catmull_rom, polyline_length, spline, spline_into};
