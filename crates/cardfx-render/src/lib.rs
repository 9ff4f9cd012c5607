#![forbid(unsafe_code)]

//! Drawing kernel for cardfx.
//!
//! Effects render through the [`Surface`] trait. This crate ships two
//! platform-independent implementations: [`RecordingSurface`] for tests and
//! replay, and [`Pixmap`] for software rasterization (PNG export, previews).
//! The browser canvas implementation lives in the web host crate.

pub mod color;
pub mod headless;
pub mod pixmap;
pub mod surface;

pub use color::PackedRgba;
pub use headless::{DrawCmd, RecordingSurface};
pub use pixmap::Pixmap;
pub use surface::{LineCap, LineJoin, Rect, StrokeLayers, StrokeStyle, Surface};
