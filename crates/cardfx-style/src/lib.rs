#![forbid(unsafe_code)]

//! Color handling for cardfx: CSS color text, gradient stops, and ramps.

pub mod color;
pub mod ramp;

pub use color::{ColorParseError, CssColor, lerp_color, named_color, parse_color};
pub use ramp::{ColorRamp, ColorStop, gradient_at};
