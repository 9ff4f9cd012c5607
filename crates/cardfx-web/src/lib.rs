#![forbid(unsafe_code)]

//! Browser host for cardfx borders.
//!
//! [`BorderRunner`] (wasm32 only) binds a border effect to an
//! `HtmlCanvasElement`: it re-measures the canvas every animation frame,
//! forwards mouse movement as pointer input, and paints each frame through
//! the 2D context. `destroy()` cancels the pending animation frame and
//! removes every listener it added.
//!
//! The frame logic lives in a platform-independent runner core so it can
//! be tested natively.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::BorderRunner;

// Runner core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod runner_core;
