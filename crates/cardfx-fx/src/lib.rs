#![forbid(unsafe_code)]

//! Procedural animated borders for rectangular cards.
//!
//! Every effect implements [`BorderFx`]: the host measures the container,
//! calls [`BorderFx::resize`] on size changes, then [`BorderFx::update`] and
//! [`BorderFx::draw`] once per animation frame against a
//! [`cardfx_render::Surface`].
//!
//! ```
//! use std::time::Duration;
//! use cardfx_core::Bounds;
//! use cardfx_fx::{EffectKind, FxContext, FxParams, build_effect};
//! use cardfx_render::{RecordingSurface, Surface};
//!
//! let bounds = Bounds::new(340.0, 540.0);
//! let mut fx = build_effect(EffectKind::Lightning, &FxParams::default(), 42);
//! fx.resize(bounds);
//!
//! let mut ctx = FxContext::new(bounds);
//! let mut surface = RecordingSurface::with_bounds(bounds);
//! for _ in 0..3 {
//!     surface.clear();
//!     fx.update(&ctx);
//!     fx.draw(&mut surface);
//!     ctx.advance(Duration::from_millis(16));
//! }
//! assert!(surface.stroke_count() > 0);
//! ```

pub mod visual_fx;

pub use visual_fx::{
    BinaryFx, BinaryParams, BorderFx, CellGrid, CellStyle, ChildId, ChildLine, Direction,
    EffectKind, FireFx, FireParams, FrostFx, FrostParams, FxContext, FxParams, FxQuality, GlowFx,
    GlowParams, Ignition, LightningFx, LightningParams, NoiseLine, NoiseOptions, SPREAD_FROM,
    UnknownEffect, build_effect, fire_stops,
};
