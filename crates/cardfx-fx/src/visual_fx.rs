#![forbid(unsafe_code)]

//! Border FX primitives.
//!
//! This module defines the stable core types shared by every border effect:
//! - the [`BorderFx`] capability (resize, update, draw)
//! - the per-tick [`FxContext`]
//! - quality tiers ([`FxQuality`])
//! - effect selection ([`EffectKind`], [`FxParams`], [`build_effect`])
//!
//! Design goals:
//! - **Deterministic**: given the same seed and inputs, output is identical.
//! - **Allocation-light**: effects reuse internal buffers between frames.
//! - **Tiny-area safe**: bounds may be zero; nothing panics.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use cardfx_core::{Bounds, Point};
use cardfx_render::{StrokeLayers, StrokeStyle, Surface};
use serde::{Deserialize, Serialize};

pub mod effects;

pub use effects::{
    binary::{BinaryFx, BinaryParams},
    cell_grid::{CellGrid, Direction, Ignition, SPREAD_FROM},
    fire::{CellStyle, FireFx, FireParams, fire_stops},
    frost::{FrostFx, FrostParams},
    glow::{GlowFx, GlowParams},
    lightning::{LightningFx, LightningParams},
    noise_line::{ChildId, ChildLine, NoiseLine, NoiseOptions},
};

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

/// Quality hint for FX implementations.
///
/// - `Full`: every layer, blur halos, branch lines.
/// - `Reduced`: every layer without blur; no branches.
/// - `Minimal`: core layer only.
/// - `Off`: nothing is updated or drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FxQuality {
    Off,
    Minimal,
    Reduced,
    #[default]
    Full,
}

impl FxQuality {
    #[inline]
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }

    #[inline]
    #[must_use]
    pub const fn allows_blur(self) -> bool {
        matches!(self, Self::Full)
    }

    #[inline]
    #[must_use]
    pub const fn allows_branches(self) -> bool {
        matches!(self, Self::Full)
    }

    /// Filter back-to-front stroke layers for this tier.
    ///
    /// The last layer is treated as the core stroke.
    #[must_use]
    pub fn layers(self, layers: &[StrokeStyle]) -> StrokeLayers {
        match self {
            Self::Off => StrokeLayers::new(),
            Self::Minimal => layers.last().copied().into_iter().collect(),
            Self::Reduced => layers.iter().map(|l| l.with_blur(0.0)).collect(),
            Self::Full => layers.iter().copied().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Per-tick input handed to [`BorderFx::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxContext {
    /// Measured container bounds (device pixels).
    pub bounds: Bounds,
    /// Pointer position in device pixels, if over the container.
    pub pointer: Option<Point>,
    /// Frames delivered since mount (starts at 0).
    pub frame: u64,
    /// Host monotonic timestamp of this frame.
    pub now: Duration,
    /// Seconds since mount.
    pub time_seconds: f64,
    /// Multiplier for per-frame constants: 1.0 in per-frame mode, elapsed
    /// frames at the reference rate otherwise.
    pub step_scale: f64,
    pub quality: FxQuality,
}

impl FxContext {
    /// Context for the first frame at `bounds`.
    #[must_use]
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            pointer: None,
            frame: 0,
            now: Duration::ZERO,
            time_seconds: 0.0,
            step_scale: 1.0,
            quality: FxQuality::Full,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Advance to the next frame, `dt` later, in per-frame mode.
    pub fn advance(&mut self, dt: Duration) {
        self.frame += 1;
        self.now += dt;
        self.time_seconds += dt.as_secs_f64();
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A procedural border effect.
///
/// The driver calls [`resize`](Self::resize) when measured bounds change,
/// then [`update`](Self::update) and [`draw`](Self::draw) once per frame.
/// Implementations keep their own state between frames.
pub trait BorderFx {
    /// Human-readable name (debugging / UI).
    fn name(&self) -> &'static str;

    fn kind(&self) -> EffectKind;

    /// Rebuild size-derived state. Called before the first update and on
    /// every bounds change.
    fn resize(&mut self, _bounds: Bounds) {}

    /// Advance internal state by one tick.
    fn update(&mut self, ctx: &FxContext);

    /// Issue draw calls for the current state. The surface is already
    /// cleared.
    fn draw(&self, surface: &mut dyn Surface);
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which border effect to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    #[default]
    Lightning,
    Fire,
    Binary,
    Frost,
    Glow,
}

impl EffectKind {
    pub const ALL: [Self; 5] = [
        Self::Lightning,
        Self::Fire,
        Self::Binary,
        Self::Frost,
        Self::Glow,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lightning => "lightning",
            Self::Fire => "fire",
            Self::Binary => "binary",
            Self::Frost => "frost",
            Self::Glow => "glow",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized effect name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEffect(pub String);

impl fmt::Display for UnknownEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown effect '{}' (expected lightning, fire, binary, frost, or glow)",
            self.0
        )
    }
}

impl std::error::Error for UnknownEffect {}

impl FromStr for EffectKind {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == lower)
            .ok_or_else(|| UnknownEffect(s.to_string()))
    }
}

/// Tuning for every effect. Only the selected effect's entry is used.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FxParams {
    pub lightning: LightningParams,
    pub fire: FireParams,
    pub binary: BinaryParams,
    pub frost: FrostParams,
    pub glow: GlowParams,
}

/// Construct the effect selected by `kind`.
#[must_use]
pub fn build_effect(kind: EffectKind, params: &FxParams, seed: u32) -> Box<dyn BorderFx> {
    tracing::debug!(effect = kind.name(), seed, "building border effect");
    match kind {
        EffectKind::Lightning => Box::new(LightningFx::new(params.lightning.clone(), seed)),
        EffectKind::Fire => Box::new(FireFx::new(params.fire.clone(), seed)),
        EffectKind::Binary => Box::new(BinaryFx::new(params.binary.clone(), seed)),
        EffectKind::Frost => Box::new(FrostFx::new(params.frost.clone())),
        EffectKind::Glow => Box::new(GlowFx::new(params.glow.clone())),
    }
}
