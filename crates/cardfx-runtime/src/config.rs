#![forbid(unsafe_code)]

//! Border configuration.
//!
//! A [`BorderConfig`] is what a host (web page, demo CLI) hands to the
//! runtime: which effect, its shape, seed, quality, and time-step mode, plus
//! optional color overrides. It round-trips through JSON:
//!
//! ```json
//! {
//!   "effect": "fire",
//!   "seed": 7,
//!   "quality": "reduced",
//!   "time_step": { "mode": "elapsed", "reference_hz": 60.0 },
//!   "top_overflow": 24.0,
//!   "primary": "#ffb380"
//! }
//! ```
//!
//! Missing fields take defaults that match the stock look of each effect.

use std::fmt;

use cardfx_core::Xorshift;
use cardfx_fx::{BorderFx, EffectKind, FxParams, FxQuality, build_effect};
use cardfx_style::{ColorParseError, CssColor};
use serde::{Deserialize, Serialize};

use crate::frame_driver::{FrameDriver, TimeStep};
use crate::scheduler::FrameScheduler;

/// Configuration error with field context.
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON text could not be parsed.
    Json(serde_json::Error),
    /// A field holds a value outside its valid range.
    InvalidValue {
        field: &'static str,
        value: String,
        message: &'static str,
    },
    /// A color override is not valid CSS color text.
    Color {
        field: &'static str,
        source: ColorParseError,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, value: impl fmt::Display, message: &'static str) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_string(),
            message,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid config JSON: {e}"),
            Self::InvalidValue {
                field,
                value,
                message,
            } => write!(f, "{field}={value} ({message})"),
            Self::Color { field, source } => write!(f, "{field}: {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Color { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Everything needed to run one border.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    pub effect: EffectKind,
    /// Corner radius override (CSS px) for the selected effect.
    pub radius: Option<f64>,
    /// Inset override (CSS px) for the selected effect.
    pub padding: Option<f64>,
    /// Noise and RNG seed. `None` seeds from the clock.
    pub seed: Option<u32>,
    pub quality: FxQuality,
    pub time_step: TimeStep,
    /// Grid rows above the card for the fire effect (CSS px).
    pub top_overflow: Option<f64>,
    /// Main line / glyph / core color.
    pub primary: Option<CssColor>,
    /// Glow gradient partner color.
    pub secondary: Option<CssColor>,
    /// Per-effect tuning.
    pub params: FxParams,
}

fn check_non_negative(field: &'static str, v: Option<f64>, errors: &mut Vec<ConfigError>) {
    if let Some(v) = v
        && !(v.is_finite() && v >= 0.0)
    {
        errors.push(ConfigError::invalid(field, v, "must be a finite value >= 0"));
    }
}

fn check_positive(field: &'static str, v: f64, errors: &mut Vec<ConfigError>) {
    if !(v.is_finite() && v > 0.0) {
        errors.push(ConfigError::invalid(field, v, "must be a finite value > 0"));
    }
}

fn check_count(field: &'static str, v: usize, errors: &mut Vec<ConfigError>) {
    if v == 0 {
        errors.push(ConfigError::invalid(field, v, "must be at least 1"));
    }
}

impl BorderConfig {
    /// Config with the given effect and defaults for everything else.
    #[must_use]
    pub fn for_effect(effect: EffectKind) -> Self {
        Self {
            effect,
            ..Self::default()
        }
    }

    /// Parse and validate JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every constraint violation, in field order.
    #[must_use]
    pub fn violations(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        check_non_negative("radius", self.radius, &mut errors);
        check_non_negative("padding", self.padding, &mut errors);
        check_non_negative("top_overflow", self.top_overflow, &mut errors);
        if let TimeStep::Elapsed { reference_hz } = self.time_step {
            check_positive("time_step.reference_hz", reference_hz, &mut errors);
        }

        let p = &self.params;
        check_count("params.lightning.segments", p.lightning.segments, &mut errors);
        check_positive("params.lightning.line.base", p.lightning.line.base, &mut errors);
        check_positive("params.lightning.branch.base", p.lightning.branch.base, &mut errors);
        check_positive("params.fire.cell_size", p.fire.cell_size, &mut errors);
        check_count("params.fire.depth", p.fire.depth, &mut errors);
        if p.fire.stops.is_empty() {
            errors.push(ConfigError::invalid("params.fire.stops", "[]", "needs at least one stop"));
        }
        check_positive("params.binary.font_size", p.binary.font_size, &mut errors);
        if !(0.0..=1.0).contains(&p.binary.flip_chance) {
            errors.push(ConfigError::invalid(
                "params.binary.flip_chance",
                p.binary.flip_chance,
                "must be within [0, 1]",
            ));
        }
        check_positive("params.frost.spacing", p.frost.spacing, &mut errors);
        check_positive("params.frost.period_secs", p.frost.period_secs, &mut errors);
        check_count("params.glow.segments", p.glow.segments, &mut errors);
        check_positive("params.glow.period_secs", p.glow.period_secs, &mut errors);
        errors
    }

    /// First constraint violation, if any.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.violations().into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Set [`primary`](Self::primary) from CSS color text.
    pub fn set_primary(&mut self, css: &str) -> Result<(), ConfigError> {
        self.primary = Some(parse_field("primary", css)?);
        Ok(())
    }

    /// Set [`secondary`](Self::secondary) from CSS color text.
    pub fn set_secondary(&mut self, css: &str) -> Result<(), ConfigError> {
        self.secondary = Some(parse_field("secondary", css)?);
        Ok(())
    }

    /// The seed to run with, drawing one from the clock when unset.
    #[must_use]
    pub fn resolved_seed(&self) -> u32 {
        self.seed
            .unwrap_or_else(|| Xorshift::from_clock().next_u32())
    }

    /// Per-effect params with the shape and color overrides applied to the
    /// selected effect.
    #[must_use]
    pub fn effect_params(&self) -> FxParams {
        let mut p = self.params.clone();
        let radius = self.radius.filter(|v| v.is_finite() && *v >= 0.0);
        let padding = self.padding.filter(|v| v.is_finite() && *v >= 0.0);
        match self.effect {
            EffectKind::Lightning => {
                let l = &mut p.lightning;
                apply(&mut l.radius, radius);
                apply(&mut l.padding, padding);
                if let Some(c) = self.primary {
                    l.core = c;
                }
                if let Some(c) = self.secondary {
                    l.glow = c;
                }
            }
            EffectKind::Fire => {
                if let Some(o) = self.top_overflow.filter(|v| v.is_finite() && *v >= 0.0) {
                    p.fire.top_overflow = o;
                }
            }
            EffectKind::Binary => {
                let b = &mut p.binary;
                apply(&mut b.radius, radius);
                apply(&mut b.padding, padding);
                if let Some(c) = self.primary {
                    b.color = c;
                }
            }
            EffectKind::Frost => {
                let f = &mut p.frost;
                apply(&mut f.radius, radius);
                apply(&mut f.padding, padding);
                if let Some(c) = self.primary {
                    f.core = c;
                }
            }
            EffectKind::Glow => {
                let g = &mut p.glow;
                apply(&mut g.radius, radius);
                apply(&mut g.padding, padding);
                if let Some(c) = self.primary {
                    g.primary = c;
                }
                if let Some(c) = self.secondary {
                    g.secondary = c;
                }
            }
        }
        p
    }

    /// Build the configured effect with `seed`.
    #[must_use]
    pub fn build(&self, seed: u32) -> Box<dyn BorderFx> {
        build_effect(self.effect, &self.effect_params(), seed)
    }

    /// Build an unmounted [`FrameDriver`] for this config.
    #[must_use]
    pub fn driver<S: FrameScheduler>(&self, scheduler: S) -> FrameDriver<S> {
        let seed = self.resolved_seed();
        tracing::info!(
            effect = self.effect.name(),
            seed,
            quality = ?self.quality,
            "building border"
        );
        let mut driver = FrameDriver::new(self.build(seed), scheduler, self.time_step);
        driver.set_quality(self.quality);
        driver
    }
}

fn apply(slot: &mut f64, value: Option<f64>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn parse_field(field: &'static str, css: &str) -> Result<CssColor, ConfigError> {
    css.parse::<CssColor>()
        .map_err(|source| ConfigError::Color { field, source })
}
