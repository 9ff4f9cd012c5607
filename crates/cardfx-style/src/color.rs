#![forbid(unsafe_code)]

//! CSS color text to [`PackedRgba`].
//!
//! Accepts the forms effect profiles actually use: `#rgb`, `#rgba`,
//! `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)` and a table of
//! named colors. Matching is case-insensitive and ignores surrounding
//! whitespace.

use std::fmt;
use std::str::FromStr;

use cardfx_render::PackedRgba;

/// Why a color string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Empty input.
    Empty,
    /// `#...` with the wrong length or non-hex digits.
    InvalidHex(String),
    /// `rgb(...)` / `rgba(...)` with a bad argument list.
    InvalidFunction(String),
    /// Not a known color name.
    UnknownName(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty color string"),
            Self::InvalidHex(s) => write!(f, "invalid hex color: {s}"),
            Self::InvalidFunction(s) => write!(f, "invalid color function: {s}"),
            Self::UnknownName(s) => write!(f, "unknown color name: {s}"),
        }
    }
}

impl std::error::Error for ColorParseError {}

/// Named colors, sorted by name for binary search.
const NAMED: &[(&str, PackedRgba)] = &[
    ("aqua", PackedRgba::rgb(0, 255, 255)),
    ("black", PackedRgba::rgb(0, 0, 0)),
    ("blue", PackedRgba::rgb(0, 0, 255)),
    ("crimson", PackedRgba::rgb(220, 20, 60)),
    ("cyan", PackedRgba::rgb(0, 255, 255)),
    ("darkorange", PackedRgba::rgb(255, 140, 0)),
    ("darkslateblue", PackedRgba::rgb(72, 61, 139)),
    ("deepskyblue", PackedRgba::rgb(0, 191, 255)),
    ("fuchsia", PackedRgba::rgb(255, 0, 255)),
    ("gold", PackedRgba::rgb(255, 215, 0)),
    ("gray", PackedRgba::rgb(128, 128, 128)),
    ("green", PackedRgba::rgb(0, 128, 0)),
    ("grey", PackedRgba::rgb(128, 128, 128)),
    ("hotpink", PackedRgba::rgb(255, 105, 180)),
    ("indigo", PackedRgba::rgb(75, 0, 130)),
    ("lavender", PackedRgba::rgb(230, 230, 250)),
    ("lightblue", PackedRgba::rgb(173, 216, 230)),
    ("lightcyan", PackedRgba::rgb(224, 255, 255)),
    ("lime", PackedRgba::rgb(0, 255, 0)),
    ("magenta", PackedRgba::rgb(255, 0, 255)),
    ("orange", PackedRgba::rgb(255, 165, 0)),
    ("orangered", PackedRgba::rgb(255, 69, 0)),
    ("purple", PackedRgba::rgb(128, 0, 128)),
    ("red", PackedRgba::rgb(255, 0, 0)),
    ("skyblue", PackedRgba::rgb(135, 206, 235)),
    ("tomato", PackedRgba::rgb(255, 99, 71)),
    ("transparent", PackedRgba::TRANSPARENT),
    ("violet", PackedRgba::rgb(238, 130, 238)),
    ("white", PackedRgba::rgb(255, 255, 255)),
    ("yellow", PackedRgba::rgb(255, 255, 0)),
];

/// Look up a named color (case-insensitive).
#[must_use]
pub fn named_color(name: &str) -> Option<PackedRgba> {
    let lower = name.trim().to_ascii_lowercase();
    NAMED
        .binary_search_by(|(n, _)| n.cmp(&lower.as_str()))
        .ok()
        .map(|i| NAMED[i].1)
}

/// Parse CSS color text.
pub fn parse_color(input: &str) -> Result<PackedRgba, ColorParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ColorParseError::Empty);
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(s.to_string()));
    }
    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
    {
        return parse_rgb_args(args).ok_or_else(|| ColorParseError::InvalidFunction(s.to_string()));
    }
    named_color(&lower).ok_or_else(|| ColorParseError::UnknownName(s.to_string()))
}

fn parse_hex(hex: &str) -> Option<PackedRgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 | 4 => {
            let r = nibble(0)? * 17;
            let g = nibble(1)? * 17;
            let b = nibble(2)? * 17;
            let a = if hex.len() == 4 { nibble(3)? * 17 } else { 255 };
            Some(PackedRgba::rgba(r, g, b, a))
        }
        6 | 8 => {
            let a = if hex.len() == 8 { byte(6)? } else { 255 };
            Some(PackedRgba::rgba(byte(0)?, byte(2)?, byte(4)?, a))
        }
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<PackedRgba> {
    let body = args.strip_suffix(')')?;
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v: f64 = s.parse().ok()?;
        v.is_finite().then(|| v.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(a) => {
            let v: f64 = a.parse().ok()?;
            if !v.is_finite() {
                return None;
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(PackedRgba::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

/// A color that round-trips through CSS text.
///
/// Used in configuration so users write `"#ffb380"` or `"tomato"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct CssColor(pub PackedRgba);

impl FromStr for CssColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s).map(Self)
    }
}

impl TryFrom<String> for CssColor {
    type Error = ColorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CssColor> for String {
    fn from(c: CssColor) -> Self {
        let p = c.0;
        if p.a() == 255 {
            format!("#{:02x}{:02x}{:02x}", p.r(), p.g(), p.b())
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", p.r(), p.g(), p.b(), p.a())
        }
    }
}

impl From<CssColor> for PackedRgba {
    fn from(c: CssColor) -> Self {
        c.0
    }
}

/// Fixed-point lerp of all four channels.
#[inline]
#[must_use]
pub fn lerp_color(a: PackedRgba, b: PackedRgba, t: f64) -> PackedRgba {
    let t256 = (t.clamp(0.0, 1.0) * 256.0) as u32;
    let inv = 256 - t256;
    let ch = |x: u8, y: u8| ((u32::from(x) * inv + u32::from(y) * t256) >> 8) as u8;
    PackedRgba::rgba(
        ch(a.r(), b.r()),
        ch(a.g(), b.g()),
        ch(a.b(), b.b()),
        ch(a.a(), b.a()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_table_is_sorted() {
        assert!(NAMED.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_color("#00FF00"), Ok(PackedRgba::rgb(0, 255, 0)));
        assert_eq!(parse_color("#fff"), Ok(PackedRgba::WHITE));
        assert_eq!(parse_color("#ffb380"), Ok(PackedRgba::rgb(255, 179, 128)));
        assert_eq!(parse_color("#00000080"), Ok(PackedRgba::rgba(0, 0, 0, 128)));
        assert_eq!(parse_color("#f008"), Ok(PackedRgba::rgba(255, 0, 0, 136)));
    }

    #[test]
    fn parses_functions() {
        assert_eq!(
            parse_color("rgba(221, 132, 72, 0.2)"),
            Ok(PackedRgba::rgba(221, 132, 72, 51))
        );
        assert_eq!(
            parse_color("RGB(1,2,3)"),
            Ok(PackedRgba::rgb(1, 2, 3))
        );
        assert_eq!(
            parse_color("rgba(0,0,0,0)"),
            Ok(PackedRgba::TRANSPARENT)
        );
    }

    #[test]
    fn parses_names() {
        assert_eq!(parse_color("Lavender"), Ok(PackedRgba::rgb(230, 230, 250)));
        assert_eq!(parse_color("  tomato "), Ok(PackedRgba::rgb(255, 99, 71)));
        assert_eq!(parse_color("transparent"), Ok(PackedRgba::TRANSPARENT));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_color(""), Err(ColorParseError::Empty));
        assert!(matches!(parse_color("#12"), Err(ColorParseError::InvalidHex(_))));
        assert!(matches!(parse_color("#gggggg"), Err(ColorParseError::InvalidHex(_))));
        assert!(matches!(
            parse_color("rgb(1,2)"),
            Err(ColorParseError::InvalidFunction(_))
        ));
        assert!(matches!(
            parse_color("rgba(1,2,3,nan)"),
            Err(ColorParseError::InvalidFunction(_))
        ));
        assert!(matches!(
            parse_color("blurple"),
            Err(ColorParseError::UnknownName(_))
        ));
    }

    #[test]
    fn css_color_text_round_trip() {
        let c: CssColor = "hotpink".parse().unwrap();
        assert_eq!(String::from(c), "#ff69b4");
        let t: CssColor = "rgba(0,0,0,0.5)".parse().unwrap();
        assert_eq!(String::from(t), "#00000080");
    }

    #[test]
    fn lerp_endpoints_and_alpha() {
        let a = PackedRgba::rgba(10, 20, 30, 0);
        let b = PackedRgba::rgba(200, 210, 220, 255);
        assert_eq!(lerp_color(a, b, 0.0), a);
        assert_eq!(lerp_color(a, b, 1.0), b);
        assert_eq!(lerp_color(a, b, 0.5).a(), 127);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn css_color_serde() {
        let c: CssColor = serde_json::from_str("\"#a94cff\"").unwrap();
        assert_eq!(c.0, PackedRgba::rgb(169, 76, 255));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#a94cff\"");
        assert!(serde_json::from_str::<CssColor>("\"nope\"").is_err());
    }
}
