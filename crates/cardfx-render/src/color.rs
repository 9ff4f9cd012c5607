#![forbid(unsafe_code)]

//! Packed RGBA color.

/// Non-premultiplied RGBA packed into a `u32` as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    #[inline]
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    #[must_use]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    #[must_use]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    #[must_use]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    #[must_use]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a() == 0
    }

    /// Same color with alpha scaled by `opacity` in `[0, 1]`.
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (f64::from(self.a()) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self::rgba(self.r(), self.g(), self.b(), a)
    }

    /// Alpha as a float in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn alpha_f64(self) -> f64 {
        f64::from(self.a()) / 255.0
    }

    /// Source-over composite of `self` onto `dst`.
    #[must_use]
    pub fn over(self, dst: Self) -> Self {
        let sa = u32::from(self.a());
        if sa == 255 {
            return self;
        }
        if sa == 0 {
            return dst;
        }
        let da = u32::from(dst.a());
        let inv = 255 - sa;
        // out_a = sa + da * (1 - sa), all scaled by 255.
        let out_a = sa * 255 + da * inv;
        if out_a == 0 {
            return Self::TRANSPARENT;
        }
        let ch = |s: u8, d: u8| -> u8 {
            let num = u32::from(s) * sa * 255 + u32::from(d) * da * inv;
            ((num + out_a / 2) / out_a).min(255) as u8
        };
        Self::rgba(
            ch(self.r(), dst.r()),
            ch(self.g(), dst.g()),
            ch(self.b(), dst.b()),
            ((out_a + 127) / 255).min(255) as u8,
        )
    }

    /// CSS `rgba(r,g,b,a)` text, used by canvas hosts.
    #[must_use]
    pub fn to_css(self) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            self.r(),
            self.g(),
            self.b(),
            self.alpha_f64()
        )
    }
}
