//! Property-based invariant tests for color parsing and ramps.
//!
//! 1. Hex text produced from any color parses back to the same color
//! 2. Ramp length always matches the request (minimum 1)
//! 3. Lerp stays within the channel bounds of its endpoints

use cardfx_render::PackedRgba;
use cardfx_style::{ColorRamp, ColorStop, CssColor, lerp_color, parse_color};
use proptest::prelude::*;

fn arb_color() -> impl Strategy<Value = PackedRgba> {
    any::<u32>().prop_map(PackedRgba)
}

proptest! {
    #[test]
    fn hex_text_round_trips(c in arb_color()) {
        let text = String::from(CssColor(c));
        prop_assert_eq!(parse_color(&text), Ok(c));
    }

    #[test]
    fn ramp_len_matches(len in 0usize..256, a in arb_color(), b in arb_color()) {
        let stops = [ColorStop::new(0.0, a), ColorStop::new(1.0, b)];
        let ramp = ColorRamp::from_stops(&stops, len);
        prop_assert_eq!(ramp.len(), len.max(1));
    }

    #[test]
    fn lerp_within_endpoints(a in arb_color(), b in arb_color(), t in 0.0f64..=1.0) {
        let m = lerp_color(a, b, t);
        for (x, y, v) in [(a.r(), b.r(), m.r()), (a.g(), b.g(), m.g()), (a.b(), b.b(), m.b()), (a.a(), b.a(), m.a())] {
            prop_assert!(v >= x.min(y) && v <= x.max(y), "{v} not in [{x}, {y}]");
        }
    }
}
