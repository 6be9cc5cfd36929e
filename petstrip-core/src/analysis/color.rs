//! RGB to HSV conversion.

use crate::types::{Hsv, Rgb};

/// Convert 8-bit RGB to HSV (degrees, percent, percent).
///
/// Achromatic input (max == min) yields `h = 0` and `s = 0`.
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let s = if max == 0.0 { 0.0 } else { delta / max * 100.0 };

    Hsv {
        // rem_euclid can land exactly on 360 through rounding
        h: if h >= 360.0 { h - 360.0 } else { h },
        s,
        v: max * 100.0,
    }
}
