//! Representative color sampling from a decoded photo.
//!
//! A centered region of interest is averaged over pixels whose BT.709 luma
//! lies inside the configured bounds, which rejects glare and shadow. When
//! too few pixels survive, the whole frame is rescanned with wide fixed
//! bounds and the ROI result is discarded.

use crate::config::AnalysisConfig;
use crate::types::Rgb;

/// Luma bounds for the whole-frame fallback pass.
pub const FALLBACK_LUMA_MIN: f64 = 10.0;
pub const FALLBACK_LUMA_MAX: f64 = 245.0;

/// Decoded RGBA8 raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` bytes
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Buffer filled with one opaque color.
    pub fn solid(width: u32, height: u32, color: Rgb) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&[color.r, color.g, color.b, 255]);
        }
        Self::new(width, height, data)
    }

    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.data
            .get(offset..offset + 3)
            .map(|px| [px[0], px[1], px[2]])
    }
}

/// Result of sampling, with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleOutcome {
    pub color: Rgb,
    /// Pixels that contributed to the average
    pub valid_pixels: u64,
    /// True when the ROI had too few valid pixels and the whole frame was used
    pub used_fallback: bool,
}

/// BT.709 luma.
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * r as f64 + 0.7152 * g as f64 + 0.0722 * b as f64
}

#[derive(Default)]
struct Accumulator {
    r: u64,
    g: u64,
    b: u64,
    n: u64,
}

impl Accumulator {
    fn average(&self) -> Rgb {
        if self.n == 0 {
            return Rgb::default();
        }
        let n = self.n as f64;
        let channel = |sum: u64| (sum as f64 / n).round().clamp(0.0, 255.0) as u8;
        Rgb::new(channel(self.r), channel(self.g), channel(self.b))
    }
}

fn accumulate(
    buffer: &PixelBuffer,
    (x0, y0, w, h): (u32, u32, u32, u32),
    lo: f64,
    hi: f64,
) -> Accumulator {
    let mut acc = Accumulator::default();
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let Some([r, g, b]) = buffer.pixel(x, y) else {
                continue;
            };
            let l = luma(r, g, b);
            if l >= lo && l <= hi {
                acc.r += r as u64;
                acc.g += g as u64;
                acc.b += b as u64;
                acc.n += 1;
            }
        }
    }
    acc
}

/// Centered crop of `ratio` times each dimension, at least one pixel.
fn centered_window(width: u32, height: u32, ratio: f64) -> (u32, u32, u32, u32) {
    let w = ((width as f64 * ratio).floor() as u32).clamp(1, width.max(1));
    let h = ((height as f64 * ratio).floor() as u32).clamp(1, height.max(1));
    ((width.saturating_sub(w)) / 2, (height.saturating_sub(h)) / 2, w, h)
}

/// Extract one representative color. Never fails; an image with no usable
/// pixel at all yields black.
pub fn sample_region(buffer: &PixelBuffer, config: &AnalysisConfig) -> SampleOutcome {
    if buffer.width == 0 || buffer.height == 0 {
        return SampleOutcome {
            color: Rgb::default(),
            valid_pixels: 0,
            used_fallback: true,
        };
    }

    let window = centered_window(buffer.width, buffer.height, config.roi_ratio);
    let roi = accumulate(buffer, window, config.luma_min, config.luma_max);

    if roi.n >= config.min_valid_pixels {
        return SampleOutcome {
            color: roi.average(),
            valid_pixels: roi.n,
            used_fallback: false,
        };
    }

    tracing::warn!(
        valid_pixels = roi.n,
        required = config.min_valid_pixels,
        "Too few valid pixels in region of interest, rescanning full frame"
    );

    let full = accumulate(
        buffer,
        (0, 0, buffer.width, buffer.height),
        FALLBACK_LUMA_MIN,
        FALLBACK_LUMA_MAX,
    );

    if full.n == 0 {
        tracing::warn!("No pixel passed the luma filter, sample degenerates to black");
    }

    SampleOutcome {
        color: full.average(),
        valid_pixels: full.n,
        used_fallback: true,
    }
}
