//! Color analysis pipeline
//!
//! decoded pixels → [`sampler`] → [`color`] → {[`glucose`], [`ph`]}
//!
//! [`context`] runs beside the classifiers on the sampled blue channel and
//! contributes diagnostics only.

pub mod color;
pub mod context;
pub mod glucose;
pub mod ph;
pub mod rules;
pub mod sampler;

pub use color::rgb_to_hsv;
pub use context::{adjust_blue, ContextAdjustment, ContextFactors};
pub use glucose::classify_glucose;
pub use ph::classify_ph;
pub use sampler::{sample_region, PixelBuffer, SampleOutcome};

use crate::config::AnalysisConfig;
use crate::types::{ClassificationResult, ContextInputs, Hsv, PhResult};

/// Everything the pipeline derives from one photo.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub sample: SampleOutcome,
    pub hsv: Hsv,
    pub glucose: ClassificationResult,
    pub ph: PhResult,
    pub context: ContextAdjustment,
}

/// Run the synchronous part of the pipeline over decoded pixels.
pub fn analyze_pixels(
    buffer: &PixelBuffer,
    config: &AnalysisConfig,
    inputs: &ContextInputs,
) -> AnalysisReport {
    let sample = sample_region(buffer, config);
    let hsv = rgb_to_hsv(sample.color);

    AnalysisReport {
        sample,
        hsv,
        glucose: classify_glucose(&hsv),
        ph: classify_ph(&hsv),
        context: adjust_blue(sample.color.b, inputs),
    }
}
