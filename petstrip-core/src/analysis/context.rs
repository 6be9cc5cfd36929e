//! Situational adjustment of the blue channel.
//!
//! The adjusted value is reported alongside a result for the owner's
//! reference. It does not feed the classifiers.

use crate::types::ContextInputs;

/// Factors applied to the raw blue channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextFactors {
    pub time: f64,
    pub meal: f64,
    pub dilution: f64,
}

impl ContextFactors {
    pub fn from_inputs(inputs: &ContextInputs) -> Self {
        // Night window wins over late evening
        let time = if inputs.hour_of_day <= 6 {
            1.2
        } else if inputs.hour_of_day >= 22 {
            1.1
        } else {
            1.0
        };

        let meal = if inputs.after_meal_minutes < 60 { 1.2 } else { 1.0 };

        let dilution =
            1.0 + inputs.water_ml as f64 / 500.0 + inputs.elapsed_minutes as f64 / 60.0;

        Self {
            time,
            meal,
            dilution,
        }
    }

    pub fn product(&self) -> f64 {
        self.time * self.meal * self.dilution
    }
}

/// Adjusted blue channel plus a diagnostic line describing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextAdjustment {
    pub raw_blue: u8,
    pub adjusted_blue: u8,
    pub factors: ContextFactors,
}

impl ContextAdjustment {
    pub fn metrics(&self) -> String {
        format!(
            "Blue {} -> {} (time x{:.1}, meal x{:.1}, dilution x{:.2})",
            self.raw_blue,
            self.adjusted_blue,
            self.factors.time,
            self.factors.meal,
            self.factors.dilution
        )
    }
}

/// Scale `blue` by the context factors, clamped to 0-255.
pub fn adjust_blue(blue: u8, inputs: &ContextInputs) -> ContextAdjustment {
    let factors = ContextFactors::from_inputs(inputs);
    let scaled = (blue as f64 * factors.product()).clamp(0.0, 255.0).round();

    ContextAdjustment {
        raw_blue: blue,
        adjusted_blue: scaled as u8,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(hour: u32, meal: u32, water: u32, elapsed: u32) -> ContextInputs {
        ContextInputs {
            hour_of_day: hour,
            after_meal_minutes: meal,
            water_ml: water,
            elapsed_minutes: elapsed,
        }
    }

    #[test]
    fn test_neutral_daytime_is_identity() {
        let adj = adjust_blue(100, &inputs(12, 120, 0, 0));
        assert_eq!(adj.adjusted_blue, 100);
    }

    #[test]
    fn test_time_factor_bands() {
        assert_eq!(ContextFactors::from_inputs(&inputs(0, 120, 0, 0)).time, 1.2);
        assert_eq!(ContextFactors::from_inputs(&inputs(6, 120, 0, 0)).time, 1.2);
        assert_eq!(ContextFactors::from_inputs(&inputs(7, 120, 0, 0)).time, 1.0);
        assert_eq!(ContextFactors::from_inputs(&inputs(21, 120, 0, 0)).time, 1.0);
        assert_eq!(ContextFactors::from_inputs(&inputs(22, 120, 0, 0)).time, 1.1);
        assert_eq!(ContextFactors::from_inputs(&inputs(23, 120, 0, 0)).time, 1.1);
    }

    #[test]
    fn test_meal_factor_boundary() {
        assert_eq!(ContextFactors::from_inputs(&inputs(12, 59, 0, 0)).meal, 1.2);
        assert_eq!(ContextFactors::from_inputs(&inputs(12, 60, 0, 0)).meal, 1.0);
    }

    #[test]
    fn test_dilution_combines_water_and_time() {
        let factors = ContextFactors::from_inputs(&inputs(12, 120, 250, 30));
        assert!((factors.dilution - 2.0).abs() < 1e-9);
        assert_eq!(adjust_blue(50, &inputs(12, 120, 250, 30)).adjusted_blue, 100);
    }

    #[test]
    fn test_clamped_to_byte_range() {
        let adj = adjust_blue(255, &inputs(3, 10, 5000, 600));
        assert_eq!(adj.adjusted_blue, 255);
        assert_eq!(adjust_blue(0, &inputs(3, 10, 5000, 600)).adjusted_blue, 0);
    }

    #[test]
    fn test_monotone_in_water_and_elapsed() {
        for blue in [0u8, 17, 90, 200, 255] {
            let mut prev = 0;
            for water in (0..=2000).step_by(100) {
                let out = adjust_blue(blue, &inputs(12, 120, water, 15)).adjusted_blue;
                assert!(out >= prev);
                prev = out;
            }
            let mut prev = 0;
            for elapsed in (0..=240).step_by(10) {
                let out = adjust_blue(blue, &inputs(23, 30, 100, elapsed)).adjusted_blue;
                assert!(out >= prev);
                prev = out;
            }
        }
    }

    #[test]
    fn test_metrics_line() {
        let adj = adjust_blue(50, &inputs(12, 120, 250, 30));
        assert_eq!(
            adj.metrics(),
            "Blue 50 -> 100 (time x1.0, meal x1.0, dilution x2.00)"
        );
    }
}
