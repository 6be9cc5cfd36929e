//! Ordered hue-band tables evaluated first-match-wins.

/// Interval over hue degrees. `min` is always inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueBand {
    pub min: f64,
    pub max: f64,
    pub max_inclusive: bool,
}

impl HueBand {
    /// `[min, max)`
    pub const fn half_open(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            max_inclusive: false,
        }
    }

    /// `[min, max]`
    pub const fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            max_inclusive: true,
        }
    }

    /// `[min, +inf)`
    pub const fn at_least(min: f64) -> Self {
        Self::closed(min, f64::INFINITY)
    }

    /// `(-inf, max)`
    pub const fn below(max: f64) -> Self {
        Self::half_open(f64::NEG_INFINITY, max)
    }

    pub fn contains(&self, hue: f64) -> bool {
        hue >= self.min
            && if self.max_inclusive {
                hue <= self.max
            } else {
                hue < self.max
            }
    }
}

/// First entry whose band contains `hue`.
pub fn first_match<T>(table: &[(HueBand, T)], hue: f64) -> Option<&T> {
    table
        .iter()
        .find(|(band, _)| band.contains(hue))
        .map(|(_, value)| value)
}
