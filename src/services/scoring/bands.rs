//! Piecewise-linear mapping from a measured quantity to a 0-100 score.
//!
//! Good values land in 80-100, borderline values in 50-79 and poor values in
//! 0-49, each linear in the distance from the nearest good threshold.

use crate::services::geometry::lerp_clamped;

/// Bands for a quantity where smaller is better
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowerIsBetter {
    /// At or below this value the score is 100
    pub ideal: f64,
    /// Upper edge of the good band (score 80)
    pub good: f64,
    /// Upper edge of the borderline band (score 50)
    pub fair: f64,
    /// Value at which the score reaches 0
    pub worst: f64,
}

impl LowerIsBetter {
    pub const fn new(ideal: f64, good: f64, fair: f64, worst: f64) -> Self {
        Self {
            ideal,
            good,
            fair,
            worst,
        }
    }

    pub fn score(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        if value <= self.ideal {
            100.0
        } else if value <= self.good {
            lerp_clamped(value, self.ideal, self.good, 100.0, 80.0)
        } else if value <= self.fair {
            lerp_clamped(value, self.good, self.fair, 79.0, 50.0)
        } else {
            lerp_clamped(value, self.fair, self.worst, 49.0, 0.0)
        }
    }

    pub fn is_good(&self, value: f64) -> bool {
        value <= self.good
    }
}

/// Bands for a quantity that should sit inside `[low, high]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InRange {
    pub low: f64,
    pub high: f64,
    /// Distance outside the range still rated borderline
    pub fair_margin: f64,
    /// Further distance over which the score falls to 0
    pub poor_margin: f64,
}

impl InRange {
    pub const fn new(low: f64, high: f64, fair_margin: f64, poor_margin: f64) -> Self {
        Self {
            low,
            high,
            fair_margin,
            poor_margin,
        }
    }

    pub fn score(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        if self.contains(value) {
            let center = (self.low + self.high) / 2.0;
            let half_width = (self.high - self.low) / 2.0;
            return lerp_clamped((value - center).abs(), 0.0, half_width, 100.0, 80.0);
        }

        let distance = if value < self.low {
            self.low - value
        } else {
            value - self.high
        };

        if distance <= self.fair_margin {
            lerp_clamped(distance, 0.0, self.fair_margin, 79.0, 50.0)
        } else {
            lerp_clamped(
                distance,
                self.fair_margin,
                self.fair_margin + self.poor_margin,
                49.0,
                0.0,
            )
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANDS: LowerIsBetter = LowerIsBetter::new(0.0, 0.08, 0.12, 0.30);

    #[test]
    fn test_lower_is_better_band_edges() {
        assert_eq!(BANDS.score(0.0), 100.0);
        assert_eq!(BANDS.score(-1.0), 100.0);
        assert!((BANDS.score(0.04) - 90.0).abs() < 1e-9);
        assert!((BANDS.score(0.08) - 80.0).abs() < 1e-9);
        assert!(BANDS.score(0.0801) < 80.0 && BANDS.score(0.0801) > 78.9);
        assert!((BANDS.score(0.12) - 50.0).abs() < 1e-9);
        assert!(BANDS.score(0.13) < 50.0);
        assert_eq!(BANDS.score(0.30), 0.0);
        assert_eq!(BANDS.score(5.0), 0.0);
        assert_eq!(BANDS.score(f64::NAN), 0.0);
    }

    #[test]
    fn test_lower_is_better_monotonic() {
        let mut last = f64::INFINITY;
        for i in 0..400 {
            let score = BANDS.score(i as f64 * 0.001);
            assert!(score <= last);
            last = score;
        }
    }

    #[test]
    fn test_in_range_scores() {
        let bands = InRange::new(1.2, 2.2, 0.3, 0.6);
        assert!((bands.score(1.7) - 100.0).abs() < 1e-9);
        assert!((bands.score(1.2) - 80.0).abs() < 1e-9);
        assert!((bands.score(2.2) - 80.0).abs() < 1e-9);
        assert!((bands.score(0.9) - 50.0).abs() < 1e-9);
        assert!(bands.score(2.6) < 50.0);
        assert_eq!(bands.score(0.0), 0.0);
    }
}
