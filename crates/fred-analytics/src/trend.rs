//! Linear trend classification

use crate::SeriesPoint;
use crate::stats::{mean, round2};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStrength {
    Weak,
    Moderate,
    Strong,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        })
    }
}

impl fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        })
    }
}

/// Correlation cut-offs for trend labels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendThresholds {
    /// |r| below this is "stable"
    pub stable_below: f64,
    /// |r| below this is "weak"
    pub weak_below: f64,
    /// |r| below this is "moderate", otherwise "strong"
    pub moderate_below: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            stable_below: 0.3,
            weak_below: 0.5,
            moderate_below: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub strength: TrendStrength,
    /// Units per observation, rounded to 2 decimals
    pub slope: f64,
    pub correlation: f64,
    /// e.g. "strong increasing trend"
    pub description: String,
}

impl Trend {
    /// Regress value on observation index; `None` below two points
    pub fn compute(points: &[SeriesPoint], thresholds: &TrendThresholds) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }

        let xs: Vec<f64> = (0..points.len()).map(|i| i as f64).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.value).collect();
        let (slope, correlation) = ols_slope_and_correlation(&xs, &ys);

        let r = correlation.abs();
        let direction = if r < thresholds.stable_below {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };
        let strength = if r < thresholds.weak_below {
            TrendStrength::Weak
        } else if r < thresholds.moderate_below {
            TrendStrength::Moderate
        } else {
            TrendStrength::Strong
        };

        Some(Self {
            direction,
            strength,
            slope: round2(slope),
            correlation,
            description: format!("{strength} {direction} trend"),
        })
    }
}

/// Least-squares slope and Pearson r; r is 0 when either side has no variance
fn ols_slope_and_correlation(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let mx = mean(xs);
    let my = mean(ys);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    let correlation = if sxx == 0.0 || syy == 0.0 {
        0.0
    } else {
        (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
    };
    (slope, correlation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pts(values: &[f64]) -> Vec<SeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                date: start + chrono::Days::new(i as u64 * 30),
                value,
            })
            .collect()
    }

    #[test]
    fn test_perfect_increase() {
        let trend = Trend::compute(&pts(&[1.0, 2.0, 3.0, 4.0]), &TrendThresholds::default()).unwrap();
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert_eq!(trend.strength, TrendStrength::Strong);
        assert_eq!(trend.slope, 1.0);
        assert_eq!(trend.description, "strong increasing trend");
    }

    #[test]
    fn test_decrease() {
        let trend =
            Trend::compute(&pts(&[10.0, 8.0, 9.0, 5.0, 4.0]), &TrendThresholds::default()).unwrap();
        assert_eq!(trend.direction, TrendDirection::Decreasing);
        assert!(trend.slope < 0.0);
    }

    #[test]
    fn test_constant_series_is_stable() {
        let trend = Trend::compute(&pts(&[3.0; 6]), &TrendThresholds::default()).unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.strength, TrendStrength::Weak);
        assert_eq!(trend.correlation, 0.0);
        assert_eq!(trend.slope, 0.0);
    }

    #[test]
    fn test_noise_is_stable() {
        let trend =
            Trend::compute(&pts(&[1.0, 3.0, 1.0, 3.0, 1.0, 3.0, 1.0]), &TrendThresholds::default())
                .unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
    }

    #[test]
    fn test_too_short() {
        assert!(Trend::compute(&pts(&[1.0]), &TrendThresholds::default()).is_none());
    }
}
