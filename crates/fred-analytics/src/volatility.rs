//! Rolling-window volatility comparison

use crate::SeriesPoint;
use crate::error::{AnalyticsError, Result};
use crate::stats::{mean, percent_change};
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::StandardDeviation;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityConfig {
    /// Rolling window length in observations
    pub window: usize,
    /// Recent above `earlier * increase_factor` is "increased"
    pub increase_factor: f64,
    /// Recent below `earlier * decrease_factor` is "decreased"
    pub decrease_factor: f64,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            window: 6,
            increase_factor: 1.2,
            decrease_factor: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityAssessment {
    Increased,
    Decreased,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volatility {
    pub recent_volatility: f64,
    pub earlier_volatility: f64,
    /// Percentage change, absent when earlier volatility is zero
    pub change: Option<f64>,
    pub assessment: VolatilityAssessment,
}

impl Volatility {
    /// Compare the mean rolling deviation of the first and last `window`
    /// full windows. `Ok(None)` when the series is shorter than two windows.
    pub fn compute(points: &[SeriesPoint], config: &VolatilityConfig) -> Result<Option<Self>> {
        let window = config.window;
        if window < 2 {
            return Err(AnalyticsError::Indicator(format!(
                "volatility window must be at least 2, got {window}"
            )));
        }
        if points.len() < window * 2 {
            return Ok(None);
        }

        let rolling = rolling_sample_std(points, window)?;
        let earlier = mean(&rolling[..window]);
        let recent = mean(&rolling[rolling.len() - window..]);

        let assessment = if recent > earlier * config.increase_factor {
            VolatilityAssessment::Increased
        } else if recent < earlier * config.decrease_factor {
            VolatilityAssessment::Decreased
        } else {
            VolatilityAssessment::Stable
        };

        Ok(Some(Self {
            recent_volatility: recent,
            earlier_volatility: earlier,
            change: percent_change(earlier, recent).ok(),
            assessment,
        }))
    }
}

/// Rolling standard deviation over complete windows only
///
/// `ta` reports the population deviation; it is rescaled to the `n - 1`
/// estimator so the figures match the summary's `std`.
fn rolling_sample_std(points: &[SeriesPoint], window: usize) -> Result<Vec<f64>> {
    let mut indicator =
        StandardDeviation::new(window).map_err(|e| AnalyticsError::Indicator(e.to_string()))?;
    let correction = (window as f64 / (window - 1) as f64).sqrt();

    Ok(points
        .iter()
        .map(|p| indicator.next(p.value))
        .skip(window - 1)
        // running sums can leave a NaN or a hair below zero on flat windows
        .map(|sd| sd.max(0.0) * correction)
        .collect())
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
                date: start + chrono::Months::new(i as u32),
                value,
            })
            .collect()
    }

    #[test]
    fn test_requires_two_windows() {
        let result = Volatility::compute(&pts(&[1.0; 11]), &VolatilityConfig::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_increased_volatility() {
        let mut values = vec![10.0, 10.1, 10.0, 10.1, 10.0, 10.1];
        values.extend([10.0, 10.1, 10.0, 10.1, 10.0, 10.1]);
        values.extend([10.0, 14.0, 8.0, 15.0, 7.0, 16.0]);
        let vol = Volatility::compute(&pts(&values), &VolatilityConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(vol.assessment, VolatilityAssessment::Increased);
        assert!(vol.recent_volatility > vol.earlier_volatility);
        assert!(vol.change.unwrap() > 20.0);
    }

    #[test]
    fn test_constant_series_is_stable_without_change() {
        let vol = Volatility::compute(&pts(&[5.0; 12]), &VolatilityConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(vol.assessment, VolatilityAssessment::Stable);
        assert_eq!(vol.change, None);
    }

    #[test]
    fn test_rolling_values_use_sample_estimator() {
        let rolling = rolling_sample_std(&pts(&[1.0, 2.0, 3.0, 4.0]), 2).unwrap();
        assert_eq!(rolling.len(), 3);
        for sd in rolling {
            assert!((sd - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_window_below_two_is_rejected() {
        let config = VolatilityConfig {
            window: 1,
            ..VolatilityConfig::default()
        };
        assert!(Volatility::compute(&pts(&[1.0; 4]), &config).is_err());
    }
}
