//! Period-over-period deltas, turning points and notable moves

use crate::SeriesPoint;
use crate::peaks::{find_peaks, find_troughs};
use crate::stats::{percent_change, round2};
use chrono::NaiveDate;
use fred_data::Frequency;
use serde::{Deserialize, Serialize};

/// How far back "previous period" and "a year ago" reach, in observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LagPolicy {
    /// Same offsets regardless of the series' frequency
    Fixed { mom: usize, yoy: usize },
    /// Derive the year-ago offset from the reporting frequency
    ByFrequency,
}

impl Default for LagPolicy {
    fn default() -> Self {
        Self::Fixed { mom: 1, yoy: 12 }
    }
}

/// Resolved offsets; `yoy` is `None` when a year has no fixed length in samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lags {
    pub mom: usize,
    pub yoy: Option<usize>,
}

impl LagPolicy {
    pub fn resolve(self, frequency: Option<Frequency>) -> Lags {
        match (self, frequency) {
            (Self::Fixed { mom, yoy }, _) => Lags {
                mom,
                yoy: Some(yoy),
            },
            (Self::ByFrequency, Some(freq)) => Lags {
                mom: 1,
                yoy: match freq {
                    Frequency::Daily => None,
                    Frequency::Weekly => Some(52),
                    Frequency::Monthly => Some(12),
                    Frequency::Quarterly => Some(4),
                    Frequency::SemiAnnual => Some(2),
                    Frequency::Annual => Some(1),
                },
            },
            (Self::ByFrequency, None) => Self::default().resolve(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inflection {
    Peak,
    Trough,
}

/// One observation with its deltas and turning-point marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub mom_absolute: Option<f64>,
    pub mom_percentage: Option<f64>,
    pub yoy_absolute: Option<f64>,
    pub yoy_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflection_type: Option<Inflection>,
}

/// Turning-point detection settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflectionConfig {
    pub enabled: bool,
    /// Series shorter than this get no turning points
    pub min_points: usize,
    /// Default prominence threshold as a fraction of the sample std
    pub prominence_factor: f64,
    /// Absolute threshold overriding the factor
    pub prominence: Option<f64>,
}

impl Default for InflectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_points: 5,
            prominence_factor: 0.25,
            prominence: None,
        }
    }
}

/// Attach MoM/YoY deltas and turning points to every observation
pub fn annotate(
    points: &[SeriesPoint],
    lags: Lags,
    inflections: &InflectionConfig,
    std: Option<f64>,
) -> Vec<AnnotatedPoint> {
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let markers = inflection_markers(&values, inflections, std);

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let (mom_absolute, mom_percentage) = lagged_delta(&values, i, Some(lags.mom));
            let (yoy_absolute, yoy_percentage) = lagged_delta(&values, i, lags.yoy);
            AnnotatedPoint {
                date: p.date,
                value: p.value,
                mom_absolute,
                mom_percentage,
                yoy_absolute,
                yoy_percentage,
                inflection_type: markers[i],
            }
        })
        .collect()
}

fn lagged_delta(values: &[f64], i: usize, lag: Option<usize>) -> (Option<f64>, Option<f64>) {
    let Some(base) = lag
        .filter(|&l| l > 0)
        .and_then(|l| i.checked_sub(l))
        .map(|j| values[j])
    else {
        return (None, None);
    };
    match percent_change(base, values[i]) {
        Ok(pct) => (Some(round2(values[i] - base)), Some(round2(pct))),
        Err(_) => (None, None),
    }
}

fn inflection_markers(
    values: &[f64],
    config: &InflectionConfig,
    std: Option<f64>,
) -> Vec<Option<Inflection>> {
    let mut markers = vec![None; values.len()];
    if !config.enabled || values.len() < config.min_points {
        return markers;
    }

    let threshold = config
        .prominence
        .unwrap_or_else(|| std.unwrap_or(0.0) * config.prominence_factor);

    for i in find_peaks(values, threshold) {
        markers[i] = Some(Inflection::Peak);
    }
    for i in find_troughs(values, threshold) {
        markers[i] = Some(Inflection::Trough);
    }
    markers
}

/// Counts of detected turning points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflectionSummary {
    pub total_count: usize,
    pub peak_count: usize,
    pub trough_count: usize,
}

impl InflectionSummary {
    pub fn from_points(points: &[AnnotatedPoint]) -> Self {
        let peak_count = points
            .iter()
            .filter(|p| p.inflection_type == Some(Inflection::Peak))
            .count();
        let trough_count = points
            .iter()
            .filter(|p| p.inflection_type == Some(Inflection::Trough))
            .count();
        Self {
            total_count: peak_count + trough_count,
            peak_count,
            trough_count,
        }
    }
}

/// A single period-over-period move singled out for the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotableChange {
    pub date: NaiveDate,
    pub from_date: NaiveDate,
    pub from_value: f64,
    pub to_value: f64,
    pub absolute: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotablePeriods {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_mom_increase: Option<NotableChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_mom_decrease: Option<NotableChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_yoy_increase: Option<NotableChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_yoy_decrease: Option<NotableChange>,
}

impl NotablePeriods {
    /// Signed extremes of the MoM and YoY absolute changes; first occurrence wins ties
    pub fn compute(points: &[AnnotatedPoint], lags: Lags) -> Self {
        let mom = |p: &AnnotatedPoint| p.mom_absolute.zip(p.mom_percentage);
        let yoy = |p: &AnnotatedPoint| p.yoy_absolute.zip(p.yoy_percentage);

        Self {
            largest_mom_increase: extreme(points, Some(lags.mom), mom, true),
            largest_mom_decrease: extreme(points, Some(lags.mom), mom, false),
            largest_yoy_increase: extreme(points, lags.yoy, yoy, true),
            largest_yoy_decrease: extreme(points, lags.yoy, yoy, false),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.largest_mom_increase.is_none()
            && self.largest_mom_decrease.is_none()
            && self.largest_yoy_increase.is_none()
            && self.largest_yoy_decrease.is_none()
    }
}

fn extreme(
    points: &[AnnotatedPoint],
    lag: Option<usize>,
    delta: impl Fn(&AnnotatedPoint) -> Option<(f64, f64)>,
    largest: bool,
) -> Option<NotableChange> {
    let lag = lag?;
    let mut best: Option<(usize, f64, f64)> = None;

    for (i, p) in points.iter().enumerate() {
        let Some((abs, pct)) = delta(p) else { continue };
        let better = match best {
            None => true,
            Some((_, b, _)) => {
                if largest {
                    abs > b
                } else {
                    abs < b
                }
            }
        };
        if better {
            best = Some((i, abs, pct));
        }
    }

    let (i, absolute, percentage) = best?;
    let from = points.get(i.checked_sub(lag)?)?;
    Some(NotableChange {
        date: points[i].date,
        from_date: from.date,
        from_value: from.value,
        to_value: points[i].value,
        absolute,
        percentage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn fixed() -> Lags {
        LagPolicy::default().resolve(None)
    }

    #[test]
    fn test_lag_policy() {
        assert_eq!(fixed(), Lags { mom: 1, yoy: Some(12) });
        let quarterly = LagPolicy::ByFrequency.resolve(Some(Frequency::Quarterly));
        assert_eq!(quarterly.yoy, Some(4));
        assert_eq!(LagPolicy::ByFrequency.resolve(Some(Frequency::Daily)).yoy, None);
        assert_eq!(LagPolicy::ByFrequency.resolve(None), fixed());
    }

    #[test]
    fn test_mom_and_yoy_presence() {
        let values: Vec<f64> = (1..=14).map(f64::from).collect();
        let annotated = annotate(&pts(&values), fixed(), &InflectionConfig::default(), Some(1.0));

        assert_eq!(annotated[0].mom_absolute, None);
        assert_eq!(annotated[1].mom_absolute, Some(1.0));
        assert_eq!(annotated[1].mom_percentage, Some(100.0));
        assert_eq!(annotated[11].yoy_absolute, None);
        assert_eq!(annotated[12].yoy_absolute, Some(12.0));
        assert_eq!(annotated[12].yoy_percentage, Some(1200.0));
    }

    #[test]
    fn test_zero_base_suppresses_deltas() {
        let annotated = annotate(&pts(&[0.0, 2.0, 3.0]), fixed(), &InflectionConfig::default(), None);
        assert_eq!(annotated[1].mom_absolute, None);
        assert_eq!(annotated[1].mom_percentage, None);
        assert_eq!(annotated[2].mom_percentage, Some(50.0));
    }

    #[test]
    fn test_inflections_need_five_points() {
        let annotated = annotate(
            &pts(&[1.0, 5.0, 1.0, 2.0]),
            fixed(),
            &InflectionConfig::default(),
            Some(2.0),
        );
        assert!(annotated.iter().all(|p| p.inflection_type.is_none()));
    }

    #[test]
    fn test_inflection_markers() {
        let annotated = annotate(
            &pts(&[1.0, 5.0, 1.0, 0.0, 3.0, 4.0]),
            fixed(),
            &InflectionConfig::default(),
            Some(2.0),
        );
        assert_eq!(annotated[1].inflection_type, Some(Inflection::Peak));
        assert_eq!(annotated[3].inflection_type, Some(Inflection::Trough));

        let summary = InflectionSummary::from_points(&annotated);
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.peak_count, 1);
    }

    #[test]
    fn test_notable_periods() {
        let annotated = annotate(
            &pts(&[10.0, 12.0, 11.0, 15.0, 9.0]),
            fixed(),
            &InflectionConfig::default(),
            None,
        );
        let notable = NotablePeriods::compute(&annotated, fixed());

        let up = notable.largest_mom_increase.unwrap();
        assert_eq!(up.absolute, 4.0);
        assert_eq!(up.from_value, 11.0);
        assert_eq!(up.to_value, 15.0);

        let down = notable.largest_mom_decrease.unwrap();
        assert_eq!(down.absolute, -6.0);
        assert_eq!(down.date, annotated[4].date);

        assert!(notable.largest_yoy_increase.is_none());
        assert!(notable.largest_yoy_decrease.is_none());
    }
}
