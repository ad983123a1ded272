//! Descriptive statistics and first-to-last change

use crate::SeriesPoint;
use crate::error::{AnalyticsError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A value together with the date it was observed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub value: f64,
    pub date: NaiveDate,
}

impl From<SeriesPoint> for DatedValue {
    fn from(p: SeriesPoint) -> Self {
        Self {
            value: p.value,
            date: p.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    /// First occurrence of the maximum
    pub max: DatedValue,
    /// First occurrence of the minimum
    pub min: DatedValue,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation, absent for a single point
    pub std: Option<f64>,
    pub latest: DatedValue,
    pub earliest: DatedValue,
}

impl BasicStats {
    /// `points` must be non-empty and sorted by date
    pub fn compute(points: &[SeriesPoint]) -> Result<Self> {
        let (first, last) = match (points.first(), points.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return Err(AnalyticsError::EmptyInput),
        };

        let mut max = first;
        let mut min = first;
        for p in &points[1..] {
            if p.value > max.value {
                max = *p;
            }
            if p.value < min.value {
                min = *p;
            }
        }

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();

        Ok(Self {
            max: max.into(),
            min: min.into(),
            mean: mean(&values),
            median: median(&values),
            std: sample_std(&values),
            latest: last.into(),
            earliest: first.into(),
        })
    }
}

/// Absolute and percentage change from the earliest to the latest point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalChange {
    pub absolute: f64,
    /// Absent when the earliest value is zero
    pub percentage: Option<f64>,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

impl TotalChange {
    pub fn compute(points: &[SeriesPoint]) -> Result<Self> {
        let (first, last) = match (points.first(), points.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(AnalyticsError::EmptyInput),
        };
        Ok(Self {
            absolute: last.value - first.value,
            percentage: percent_change(first.value, last.value).ok(),
            from_date: first.date,
            to_date: last.date,
        })
    }
}

/// `(to - from) / from * 100`
pub fn percent_change(from: f64, to: f64) -> Result<f64> {
    if from == 0.0 {
        return Err(AnalyticsError::DivisionByZero);
    }
    Ok((to - from) / from * 100.0)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Standard deviation with `n - 1` in the denominator
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
