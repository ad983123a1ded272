//! Parsing raw observations into a clean, date-sorted series

use crate::error::{AnalyticsError, Result};
use chrono::NaiveDate;
use fred_data::Observation;
use serde::{Deserialize, Serialize};

/// A numeric observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Parse, drop unusable rows, and sort ascending by date
///
/// Rows whose date is not `YYYY-MM-DD` or whose value is not a finite number
/// (FRED uses `"."` for gaps) are skipped. Sorting is stable, so duplicate
/// dates keep their input order.
pub fn parse_observations(observations: &[Observation]) -> Result<Vec<SeriesPoint>> {
    if observations.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let mut points: Vec<SeriesPoint> = observations
        .iter()
        .filter_map(|obs| {
            let date = NaiveDate::parse_from_str(obs.date.trim(), "%Y-%m-%d").ok()?;
            let value = obs.value.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
            Some(SeriesPoint { date, value })
        })
        .collect();

    if points.is_empty() {
        return Err(AnalyticsError::NoNumericValues);
    }

    points.sort_by_key(|p| p.date);
    Ok(points)
}
