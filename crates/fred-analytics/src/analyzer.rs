//! Analyzer entry point and summary shapes

use crate::changes::{
    AnnotatedPoint, InflectionConfig, InflectionSummary, LagPolicy, Lags, NotablePeriods, annotate,
};
use crate::error::{AnalyticsError, Result};
use crate::series::{SeriesPoint, parse_observations};
use crate::stats::{BasicStats, DatedValue, TotalChange};
use crate::trend::{Trend, TrendThresholds};
use crate::volatility::{Volatility, VolatilityConfig};
use chrono::NaiveDate;
use fred_data::{Frequency, Observation};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tunables for every statistic the analyzer produces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub trend: TrendThresholds,
    pub volatility: VolatilityConfig,
    pub lags: LagPolicy,
    pub inflections: InflectionConfig,
}

impl AnalyticsConfig {
    pub fn validate(&self) -> Result<()> {
        let t = &self.trend;
        if !(0.0..=1.0).contains(&t.stable_below)
            || t.weak_below > t.moderate_below
            || t.moderate_below > 1.0
        {
            return Err(AnalyticsError::Indicator(
                "trend thresholds must be ordered within [0, 1]".to_string(),
            ));
        }
        if self.volatility.window < 2 {
            return Err(AnalyticsError::Indicator(
                "volatility window must be at least 2".to_string(),
            ));
        }
        if self.volatility.decrease_factor > self.volatility.increase_factor {
            return Err(AnalyticsError::Indicator(
                "volatility decrease factor exceeds increase factor".to_string(),
            ));
        }
        if let LagPolicy::Fixed { mom: 0, .. } | LagPolicy::Fixed { yoy: 0, .. } = self.lags {
            return Err(AnalyticsError::Indicator("lags must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMetrics {
    pub total: TotalChange,
}

/// Everything the analyzer knows about one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub data_points: usize,
    pub time_span: TimeSpan,
    pub basic_stats: BasicStats,
    pub changes: ChangeMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<Volatility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflection_summary: Option<InflectionSummary>,
    pub notable_periods: NotablePeriods,
    pub timeseries_data: Vec<AnnotatedPoint>,
}

/// Point in the compact recent window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactPoint {
    pub date: NaiveDate,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mom_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yoy_percentage: Option<f64>,
}

/// Minimal view used when many series share one prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactSummary {
    pub latest: DatedValue,
    pub max: DatedValue,
    pub min: DatedValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_change_pct: Option<f64>,
    pub recent_data: Vec<CompactPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailOptions {
    /// Size of the trailing window of annotated points
    pub recent_points: usize,
    /// Also attach the whole annotated series
    pub include_full_timeseries: bool,
}

impl Default for DetailOptions {
    fn default() -> Self {
        Self {
            recent_points: 12,
            include_full_timeseries: false,
        }
    }
}

/// Full statistics with a bounded slice of the annotated series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedSummary {
    pub data_points: usize,
    pub time_span: TimeSpan,
    pub basic_stats: BasicStats,
    pub changes: ChangeMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<Volatility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflection_summary: Option<InflectionSummary>,
    /// Turning points across the whole range, including outside the recent window
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inflection_points: Vec<AnnotatedPoint>,
    #[serde(skip_serializing_if = "NotablePeriods::is_empty")]
    pub notable_periods: NotablePeriods,
    pub recent_data: Vec<AnnotatedPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeseries_data: Option<Vec<AnnotatedPoint>>,
}

const COMPACT_RECENT_POINTS: usize = 5;

impl AnalysisSummary {
    pub fn compact(&self) -> CompactSummary {
        let recent_data = tail(&self.timeseries_data, COMPACT_RECENT_POINTS)
            .iter()
            .map(|p| CompactPoint {
                date: p.date,
                value: p.value,
                mom_percentage: p.mom_percentage,
                yoy_percentage: p.yoy_percentage,
            })
            .collect();

        CompactSummary {
            latest: self.basic_stats.latest,
            max: self.basic_stats.max,
            min: self.basic_stats.min,
            trend: self.trend.as_ref().map(|t| t.description.clone()),
            total_change_pct: self.changes.total.percentage,
            recent_data,
        }
    }

    pub fn detailed(&self, options: &DetailOptions) -> DetailedSummary {
        DetailedSummary {
            data_points: self.data_points,
            time_span: self.time_span,
            basic_stats: self.basic_stats.clone(),
            changes: self.changes.clone(),
            trend: self.trend.clone(),
            volatility: self.volatility.clone(),
            inflection_summary: self.inflection_summary,
            inflection_points: self
                .timeseries_data
                .iter()
                .filter(|p| p.inflection_type.is_some())
                .cloned()
                .collect(),
            notable_periods: self.notable_periods.clone(),
            recent_data: tail(&self.timeseries_data, options.recent_points).to_vec(),
            timeseries_data: options
                .include_full_timeseries
                .then(|| self.timeseries_data.clone()),
        }
    }
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Turns raw observations into an [`AnalysisSummary`]
///
/// ```
/// use fred_analytics::TimeSeriesAnalyzer;
/// use fred_data::Observation;
///
/// let obs = vec![
///     Observation::new("2024-01-01", "3.7"),
///     Observation::new("2024-02-01", "3.9"),
///     Observation::new("2024-03-01", "."),
/// ];
/// let summary = TimeSeriesAnalyzer::new(&obs)?.summarize()?;
/// assert_eq!(summary.data_points, 2);
/// assert_eq!(summary.basic_stats.latest.value, 3.9);
/// # Ok::<(), fred_analytics::AnalyticsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TimeSeriesAnalyzer {
    points: Vec<SeriesPoint>,
    config: AnalyticsConfig,
    frequency: Option<Frequency>,
}

impl TimeSeriesAnalyzer {
    pub fn new(observations: &[Observation]) -> Result<Self> {
        Self::with_config(observations, AnalyticsConfig::default())
    }

    pub fn with_config(observations: &[Observation], config: AnalyticsConfig) -> Result<Self> {
        Ok(Self {
            points: parse_observations(observations)?,
            config,
            frequency: None,
        })
    }

    /// Frequency hint used by [`LagPolicy::ByFrequency`]
    pub fn with_frequency(mut self, frequency: Option<Frequency>) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn lags(&self) -> Lags {
        self.config.lags.resolve(self.frequency)
    }

    pub fn basic_stats(&self) -> Result<BasicStats> {
        BasicStats::compute(&self.points)
    }

    pub fn total_change(&self) -> Result<TotalChange> {
        TotalChange::compute(&self.points)
    }

    pub fn trend(&self) -> Option<Trend> {
        Trend::compute(&self.points, &self.config.trend)
    }

    pub fn volatility(&self) -> Result<Option<Volatility>> {
        Volatility::compute(&self.points, &self.config.volatility)
    }

    pub fn annotated_series(&self, std: Option<f64>) -> Vec<AnnotatedPoint> {
        annotate(&self.points, self.lags(), &self.config.inflections, std)
    }

    pub fn time_span(&self) -> Option<TimeSpan> {
        let (first, last) = (self.points.first()?, self.points.last()?);
        Some(TimeSpan {
            start: first.date,
            end: last.date,
            days: (last.date - first.date).num_days(),
        })
    }

    /// Compute every statistic; optional ones that cannot be computed are omitted
    pub fn summarize(&self) -> Result<AnalysisSummary> {
        let basic_stats = self.basic_stats()?;
        let total = self.total_change()?;
        let time_span = self.time_span().ok_or(AnalyticsError::EmptyInput)?;

        let volatility = self.volatility().unwrap_or_else(|e| {
            warn!(error = %e, "Skipping volatility");
            None
        });

        let timeseries_data = self.annotated_series(basic_stats.std);
        let inflection_summary = self
            .config
            .inflections
            .enabled
            .then(|| InflectionSummary::from_points(&timeseries_data));
        let notable_periods = NotablePeriods::compute(&timeseries_data, self.lags());

        Ok(AnalysisSummary {
            data_points: self.points.len(),
            time_span,
            basic_stats,
            changes: ChangeMetrics { total },
            trend: self.trend(),
            volatility,
            inflection_summary,
            notable_periods,
            timeseries_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::Inflection;
    use crate::trend::TrendDirection;

    fn monthly(values: &[f64]) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let date = start + chrono::Months::new(i as u32);
                Observation::new(date.format("%Y-%m-%d").to_string(), v.to_string())
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            TimeSeriesAnalyzer::new(&[]).unwrap_err(),
            AnalyticsError::EmptyInput
        );
    }

    #[test]
    fn test_single_point_summary() {
        let summary = TimeSeriesAnalyzer::new(&monthly(&[4.2])).unwrap().summarize().unwrap();
        assert_eq!(summary.data_points, 1);
        assert_eq!(summary.basic_stats.std, None);
        assert!(summary.trend.is_none());
        assert!(summary.volatility.is_none());
        assert_eq!(summary.time_span.days, 0);
        assert_eq!(summary.changes.total.absolute, 0.0);
        assert_eq!(summary.inflection_summary.unwrap().total_count, 0);
    }

    #[test]
    fn test_full_summary_invariants() {
        let values: Vec<f64> = (0..24)
            .map(|i| 100.0 + f64::from(i) + if i % 6 == 0 { 5.0 } else { 0.0 })
            .collect();
        let summary = TimeSeriesAnalyzer::new(&monthly(&values)).unwrap().summarize().unwrap();

        let stats = &summary.basic_stats;
        assert!(stats.max.value >= stats.mean && stats.mean >= stats.min.value);
        assert_eq!(stats.latest.date, summary.time_span.end);
        assert_eq!(summary.data_points, 24);
        assert_eq!(summary.trend.as_ref().unwrap().direction, TrendDirection::Increasing);
        assert!(summary.volatility.is_some());
        assert!(summary.notable_periods.largest_yoy_increase.is_some());

        for (i, p) in summary.timeseries_data.iter().enumerate() {
            assert_eq!(p.mom_absolute.is_some(), i >= 1);
            assert_eq!(p.yoy_absolute.is_some(), i >= 12);
        }
    }

    #[test]
    fn test_monotonic_series_has_no_inflections() {
        let values: Vec<f64> = (0..30).map(|i| f64::from(i) * 0.5).collect();
        let summary = TimeSeriesAnalyzer::new(&monthly(&values)).unwrap().summarize().unwrap();
        assert_eq!(summary.inflection_summary.unwrap().total_count, 0);
        assert!(summary.timeseries_data.iter().all(|p| p.inflection_type.is_none()));
    }

    #[test]
    fn test_compact_view() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let summary = TimeSeriesAnalyzer::new(&monthly(&values)).unwrap().summarize().unwrap();
        let compact = summary.compact();

        assert_eq!(compact.recent_data.len(), 5);
        assert_eq!(compact.recent_data[4].value, 10.0);
        assert_eq!(compact.latest.value, 10.0);
        assert_eq!(compact.total_change_pct, Some(900.0));
        assert_eq!(compact.trend.as_deref(), Some("strong increasing trend"));

        let json = serde_json::to_value(&compact).unwrap();
        assert!(json.get("timeseries_data").is_none());
        assert!(json["recent_data"][0].get("inflection_type").is_none());
    }

    #[test]
    fn test_detailed_view_windows() {
        let values = [1.0, 6.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0];
        let summary = TimeSeriesAnalyzer::new(&monthly(&values)).unwrap().summarize().unwrap();

        let detailed = summary.detailed(&DetailOptions::default());
        assert_eq!(detailed.recent_data.len(), 12);
        assert!(detailed.timeseries_data.is_none());
        assert_eq!(detailed.inflection_points.len(), 2);
        assert_eq!(detailed.inflection_points[0].inflection_type, Some(Inflection::Peak));

        let full = summary.detailed(&DetailOptions {
            recent_points: 3,
            include_full_timeseries: true,
        });
        assert_eq!(full.recent_data.len(), 3);
        assert_eq!(full.timeseries_data.unwrap().len(), values.len());
    }

    #[test]
    fn test_by_frequency_lags() {
        let config = AnalyticsConfig {
            lags: LagPolicy::ByFrequency,
            ..AnalyticsConfig::default()
        };
        let values: Vec<f64> = (1..=6).map(f64::from).collect();
        let analyzer = TimeSeriesAnalyzer::with_config(&monthly(&values), config)
            .unwrap()
            .with_frequency(Some(Frequency::Quarterly));
        let summary = analyzer.summarize().unwrap();
        assert_eq!(summary.timeseries_data[4].yoy_absolute, Some(4.0));
    }

    #[test]
    fn test_config_validation() {
        assert!(AnalyticsConfig::default().validate().is_ok());
        let bad = AnalyticsConfig {
            lags: LagPolicy::Fixed { mom: 0, yoy: 12 },
            ..AnalyticsConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
