//! Single-series retrieval with analytics attached

use crate::{DateRange, SeriesResult};
use async_trait::async_trait;
use fred_analytics::{AnalyticsConfig, TimeSeriesAnalyzer};
use fred_data::{DataSource, MetadataCatalog, ObservationQuery};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// One fetch attempt for one series
///
/// Never fails: transport problems come back as a failed [`SeriesResult`].
#[async_trait]
pub trait FetchSeries: Send + Sync {
    async fn fetch(&self, series_id: &str, range: DateRange) -> SeriesResult;
}

/// Looks the series up in the catalog, queries the data source and runs the
/// analytics engine over whatever came back
pub struct SeriesFetcher {
    source: Arc<dyn DataSource>,
    catalog: Arc<MetadataCatalog>,
    analytics: AnalyticsConfig,
}

impl SeriesFetcher {
    pub fn new(source: Arc<dyn DataSource>, catalog: Arc<MetadataCatalog>) -> Self {
        Self {
            source,
            catalog,
            analytics: AnalyticsConfig::default(),
        }
    }

    pub fn with_analytics(mut self, analytics: AnalyticsConfig) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn catalog(&self) -> &MetadataCatalog {
        &self.catalog
    }
}

#[async_trait]
impl FetchSeries for SeriesFetcher {
    #[instrument(skip(self, range), fields(range = %range))]
    async fn fetch(&self, series_id: &str, range: DateRange) -> SeriesResult {
        let metadata = self.catalog.lookup(series_id);
        let frequency = metadata.and_then(|m| m.frequency());
        let indicator_name = metadata.map_or(series_id, |m| m.indicator.as_str());
        if metadata.is_none() {
            debug!("Series not in catalog, fetching by id only");
        }

        let query =
            ObservationQuery::new(series_id, range.start, range.end).with_frequency(frequency);

        let observations = match self.source.get_observations(&query).await {
            Ok(observations) => observations,
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                return SeriesResult::failed(
                    series_id,
                    indicator_name,
                    range,
                    format!("{series_id}: {e}"),
                );
            }
        };

        if observations.is_empty() {
            debug!("No observations in range");
            return SeriesResult::fetched(series_id, indicator_name, range, observations, None);
        }

        let analysis = TimeSeriesAnalyzer::with_config(&observations, self.analytics.clone())
            .map(|analyzer| analyzer.with_frequency(frequency))
            .and_then(|analyzer| analyzer.summarize());
        let analysis = match analysis {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, count = observations.len(), "Analytics unavailable");
                None
            }
        };

        debug!(count = observations.len(), "Fetched series");
        SeriesResult::fetched(series_id, indicator_name, range, observations, analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fred_data::{DataError, Frequency, IndicatorMetadata, Observation};
    use mockall::mock;
    use mockall::predicate::function;

    mock! {
        Source {}

        #[async_trait]
        impl DataSource for Source {
            async fn get_observations(
                &self,
                query: &ObservationQuery,
            ) -> fred_data::Result<Vec<Observation>>;
        }
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
    }

    fn catalog() -> Arc<MetadataCatalog> {
        Arc::new(MetadataCatalog::from_entries(vec![IndicatorMetadata {
            series: "UNRATE".to_string(),
            indicator: "Civilian Unemployment Rate".to_string(),
            period: "Monthly".to_string(),
            category: None,
        }]))
    }

    fn fetcher(source: MockSource) -> SeriesFetcher {
        SeriesFetcher::new(Arc::new(source), catalog())
    }

    #[tokio::test]
    async fn test_catalog_hint_and_analysis() {
        let mut source = MockSource::new();
        source
            .expect_get_observations()
            .with(function(|q: &ObservationQuery| {
                q.series_id == "UNRATE" && q.frequency == Some(Frequency::Monthly)
            }))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    Observation::new("2024-01-01", "3.7"),
                    Observation::new("2024-02-01", "3.9"),
                    Observation::new("2024-03-01", "3.8"),
                ])
            });

        let result = fetcher(source).fetch("UNRATE", range()).await;
        assert_eq!(result.indicator_name, "Civilian Unemployment Rate");
        assert_eq!(result.observations().len(), 3);
        assert_eq!(result.analysis().unwrap().data_points, 3);
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn test_unknown_series_uses_bare_id() {
        let mut source = MockSource::new();
        source
            .expect_get_observations()
            .with(function(|q: &ObservationQuery| q.frequency.is_none()))
            .returning(|_| Ok(vec![]));

        let result = fetcher(source).fetch("MYSTERY", range()).await;
        assert_eq!(result.indicator_name, "MYSTERY");
        assert!(result.is_success());
        assert!(!result.has_data());
        assert!(result.analysis().is_none());
    }

    #[tokio::test]
    async fn test_status_error_format() {
        let mut source = MockSource::new();
        source.expect_get_observations().returning(|_| {
            Err(DataError::Status {
                status: 400,
                body: "Bad Request".to_string(),
            })
        });

        let result = fetcher(source).fetch("BOGUS", range()).await;
        assert_eq!(result.error(), Some("BOGUS: status 400, body Bad Request"));
    }

    #[tokio::test]
    async fn test_analytics_failure_keeps_observations() {
        let mut source = MockSource::new();
        source
            .expect_get_observations()
            .returning(|_| Ok(vec![Observation::new("2024-01-01", ".")]));

        let result = fetcher(source).fetch("UNRATE", range()).await;
        assert!(result.is_success());
        assert!(result.has_data());
        assert!(result.analysis().is_none());
    }
}
