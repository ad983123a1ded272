//! Widening retry for ranges that came back empty

use crate::{DateRange, FetchSeries, SeriesResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Retries a fetch with an earlier start date while it yields no observations
///
/// This addresses a wrong guess about where the data lives (a quarterly
/// series asked for last month), not transient failures, so there is no
/// backoff. Attempts are bounded by count only.
pub struct RetrievalFallbackController {
    fetcher: Arc<dyn FetchSeries>,
    widen_days: u64,
}

impl RetrievalFallbackController {
    pub fn new(fetcher: Arc<dyn FetchSeries>) -> Self {
        Self {
            fetcher,
            widen_days: 365,
        }
    }

    pub fn with_widen_days(mut self, days: u64) -> Self {
        self.widen_days = days;
        self
    }

    /// Fetch `series_id`, widening up to `max_attempts - 1` times
    ///
    /// Returns the first result with data, otherwise the last attempt's
    /// result unchanged. `max_attempts == 0` behaves like 1.
    pub async fn fetch_with_fallback(
        &self,
        series_id: &str,
        range: DateRange,
        max_attempts: u32,
    ) -> SeriesResult {
        let max_attempts = max_attempts.max(1);
        let mut range = range;
        let mut attempt = 1;

        loop {
            let mut result = self.fetcher.fetch(series_id, range).await;
            result.attempts = attempt;

            if result.has_data() {
                if attempt > 1 {
                    info!(series_id, attempt, range = %range, "Retry found data");
                }
                return result;
            }
            if attempt >= max_attempts {
                debug!(series_id, attempt, "Fallback attempts exhausted");
                return result;
            }

            range = range.widened(self.widen_days);
            attempt += 1;
            debug!(series_id, attempt, range = %range, "No data, widening range");
        }
    }
}
