//! Federal Reserve Economic Data (FRED) API client
//!
//! API Key: Free registration at https://fred.stlouisfed.org/docs/api/api_key.html
//! Rate Limit: 120 requests per minute

use crate::error::{DataError, Result};
use crate::{DataSource, Observation, ObservationQuery, ObservationsResponse};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Default FRED endpoint
pub const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

const DEFAULT_RATE_LIMIT: u32 = 120;

/// Connection settings for [`FredClient`]
#[derive(Debug, Clone)]
pub struct FredConfig {
    /// FRED API key
    pub api_key: String,
    /// Base URL, overridable for proxies and tests
    pub base_url: String,
    /// Requests per minute
    pub rate_limit: u32,
    /// Request timeout
    pub timeout: Duration,
    /// Lifetime of cached responses; `None` disables caching
    pub cache_ttl: Option<Duration>,
}

impl FredConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: FRED_BASE_URL.to_string(),
            rate_limit: DEFAULT_RATE_LIMIT,
            timeout: Duration::from_secs(30),
            cache_ttl: Some(Duration::from_secs(3600)),
        }
    }

    /// Read `FRED_API_KEY` (required) and `FRED_BASE_URL` (optional)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("FRED_API_KEY").map_err(|_| {
            DataError::Config("FRED_API_KEY environment variable not set".to_string())
        })?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("FRED_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit = per_minute;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(DataError::Config("FRED API key is empty".to_string()));
        }
        if self.rate_limit == 0 {
            return Err(DataError::Config("rate limit must be greater than 0".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(DataError::Config("FRED base URL is empty".to_string()));
        }
        Ok(())
    }
}

/// FRED API client
pub struct FredClient {
    client: Client,
    config: FredConfig,
    rate_limiter: SharedRateLimiter,
}

impl FredClient {
    /// Create a client from explicit settings
    pub fn new(config: FredConfig) -> Result<Self> {
        config.validate()?;
        let per_minute = NonZeroU32::new(config.rate_limit)
            .ok_or_else(|| DataError::Config("rate limit must be greater than 0".to_string()))?;
        let client = Client::builder().timeout(config.timeout).build()?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Create from environment variable FRED_API_KEY
    pub fn from_env() -> Result<Self> {
        Self::new(FredConfig::from_env()?)
    }

    pub fn config(&self) -> &FredConfig {
        &self.config
    }

    fn query_params(&self, query: &ObservationQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("series_id", query.series_id.clone()),
            ("api_key", self.config.api_key.clone()),
            ("file_type", "json".to_string()),
            ("observation_start", query.start.format("%Y-%m-%d").to_string()),
            ("observation_end", query.end.format("%Y-%m-%d").to_string()),
        ];
        if let Some(frequency) = query.frequency {
            params.push(("frequency", frequency.api_code().to_string()));
        }
        params
    }
}

#[async_trait]
impl DataSource for FredClient {
    #[instrument(skip(self, query), fields(series_id = %query.series_id, start = %query.start, end = %query.end))]
    async fn get_observations(&self, query: &ObservationQuery) -> Result<Vec<Observation>> {
        self.rate_limiter.until_ready().await;

        let url = format!(
            "{}/series/observations",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .get(&url)
            .query(&self.query_params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data: ObservationsResponse = response.json().await?;
        debug!(count = data.observations.len(), "Fetched observations");
        Ok(data.observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frequency;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = FredConfig::new("key");
        assert_eq!(config.base_url, FRED_BASE_URL);
        assert_eq!(config.rate_limit, 120);
        assert!(config.validate().is_ok());
        assert!(FredConfig::new("  ").validate().is_err());
    }

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        let config = FredConfig::new("key").with_rate_limit(0);
        assert!(matches!(config.validate(), Err(DataError::Config(_))));
        assert!(FredClient::new(config).is_err());
    }

    #[test]
    fn test_query_params_include_frequency_code() {
        let client = FredClient::new(FredConfig::new("secret")).unwrap();
        let query = ObservationQuery::new("UNRATE", date("2024-01-01"), date("2024-12-31"))
            .with_frequency(Some(Frequency::Monthly));

        let params = client.query_params(&query);
        assert!(params.contains(&("observation_start", "2024-01-01".to_string())));
        assert!(params.contains(&("observation_end", "2024-12-31".to_string())));
        assert!(params.contains(&("frequency", "m".to_string())));
        assert!(params.contains(&("file_type", "json".to_string())));
    }

    #[test]
    fn test_query_params_without_frequency() {
        let client = FredClient::new(FredConfig::new("secret")).unwrap();
        let query = ObservationQuery::new("GDP", date("2020-01-01"), date("2024-01-01"));
        assert!(!client.query_params(&query).iter().any(|(k, _)| *k == "frequency"));
    }

    #[tokio::test]
    #[ignore = "Requires FRED_API_KEY"]
    async fn test_live_unrate() {
        let client = FredClient::from_env().unwrap();
        let query = ObservationQuery::new("UNRATE", date("2023-01-01"), date("2023-12-31"));
        let observations = client.get_observations(&query).await.unwrap();
        assert_eq!(observations.len(), 12);
    }
}
