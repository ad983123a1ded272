//! Agent configuration

use crate::error::{AgentError, Result};
use fred_analytics::{AnalyticsConfig, DetailOptions};
use fred_utils::{env_flag, env_parse, env_var};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything the orchestrator needs, built once at start-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Chat model identifier
    pub model: String,

    /// Max tokens per model turn
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Tool-call count at which results switch to compact summaries
    pub compact_threshold: usize,

    /// Fetch attempts per series, including the first
    pub fallback_attempts: u32,

    /// Days the start date moves back on each retry
    pub widen_days: u64,

    /// Width of the window used when the model's dates are unusable
    pub default_window_days: u64,

    /// Trailing points attached to detailed summaries
    pub recent_points: usize,

    /// Attach the whole annotated series to detailed summaries
    pub include_full_timeseries: bool,

    /// Fetch the series of one question concurrently
    pub parallel_fetch: bool,

    /// Upper bound for one question, both model turns included
    pub question_timeout: Duration,

    /// Analytics tunables
    pub analytics: AnalyticsConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            max_tokens: 2048,
            temperature: 0.2,
            compact_threshold: 3,
            fallback_attempts: 2,
            widen_days: 365,
            default_window_days: 365,
            recent_points: 12,
            include_full_timeseries: false,
            parallel_fetch: true,
            question_timeout: Duration::from_secs(180),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Create a new configuration builder
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Defaults overridden by `FRED_AGENT_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(AgentError::Config("model must not be empty".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(AgentError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AgentError::Config(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.compact_threshold == 0 {
            return Err(AgentError::Config(
                "compact_threshold must be greater than 0".to_string(),
            ));
        }
        if self.widen_days == 0 || self.default_window_days == 0 {
            return Err(AgentError::Config(
                "date windows must be at least one day".to_string(),
            ));
        }
        if self.question_timeout.is_zero() {
            return Err(AgentError::Config(
                "question_timeout must be greater than 0".to_string(),
            ));
        }
        self.analytics
            .validate()
            .map_err(|e| AgentError::Config(format!("analytics: {e}")))
    }

    /// Recent-window settings for detailed summaries
    pub fn detail_options(&self) -> DetailOptions {
        DetailOptions {
            recent_points: self.recent_points,
            include_full_timeseries: self.include_full_timeseries,
        }
    }
}

/// Builder for AgentConfig
#[derive(Debug, Default)]
pub struct AgentConfigBuilder {
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    compact_threshold: Option<usize>,
    fallback_attempts: Option<u32>,
    widen_days: Option<u64>,
    default_window_days: Option<u64>,
    recent_points: Option<usize>,
    include_full_timeseries: Option<bool>,
    parallel_fetch: Option<bool>,
    question_timeout: Option<Duration>,
    analytics: Option<AnalyticsConfig>,
}

impl AgentConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn compact_threshold(mut self, threshold: usize) -> Self {
        self.compact_threshold = Some(threshold);
        self
    }

    pub fn fallback_attempts(mut self, attempts: u32) -> Self {
        self.fallback_attempts = Some(attempts);
        self
    }

    pub fn widen_days(mut self, days: u64) -> Self {
        self.widen_days = Some(days);
        self
    }

    pub fn default_window_days(mut self, days: u64) -> Self {
        self.default_window_days = Some(days);
        self
    }

    pub fn recent_points(mut self, points: usize) -> Self {
        self.recent_points = Some(points);
        self
    }

    pub fn include_full_timeseries(mut self, include: bool) -> Self {
        self.include_full_timeseries = Some(include);
        self
    }

    pub fn parallel_fetch(mut self, parallel: bool) -> Self {
        self.parallel_fetch = Some(parallel);
        self
    }

    pub fn question_timeout(mut self, timeout: Duration) -> Self {
        self.question_timeout = Some(timeout);
        self
    }

    pub fn analytics(mut self, analytics: AnalyticsConfig) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Fill unset fields from `FRED_AGENT_*` environment variables
    pub fn with_env(mut self) -> Result<Self> {
        self.model = self.model.or_else(|| env_var("FRED_AGENT_MODEL").ok());
        self.max_tokens = self.max_tokens.or(env_parse("FRED_AGENT_MAX_TOKENS")?);
        self.temperature = self.temperature.or(env_parse("FRED_AGENT_TEMPERATURE")?);
        self.compact_threshold = self
            .compact_threshold
            .or(env_parse("FRED_AGENT_COMPACT_THRESHOLD")?);
        self.fallback_attempts = self
            .fallback_attempts
            .or(env_parse("FRED_AGENT_FALLBACK_ATTEMPTS")?);
        self.parallel_fetch = self.parallel_fetch.or(env_flag("FRED_AGENT_PARALLEL_FETCH")?);
        if self.question_timeout.is_none() {
            self.question_timeout =
                env_parse::<u64>("FRED_AGENT_TIMEOUT_SECS")?.map(Duration::from_secs);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<AgentConfig> {
        let defaults = AgentConfig::default();

        let config = AgentConfig {
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            compact_threshold: self.compact_threshold.unwrap_or(defaults.compact_threshold),
            fallback_attempts: self.fallback_attempts.unwrap_or(defaults.fallback_attempts),
            widen_days: self.widen_days.unwrap_or(defaults.widen_days),
            default_window_days: self
                .default_window_days
                .unwrap_or(defaults.default_window_days),
            recent_points: self.recent_points.unwrap_or(defaults.recent_points),
            include_full_timeseries: self
                .include_full_timeseries
                .unwrap_or(defaults.include_full_timeseries),
            parallel_fetch: self.parallel_fetch.unwrap_or(defaults.parallel_fetch),
            question_timeout: self.question_timeout.unwrap_or(defaults.question_timeout),
            analytics: self.analytics.unwrap_or(defaults.analytics),
        };

        config.validate()?;
        Ok(config)
    }
}
