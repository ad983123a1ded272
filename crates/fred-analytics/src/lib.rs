//! Time-series analytics for economic indicators
//!
//! Turns a raw FRED observation list into grounded facts for a language
//! model: extrema, central tendency, first-to-last change, a linear trend
//! label, rolling volatility shifts, MoM/YoY deltas, turning points, and the
//! largest single-period moves.
//!
//! The main entry point is [`TimeSeriesAnalyzer`]. Its [`AnalysisSummary`]
//! can be reduced to a [`CompactSummary`] or a windowed [`DetailedSummary`]
//! depending on how much prompt space is available.

pub mod analyzer;
pub mod changes;
pub mod error;
pub mod peaks;
pub mod series;
pub mod stats;
pub mod trend;
pub mod volatility;

pub use analyzer::{
    AnalysisSummary, AnalyticsConfig, ChangeMetrics, CompactPoint, CompactSummary, DetailOptions,
    DetailedSummary, TimeSeriesAnalyzer, TimeSpan,
};
pub use changes::{
    AnnotatedPoint, Inflection, InflectionConfig, InflectionSummary, LagPolicy, Lags,
    NotableChange, NotablePeriods,
};
pub use error::{AnalyticsError, Result};
pub use series::{SeriesPoint, parse_observations};
pub use stats::{BasicStats, DatedValue, TotalChange, percent_change};
pub use trend::{Trend, TrendDirection, TrendStrength, TrendThresholds};
pub use volatility::{Volatility, VolatilityAssessment, VolatilityConfig};
