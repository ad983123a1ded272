//! Per-call retrieval outcome

use crate::DateRange;
use fred_analytics::AnalysisSummary;
use fred_data::Observation;
use serde::{Deserialize, Serialize};

/// How one fetch attempt ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchStatus {
    /// The data source answered; an empty list is not a failure
    Fetched {
        observations: Vec<Observation>,
        /// Absent when no analytics could be computed
        analysis: Option<Box<AnalysisSummary>>,
    },
    Failed {
        error: String,
    },
}

/// Outcome of the last fetch attempt for one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub series_id: String,
    /// Display name from the metadata catalog, or the series id
    pub indicator_name: String,
    /// Effective range of the last attempt
    pub range: DateRange,
    /// Attempts made, including the first
    pub attempts: u32,
    #[serde(flatten)]
    pub status: FetchStatus,
}

impl SeriesResult {
    pub fn fetched(
        series_id: impl Into<String>,
        indicator_name: impl Into<String>,
        range: DateRange,
        observations: Vec<Observation>,
        analysis: Option<AnalysisSummary>,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            indicator_name: indicator_name.into(),
            range,
            attempts: 1,
            status: FetchStatus::Fetched {
                observations,
                analysis: analysis.map(Box::new),
            },
        }
    }

    pub fn failed(
        series_id: impl Into<String>,
        indicator_name: impl Into<String>,
        range: DateRange,
        error: impl Into<String>,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            indicator_name: indicator_name.into(),
            range,
            attempts: 1,
            status: FetchStatus::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, FetchStatus::Fetched { .. })
    }

    /// Fetched with at least one observation
    pub fn has_data(&self) -> bool {
        !self.observations().is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        match &self.status {
            FetchStatus::Fetched { observations, .. } => observations,
            FetchStatus::Failed { .. } => &[],
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisSummary> {
        match &self.status {
            FetchStatus::Fetched { analysis, .. } => analysis.as_deref(),
            FetchStatus::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FetchStatus::Failed { error } => Some(error),
            FetchStatus::Fetched { .. } => None,
        }
    }
}
