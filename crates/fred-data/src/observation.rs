//! Observation wire types and query parameters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single observation as FRED returns it
///
/// Both fields stay as strings; FRED marks missing values with `"."`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Date of observation (YYYY-MM-DD)
    pub date: String,
    /// Value (can be "." for missing data)
    pub value: String,
}

impl Observation {
    /// Convenience constructor
    pub fn new(date: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value: value.into(),
        }
    }
}

/// FRED observations response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationsResponse {
    /// Observations in the order FRED returned them
    pub observations: Vec<Observation>,
}

/// Reporting frequency of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl Frequency {
    /// Parse the free-text period column of the metadata table
    ///
    /// Accepts single letters (`M`, `Q`) as well as words (`Monthly`,
    /// `Weekly, Ending Friday`).
    pub fn from_period(period: &str) -> Option<Self> {
        let period = period.trim().to_ascii_lowercase();
        if period.starts_with("semi") || period == "sa" {
            return Some(Self::SemiAnnual);
        }
        match period.chars().next()? {
            'd' => Some(Self::Daily),
            'w' => Some(Self::Weekly),
            'm' => Some(Self::Monthly),
            'q' => Some(Self::Quarterly),
            'a' | 'y' => Some(Self::Annual),
            _ => None,
        }
    }

    /// Code accepted by the `frequency` query parameter
    pub fn api_code(self) -> &'static str {
        match self {
            Self::Daily => "d",
            Self::Weekly => "w",
            Self::Monthly => "m",
            Self::Quarterly => "q",
            Self::SemiAnnual => "sa",
            Self::Annual => "a",
        }
    }

    /// Short tag used in the indicator guide
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Daily => "D",
            Self::Weekly => "W",
            Self::Monthly => "M",
            Self::Quarterly => "Q",
            Self::SemiAnnual => "SA",
            Self::Annual => "Y",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::SemiAnnual => "semiannual",
            Self::Annual => "annual",
        };
        f.write_str(name)
    }
}

/// Parameters for one observations request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationQuery {
    pub series_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Aggregation hint forwarded to FRED
    pub frequency: Option<Frequency>,
}

impl ObservationQuery {
    pub fn new(series_id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            series_id: series_id.into(),
            start,
            end,
            frequency: None,
        }
    }

    pub fn with_frequency(mut self, frequency: Option<Frequency>) -> Self {
        self.frequency = frequency;
        self
    }
}
