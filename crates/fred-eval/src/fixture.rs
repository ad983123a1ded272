//! Labelled test cases
//!
//! A fixture file is a JSON array of cases:
//!
//! ```json
//! [
//!   {
//!     "question": "How has unemployment changed over the past year?",
//!     "question_id": 7,
//!     "tool_call_required": true,
//!     "expected_series_ids": ["UNRATE"],
//!     "expected_date_range": {"relative_start": "1y", "relative_end": "today"}
//!   }
//! ]
//! ```

use crate::error::{EvalError, Result};
use chrono::{Days, NaiveDate};
use fred_agent::parse_date;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const TODAY: &str = "today";

/// Fixture ids are numbers in most files but strings in some
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(u64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub question: String,
    pub question_id: QuestionId,
    #[serde(default = "default_tool_call_required")]
    pub tool_call_required: bool,
    #[serde(default)]
    pub expected_series_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_date_range: Option<ExpectedDateRange>,
}

fn default_tool_call_required() -> bool {
    true
}

/// Expected window, absolute or relative to the evaluation day
///
/// `relative_start` takes precedence over `start`, and `relative_end` (only
/// `"today"` is meaningful) over `end`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedDateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_end: Option<String>,
}

impl ExpectedDateRange {
    pub fn absolute(start: &str, end: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            ..Self::default()
        }
    }

    /// `relative_start` ago up to today
    pub fn trailing(span: &str) -> Self {
        Self {
            relative_start: Some(span.to_string()),
            relative_end: Some(TODAY.to_string()),
            ..Self::default()
        }
    }

    /// `{}` in a fixture means "nothing to check"
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && self.relative_start.is_none()
            && self.relative_end.is_none()
    }

    /// Concrete bounds as of `today`; a bound that is absent or not a
    /// `YYYY-MM-DD` date comes back as `None`
    pub fn resolve(&self, today: NaiveDate) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        let start = match &self.relative_start {
            Some(spec) => Some(spec.parse::<RelativeSpan>()?.before(today)),
            None => self.start.as_deref().and_then(parse_date),
        };
        let end = match self.relative_end.as_deref() {
            Some(TODAY) => Some(today),
            Some(other) => return Err(EvalError::InvalidRelative(other.to_string())),
            None => self.end.as_deref().and_then(parse_date),
        };
        Ok((start, end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanUnit {
    Years,
    Months,
}

/// `"<N>y"` or `"<N>m"`, counted in whole days: a year is 365 days and a
/// month 30
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeSpan {
    pub count: u64,
    pub unit: SpanUnit,
}

impl RelativeSpan {
    pub fn days(self) -> u64 {
        match self.unit {
            SpanUnit::Years => 365 * self.count,
            SpanUnit::Months => 30 * self.count,
        }
    }

    pub fn before(self, date: NaiveDate) -> NaiveDate {
        date.checked_sub_days(Days::new(self.days()))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl FromStr for RelativeSpan {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        let re = regex::Regex::new(r"^(\d+)\s*([ym])$")
            .map_err(|e| EvalError::InvalidRelative(e.to_string()))?;
        let invalid = || EvalError::InvalidRelative(s.to_string());

        let caps = re.captures(s.trim()).ok_or_else(invalid)?;
        let count = caps[1].parse::<u64>().map_err(|_| invalid())?;
        let unit = if &caps[2] == "y" {
            SpanUnit::Years
        } else {
            SpanUnit::Months
        };
        Ok(Self { count, unit })
    }
}

/// Load and validate a fixture file
///
/// Relative specs are checked up front so a typo fails the load rather than
/// zeroing one case in the middle of a run.
pub fn load_test_cases(path: impl AsRef<Path>) -> Result<Vec<TestCase>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| EvalError::FixtureIo {
        path: path.to_path_buf(),
        source,
    })?;
    let cases: Vec<TestCase> = serde_json::from_str(&raw)?;

    for range in cases.iter().filter_map(|c| c.expected_date_range.as_ref()) {
        if let Some(spec) = &range.relative_start {
            spec.parse::<RelativeSpan>()?;
        }
        if let Some(end) = range.relative_end.as_deref().filter(|e| *e != TODAY) {
            return Err(EvalError::InvalidRelative(end.to_string()));
        }
    }

    info!(path = %path.display(), cases = cases.len(), "Loaded test cases");
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_relative_span_parsing() {
        let span: RelativeSpan = "2y".parse().unwrap();
        assert_eq!(span.days(), 730);
        let span: RelativeSpan = " 6 m ".parse().unwrap();
        assert_eq!(span.unit, SpanUnit::Months);
        assert_eq!(span.days(), 180);

        assert!("1w".parse::<RelativeSpan>().is_err());
        assert!("y".parse::<RelativeSpan>().is_err());
        assert!("-1y".parse::<RelativeSpan>().is_err());
    }

    #[test]
    fn test_resolve_trailing_year() {
        let today = date(2025, 3, 15);
        let (start, end) = ExpectedDateRange::trailing("1y").resolve(today).unwrap();
        assert_eq!(start, Some(date(2024, 3, 15)));
        assert_eq!(end, Some(today));
    }

    #[test]
    fn test_resolve_absolute_and_partial() {
        let today = date(2025, 3, 15);
        let range = ExpectedDateRange::absolute("2020-01-01", "2020-12-31");
        assert_eq!(
            range.resolve(today).unwrap(),
            (Some(date(2020, 1, 1)), Some(date(2020, 12, 31)))
        );

        let only_start = ExpectedDateRange {
            start: Some("2019-01-01".into()),
            ..ExpectedDateRange::default()
        };
        assert_eq!(only_start.resolve(today).unwrap(), (Some(date(2019, 1, 1)), None));
    }

    #[test]
    fn test_question_id_forms() {
        let cases: Vec<TestCase> = serde_json::from_str(
            r#"[
                {"question": "a", "question_id": 3},
                {"question": "b", "question_id": "q-4", "tool_call_required": false}
            ]"#,
        )
        .unwrap();
        assert_eq!(cases[0].question_id.to_string(), "3");
        assert!(cases[0].tool_call_required);
        assert!(cases[0].expected_series_ids.is_empty());
        assert_eq!(cases[1].question_id, QuestionId::Text("q-4".into()));
        assert!(!cases[1].tool_call_required);
    }

    #[test]
    fn test_empty_range_object() {
        let case: TestCase = serde_json::from_str(
            r#"{"question": "a", "question_id": 1, "expected_date_range": {}}"#,
        )
        .unwrap();
        assert!(case.expected_date_range.unwrap().is_empty());
    }
}
