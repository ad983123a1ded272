//! Scoring one extraction against its labelled case

use crate::fixture::TestCase;
use crate::report::EvaluationResult;
use chrono::NaiveDate;
use fred_agent::{DATE_FORMAT, DateRangeResolver, ToolCall};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const UNEXPECTED_TOOL_CALL: &str =
    "Model incorrectly made a tool call for a non-tool-call question";

/// F1 between expected and requested series ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesIdEvaluation {
    pub score: f64,
    pub correct: Vec<String>,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

impl SeriesIdEvaluation {
    pub fn perfect() -> Self {
        Self {
            score: 1.0,
            correct: Vec::new(),
            missing: Vec::new(),
            extra: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRangeEvaluation {
    pub score: f64,
    pub details: String,
}

/// Scores the plan step of the agent: which series it asked for and over
/// which dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccuracyScorer {
    tolerance_days: u32,
    resolver: DateRangeResolver,
}

impl Default for AccuracyScorer {
    fn default() -> Self {
        Self {
            tolerance_days: 30,
            resolver: DateRangeResolver::default(),
        }
    }
}

impl AccuracyScorer {
    /// `resolver` should match the one the agent uses so that scored dates
    /// are the dates that would actually be fetched
    pub fn new(tolerance_days: u32, resolver: DateRangeResolver) -> Self {
        Self {
            tolerance_days,
            resolver,
        }
    }

    pub fn tolerance_days(&self) -> u32 {
        self.tolerance_days
    }

    /// Score one case; `extraction` is the plan step's tool calls or its
    /// error message
    pub fn score(
        &self,
        case: &TestCase,
        extraction: Result<&[ToolCall], &str>,
        today: NaiveDate,
    ) -> EvaluationResult {
        if !case.tool_call_required {
            return match extraction {
                Ok(calls) if !calls.is_empty() => {
                    EvaluationResult::failed(case, UNEXPECTED_TOOL_CALL, calls.to_vec())
                }
                _ => EvaluationResult::scored(
                    case,
                    Vec::new(),
                    SeriesIdEvaluation::perfect(),
                    DateRangeEvaluation {
                        score: 1.0,
                        details: "No tool call expected or made".to_string(),
                    },
                ),
            };
        }

        let calls = match extraction {
            Ok(calls) => calls,
            Err(error) => return EvaluationResult::failed(case, error, Vec::new()),
        };

        let series = self.evaluate_series_ids(calls, &case.expected_series_ids);
        let dates = self.evaluate_date_range(calls, case, today);
        debug!(
            question_id = %case.question_id,
            series_score = series.score,
            date_score = dates.score,
            "Scored case"
        );
        EvaluationResult::scored(case, calls.to_vec(), series, dates)
    }

    /// A call without a series id counts as the id `""`
    pub fn evaluate_series_ids(&self, calls: &[ToolCall], expected: &[String]) -> SeriesIdEvaluation {
        let expected: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
        let actual: BTreeSet<&str> = calls.iter().map(|c| c.series_id().unwrap_or("")).collect();

        let correct = owned(expected.intersection(&actual));
        let missing = owned(expected.difference(&actual));
        let extra = owned(actual.difference(&expected));

        let score = if expected.is_empty() {
            if actual.is_empty() { 1.0 } else { 0.0 }
        } else if actual.is_empty() {
            0.0
        } else {
            let hits = correct.len() as f64;
            let precision = hits / actual.len() as f64;
            let recall = hits / expected.len() as f64;
            if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            }
        };

        SeriesIdEvaluation {
            score,
            correct,
            missing,
            extra,
        }
    }

    /// Mean over calls of the mean start/end match
    pub fn evaluate_date_range(
        &self,
        calls: &[ToolCall],
        case: &TestCase,
        today: NaiveDate,
    ) -> DateRangeEvaluation {
        let Some(expected) = case.expected_date_range.as_ref().filter(|r| !r.is_empty()) else {
            return no_range();
        };
        if calls.is_empty() {
            return no_range();
        }

        let (expected_start, expected_end) = expected.resolve(today).unwrap_or_else(|e| {
            warn!(question_id = %case.question_id, error = %e, "Unusable expected range");
            (None, None)
        });

        let mut total = 0.0;
        let mut details = Vec::with_capacity(calls.len());
        for call in calls {
            let actual = self
                .resolver
                .resolve(&call.start_date, &call.end_date, today);
            let start = self.date_match(Some(actual.start), expected_start);
            let end = self.date_match(Some(actual.end), expected_end);
            total += (start + end) / 2.0;

            details.push(format!(
                "series_id={}: start: (api call: {} vs expected: {}), end: (api call: {} vs expected: {})",
                call.series_id().unwrap_or(""),
                actual.start.format(DATE_FORMAT),
                show(expected_start),
                actual.end.format(DATE_FORMAT),
                show(expected_end),
            ));
        }

        DateRangeEvaluation {
            score: total / calls.len() as f64,
            details: details.join("; "),
        }
    }

    /// 1.0 on the day, falling linearly to 0.0 at the tolerance
    pub fn date_match(&self, actual: Option<NaiveDate>, expected: Option<NaiveDate>) -> f64 {
        let (Some(actual), Some(expected)) = (actual, expected) else {
            return 0.0;
        };
        let diff = (actual - expected).num_days().unsigned_abs();
        let tolerance = u64::from(self.tolerance_days);
        if diff == 0 {
            1.0
        } else if diff <= tolerance {
            1.0 - diff as f64 / tolerance as f64
        } else {
            0.0
        }
    }
}

fn owned<'a, 'b: 'a>(ids: impl Iterator<Item = &'a &'b str>) -> Vec<String> {
    ids.map(|s| (*s).to_string()).collect()
}

fn no_range() -> DateRangeEvaluation {
    DateRangeEvaluation {
        score: 1.0,
        details: "No date range to evaluate".to_string(),
    }
}

fn show(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "none".to_string(), |d| d.format(DATE_FORMAT).to_string())
}
