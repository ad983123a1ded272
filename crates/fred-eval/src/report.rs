//! Per-case results, the aggregate summary and JSON export

use crate::error::{EvalError, Result};
use crate::fixture::{QuestionId, TestCase};
use crate::scorer::{DateRangeEvaluation, SeriesIdEvaluation};
use fred_agent::ToolCall;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub question_id: QuestionId,
    pub question: String,
    pub tool_call_required: bool,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub actual_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id_evaluation: Option<SeriesIdEvaluation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range_evaluation: Option<DateRangeEvaluation>,
    pub overall_score: f64,
}

impl EvaluationResult {
    /// Both axes weigh half
    pub fn scored(
        case: &TestCase,
        actual_calls: Vec<ToolCall>,
        series: SeriesIdEvaluation,
        dates: DateRangeEvaluation,
    ) -> Self {
        Self {
            question_id: case.question_id.clone(),
            question: case.question.clone(),
            tool_call_required: case.tool_call_required,
            success: true,
            error: None,
            actual_calls,
            overall_score: series.score * 0.5 + dates.score * 0.5,
            series_id_evaluation: Some(series),
            date_range_evaluation: Some(dates),
        }
    }

    pub fn failed(case: &TestCase, error: &str, actual_calls: Vec<ToolCall>) -> Self {
        Self {
            question_id: case.question_id.clone(),
            question: case.question.clone(),
            tool_call_required: case.tool_call_required,
            success: false,
            error: Some(error.to_string()),
            actual_calls,
            series_id_evaluation: None,
            date_range_evaluation: None,
            overall_score: 0.0,
        }
    }

    pub fn series_id_score(&self) -> Option<f64> {
        self.series_id_evaluation.as_ref().map(|e| e.score)
    }

    pub fn date_range_score(&self) -> Option<f64> {
        self.date_range_evaluation.as_ref().map(|e| e.score)
    }
}

/// Counts and mean scores for one slice of the results
///
/// Means cover successful cases only and are `None` when there are none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub tests: usize,
    pub passed: usize,
    pub avg_series_id_score: Option<f64>,
    pub avg_date_range_score: Option<f64>,
    pub avg_overall_score: Option<f64>,
}

impl GroupSummary {
    fn from_results<'a>(results: impl IntoIterator<Item = &'a EvaluationResult>) -> Self {
        let results: Vec<&EvaluationResult> = results.into_iter().collect();
        let passed: Vec<&EvaluationResult> = results.iter().copied().filter(|r| r.success).collect();

        Self {
            tests: results.len(),
            passed: passed.len(),
            avg_series_id_score: mean(passed.iter().filter_map(|r| r.series_id_score())),
            avg_date_range_score: mean(passed.iter().filter_map(|r| r.date_range_score())),
            avg_overall_score: mean(passed.iter().map(|r| r.overall_score)),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub total_tests: usize,
    pub successful_tests: usize,
    pub failed_tests: usize,
    pub tool_call: GroupSummary,
    pub non_tool_call: GroupSummary,
    pub overall: GroupSummary,
}

impl EvaluationSummary {
    pub fn from_results(results: &[EvaluationResult]) -> Self {
        let overall = GroupSummary::from_results(results);
        Self {
            total_tests: overall.tests,
            successful_tests: overall.passed,
            failed_tests: overall.tests - overall.passed,
            tool_call: GroupSummary::from_results(results.iter().filter(|r| r.tool_call_required)),
            non_tool_call: GroupSummary::from_results(
                results.iter().filter(|r| !r.tool_call_required),
            ),
            overall,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub results: Vec<EvaluationResult>,
    pub summary: EvaluationSummary,
}

impl EvaluationReport {
    pub fn new(results: Vec<EvaluationResult>) -> Self {
        let summary = EvaluationSummary::from_results(&results);
        Self { results, summary }
    }

    /// Write the report as pretty-printed JSON, creating parent directories
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| EvalError::FixtureIo {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(io_err)?;

        info!(path = %path.display(), results = self.results.len(), "Exported evaluation report");
        Ok(())
    }
}
