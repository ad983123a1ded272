//! Drives fixtures through the plan step and scores them

use crate::fixture::TestCase;
use crate::report::EvaluationReport;
use crate::scorer::AccuracyScorer;
use async_trait::async_trait;
use chrono::NaiveDate;
use fred_agent::{ToolCall, ToolOrchestrator};
use std::sync::Arc;
use tracing::{info, warn};

/// Anything that can turn a question into tool calls
#[async_trait]
pub trait ToolCallExtractor: Send + Sync {
    /// Tool calls planned for `question`, or the error message when the
    /// plan step failed
    async fn extract(&self, question: &str, today: NaiveDate) -> Result<Vec<ToolCall>, String>;
}

#[async_trait]
impl ToolCallExtractor for ToolOrchestrator {
    async fn extract(&self, question: &str, today: NaiveDate) -> Result<Vec<ToolCall>, String> {
        self.extract_tool_calls(question, today)
            .await
            .map(|plan| plan.calls)
            .map_err(|e| e.to_string())
    }
}

pub struct EvaluationRunner {
    extractor: Arc<dyn ToolCallExtractor>,
    scorer: AccuracyScorer,
    limit: Option<usize>,
}

impl EvaluationRunner {
    pub fn new(extractor: Arc<dyn ToolCallExtractor>) -> Self {
        Self {
            extractor,
            scorer: AccuracyScorer::default(),
            limit: None,
        }
    }

    pub fn with_scorer(mut self, scorer: AccuracyScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Stop after the first `limit` cases
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Score every case in order, one question at a time
    pub async fn run(&self, cases: &[TestCase], today: NaiveDate) -> EvaluationReport {
        let count = self.limit.map_or(cases.len(), |l| l.min(cases.len()));
        info!(cases = count, total = cases.len(), "Starting evaluation");

        let mut results = Vec::with_capacity(count);
        for (i, case) in cases.iter().take(count).enumerate() {
            info!(
                index = i + 1,
                of = count,
                question_id = %case.question_id,
                question = %case.question,
                "Evaluating case"
            );

            let extraction = self.extractor.extract(&case.question, today).await;
            if let Err(e) = &extraction {
                warn!(question_id = %case.question_id, error = %e, "Extraction failed");
            }
            let result = self.scorer.score(
                case,
                extraction.as_deref().map_err(String::as_str),
                today,
            );
            info!(
                question_id = %case.question_id,
                success = result.success,
                score = result.overall_score,
                "Case scored"
            );
            results.push(result);
        }

        let report = EvaluationReport::new(results);
        info!(
            passed = report.summary.successful_tests,
            failed = report.summary.failed_tests,
            "Evaluation finished"
        );
        report
    }
}
