//! Retrieval accuracy evaluation for the FRED agent
//!
//! Runs labelled questions through the agent's plan step only (no data is
//! fetched) and scores each one on two axes: whether the right series were
//! requested (F1 over ids) and whether the requested dates, after the same
//! repair the agent applies, land near the expected window.

pub mod error;
pub mod fixture;
pub mod report;
pub mod runner;
pub mod scorer;

pub use error::{EvalError, Result};
pub use fixture::{ExpectedDateRange, QuestionId, RelativeSpan, SpanUnit, TestCase, load_test_cases};
pub use report::{EvaluationReport, EvaluationResult, EvaluationSummary, GroupSummary};
pub use runner::{EvaluationRunner, ToolCallExtractor};
pub use scorer::{AccuracyScorer, DateRangeEvaluation, SeriesIdEvaluation, UNEXPECTED_TOOL_CALL};
