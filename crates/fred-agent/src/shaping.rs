//! Rendering of fetch results into tool-result messages

use crate::prompts::{ReminderEntry, reminder};
use crate::{Result, SeriesResult, ToolCall};
use fred_analytics::{CompactSummary, DetailOptions, DetailedSummary};
use fred_llm::Message;
use serde::{Deserialize, Serialize};

/// How much of each analysis goes back to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultMode {
    Compact,
    Detailed,
}

impl ResultMode {
    /// Compact once `calls` reaches `compact_threshold`
    pub fn for_call_count(calls: usize, compact_threshold: usize) -> Self {
        if calls >= compact_threshold {
            Self::Compact
        } else {
            Self::Detailed
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisPayload {
    Compact(CompactSummary),
    Detailed(Box<DetailedSummary>),
}

/// JSON body of one tool result
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolPayload {
    Data {
        series_id: String,
        indicator: String,
        data_points: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        analysis: Option<AnalysisPayload>,
    },
    Error {
        error: String,
    },
}

impl ToolPayload {
    pub fn from_result(result: &SeriesResult, mode: ResultMode, options: &DetailOptions) -> Self {
        if let Some(error) = result.error() {
            return Self::Error {
                error: error.to_string(),
            };
        }
        Self::Data {
            series_id: result.series_id.clone(),
            indicator: result.indicator_name.clone(),
            data_points: result.observations().len(),
            analysis: result.analysis().map(|summary| match mode {
                ResultMode::Compact => AnalysisPayload::Compact(summary.compact()),
                ResultMode::Detailed => {
                    AnalysisPayload::Detailed(Box::new(summary.detailed(options)))
                }
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Tool-result text ready to be sent back for one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedResult {
    pub call_id: String,
    pub content: String,
    pub is_error: bool,
}

impl ShapedResult {
    pub fn into_message(self) -> Message {
        if self.is_error {
            Message::tool_error(self.call_id, self.content)
        } else {
            Message::tool_result(self.call_id, self.content)
        }
    }
}

/// Serialize each result and append the reminder to the last one only
///
/// `calls` and `results` are index-aligned.
pub fn shape_results(
    calls: &[ToolCall],
    results: &[SeriesResult],
    mode: ResultMode,
    options: &DetailOptions,
    question: &str,
) -> Result<Vec<ShapedResult>> {
    let mut shaped = calls
        .iter()
        .zip(results)
        .map(|(call, result)| -> Result<ShapedResult> {
            let payload = ToolPayload::from_result(result, mode, options);
            Ok(ShapedResult {
                call_id: call.call_id.clone(),
                content: serde_json::to_string(&payload)?,
                is_error: payload.is_error(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(last) = shaped.last_mut() {
        let entries: Vec<ReminderEntry> = results
            .iter()
            .filter(|r| !r.series_id.is_empty())
            .map(|r| ReminderEntry {
                series_id: r.series_id.clone(),
                indicator: r.indicator_name.clone(),
                failed: !r.has_data(),
            })
            .collect();
        last.content.push_str("\n\n");
        last.content.push_str(&reminder(question, &entries)?);
    }

    Ok(shaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DateRange;
    use chrono::NaiveDate;
    use fred_analytics::TimeSeriesAnalyzer;
    use fred_data::Observation;
    use serde_json::Value;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        )
    }

    fn fetched(series_id: &str, n: u32) -> SeriesResult {
        let observations: Vec<Observation> = (0..n)
            .map(|i| {
                let date = range().start + chrono::Months::new(i);
                Observation::new(date.format("%Y-%m-%d").to_string(), format!("{}", 100 + i))
            })
            .collect();
        let analysis = TimeSeriesAnalyzer::new(&observations)
            .unwrap()
            .summarize()
            .unwrap();
        SeriesResult::fetched(series_id, format!("{series_id} name"), range(), observations, Some(analysis))
    }

    fn call(id: &str, series_id: &str) -> ToolCall {
        ToolCall {
            call_id: id.to_string(),
            series_id: Some(series_id.to_string()),
            start_date: "2023-01-01".to_string(),
            end_date: "2024-12-01".to_string(),
        }
    }

    fn json_part(content: &str) -> Value {
        let body = content.split("\n\n").next().unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_mode_threshold() {
        assert_eq!(ResultMode::for_call_count(2, 3), ResultMode::Detailed);
        assert_eq!(ResultMode::for_call_count(3, 3), ResultMode::Compact);
        assert_eq!(ResultMode::for_call_count(1, 1), ResultMode::Compact);
    }

    #[test]
    fn test_detailed_payload_shape() {
        let payload = ToolPayload::from_result(
            &fetched("UNRATE", 20),
            ResultMode::Detailed,
            &DetailOptions::default(),
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["series_id"], "UNRATE");
        assert_eq!(json["indicator"], "UNRATE name");
        assert_eq!(json["data_points"], 20);
        assert_eq!(json["analysis"]["recent_data"].as_array().unwrap().len(), 12);
        assert!(json["analysis"].get("basic_stats").is_some());
    }

    #[test]
    fn test_compact_payload_shape() {
        let payload = ToolPayload::from_result(
            &fetched("GDP", 20),
            ResultMode::Compact,
            &DetailOptions::default(),
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["analysis"]["recent_data"].as_array().unwrap().len(), 5);
        assert!(json["analysis"].get("basic_stats").is_none());
    }

    #[test]
    fn test_error_payload() {
        let failed = SeriesResult::failed("X", "X", range(), "X: status 500, body oops");
        let payload = ToolPayload::from_result(&failed, ResultMode::Detailed, &DetailOptions::default());
        assert!(payload.is_error());
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"error": "X: status 500, body oops"})
        );
    }

    #[test]
    fn test_reminder_only_on_last_result() {
        let calls = vec![call("a", "GDP"), call("b", "UNRATE")];
        let results = vec![fetched("GDP", 8), fetched("UNRATE", 8)];
        let shaped = shape_results(
            &calls,
            &results,
            ResultMode::Detailed,
            &DetailOptions::default(),
            "GDP vs unemployment?",
        )
        .unwrap();

        assert_eq!(shaped.len(), 2);
        assert_eq!(shaped[0].call_id, "a");
        assert!(!shaped[0].content.contains("Reminder"));
        assert!(shaped[1].content.contains("Reminder"));
        assert!(shaped[1].content.contains("1. GDP: GDP name"));
        assert!(shaped[1].content.contains("2. UNRATE: UNRATE name"));
        assert_eq!(json_part(&shaped[1].content)["series_id"], "UNRATE");
    }

    #[test]
    fn test_error_result_becomes_error_message() {
        let shaped = ShapedResult {
            call_id: "c".to_string(),
            content: "{}".to_string(),
            is_error: true,
        };
        let message = shaped.into_message();
        assert_eq!(message.tool_results(), vec![("c", "{}")]);
    }
}
