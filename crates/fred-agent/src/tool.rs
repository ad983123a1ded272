//! The `get_fred_data` tool and parsing of its invocations

use fred_llm::tools::schema;
use fred_llm::{ToolDefinition, ToolUse};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const GET_FRED_DATA: &str = "get_fred_data";

/// Schema of the only tool offered to the model
pub fn fred_data_tool() -> ToolDefinition {
    ToolDefinition::new(
        GET_FRED_DATA,
        "Gain economic data from FRED API, for example GDP, unemployment rate, CPI etc.",
        schema::object(
            json!({
                "series_id": schema::string(
                    "FRED data series ID, for example: GDP(US Gross Domestic Product), \
                     UNRATE(Civilian Total Unemployment Rate), \
                     CPIAUCSL(Consumer Price Index: Seasonally Adj.)"
                ),
                "start_date": schema::string(
                    "Start date in YYYY-MM-DD format. For 'current/recent' queries, use 1 year ago. \
                     For specific periods, use the exact start date."
                ),
                "end_date": schema::string(
                    "End date in YYYY-MM-DD format. Usually today's date unless a specific period is requested."
                ),
            }),
            &["series_id", "start_date", "end_date"],
        ),
    )
}

/// A `get_fred_data` invocation as the model wrote it
///
/// Dates are kept raw; [`DateRangeResolver`](crate::DateRangeResolver)
/// decides what they mean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    /// Absent when the model left it out or blank
    pub series_id: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

impl ToolCall {
    /// Read arguments, accepting `start`/`end` as aliases
    pub fn from_tool_use(tool_use: &ToolUse<'_>) -> Self {
        let args = tool_use.input;
        Self {
            call_id: tool_use.id.to_string(),
            series_id: string_arg(args, &["series_id"])
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            start_date: string_arg(args, &["start_date", "start"]).unwrap_or_default(),
            end_date: string_arg(args, &["end_date", "end"]).unwrap_or_default(),
        }
    }

    pub fn series_id(&self) -> Option<&str> {
        self.series_id.as_deref()
    }
}

/// First non-empty string among `keys`
fn string_arg(args: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| args.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(ToString::to_string)
}
