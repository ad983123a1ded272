//! Tool definition types for function calling

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition handed to a chat provider
///
/// Describes a callable function: its name, a description the model reads,
/// and the JSON Schema of its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Helpers to build JSON schemas for tools
pub mod schema {
    use serde_json::{Value, json};

    /// Create a JSON schema for an object with properties
    ///
    /// # Example
    ///
    /// ```
    /// use fred_llm::tools::schema;
    /// use serde_json::json;
    ///
    /// let schema = schema::object(
    ///     json!({
    ///         "series_id": schema::string("FRED series id"),
    ///     }),
    ///     &["series_id"],
    /// );
    /// assert_eq!(schema["required"][0], "series_id");
    /// ```
    pub fn object(properties: Value, required: &[&str]) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// String property schema
    pub fn string(description: &str) -> Value {
        json!({
            "type": "string",
            "description": description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_definition_creation() {
        let schema = schema::object(
            json!({
                "series_id": schema::string("Series"),
            }),
            &["series_id"],
        );

        let tool = ToolDefinition::new("get_fred_data", "Fetch data", schema.clone());
        assert_eq!(tool.name, "get_fred_data");
        assert_eq!(tool.input_schema, schema);
        assert_eq!(tool.input_schema["properties"]["series_id"]["type"], "string");
    }
}
