//! Tool selection types exchanged with the model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arguments supplied by the model for the selected tool
pub type ToolInput = Map<String, Value>;

/// Tool call decoded from a model reply
///
/// The wire shape is exactly `{"tool": <string>, "toolInput": <object>}`.
/// Both keys are required and no other keys are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolCall {
    /// Name of the selected tool
    #[serde(rename = "tool")]
    pub name: String,
    /// Input arguments for the tool
    #[serde(rename = "toolInput")]
    pub input: ToolInput,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(name: impl Into<String>, input: ToolInput) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }

    /// Decode a raw model reply
    pub fn from_reply(reply: &str) -> serde_json::Result<Self> {
        serde_json::from_str(reply)
    }

    /// Get an input argument by key
    pub fn get_arg(&self, key: &str) -> Option<&Value> {
        self.input.get(key)
    }

    /// Get an input argument as a string
    pub fn get_arg_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(|v| v.as_str())
    }

    pub fn into_input(self) -> ToolInput {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_reply() {
        let call = ToolCall::from_reply(
            r#"{"tool":"getWeather","toolInput":{"location":"Jakarta","days":3}}"#,
        )
        .unwrap();

        assert_eq!(call.name, "getWeather");
        assert_eq!(call.get_arg_str("location"), Some("Jakarta"));
        assert_eq!(call.get_arg("days"), Some(&json!(3)));
        assert_eq!(call.get_arg_str("days"), None);
    }

    #[test]
    fn test_decode_tolerates_surrounding_whitespace() {
        let call = ToolCall::from_reply("\n  {\"tool\": \"a\", \"toolInput\": {}}\n").unwrap();
        assert_eq!(call.name, "a");
        assert!(call.input.is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        let rejected = [
            "not json at all",
            r#"{"tool":"a"}"#,
            r#"{"toolInput":{}}"#,
            r#"{"tool":"a","toolInput":{},"extra":1}"#,
            r#"{"tool":"a","toolInput":[]}"#,
            r#"{"tool":7,"toolInput":{}}"#,
            r#"[{"tool":"a","toolInput":{}}]"#,
        ];

        for reply in rejected {
            assert!(ToolCall::from_reply(reply).is_err(), "accepted: {}", reply);
        }
    }
}
