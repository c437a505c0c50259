//! System prompt rendering
//!
//! The tool catalog is serialized as a compact JSON array of
//! `{name, description, parameters}` objects, in registry order, and
//! substituted into a fixed instruction template.

use std::sync::Arc;

use crate::chain::{ChainError, ChainResult};
use crate::tools::ToolDescriptor;

/// Placeholder replaced by the serialized tool catalog
pub const TOOLS_PLACEHOLDER: &str = "{functionsToCall}";

/// Instruction template sent as the system message
pub const TOOL_SELECTION_TEMPLATE: &str = r#"
You have access to the following tools:

{functionsToCall}

You must always select exactly one of the above tools and respond with only a JSON object matching the following schema:

{
	"tool": <name of the selected tool>,
	"toolInput": <parameters for the selected tool, matching the tool's JSON schema>
}

"#;

/// Serialize the catalog alone
pub fn render_catalog(tools: &[Arc<ToolDescriptor>]) -> ChainResult<String> {
    let entries: Vec<&ToolDescriptor> = tools.iter().map(Arc::as_ref).collect();
    serde_json::to_string(&entries).map_err(ChainError::SchemaSerialization)
}

/// Render the system prompt for a registry snapshot
pub fn render(tools: &[Arc<ToolDescriptor>]) -> ChainResult<String> {
    let catalog = render_catalog(tools)?;
    Ok(TOOL_SELECTION_TEMPLATE.replacen(TOOLS_PLACEHOLDER, &catalog, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{HandlerError, ToolRegistry, FALLBACK_TOOL_NAME};
    use crate::types::ToolInput;
    use serde_json::{json, Value};

    fn noop(_input: ToolInput) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Pull the catalog back out of a rendered prompt
    fn extract_catalog(prompt: &str) -> Value {
        let start = prompt.find("\n[").expect("catalog start") + 1;
        let end = prompt.find("]\n").expect("catalog end") + 1;
        serde_json::from_str(&prompt[start..end]).unwrap()
    }

    #[test]
    fn test_template_has_single_placeholder() {
        assert_eq!(TOOL_SELECTION_TEMPLATE.matches(TOOLS_PLACEHOLDER).count(), 1);
    }

    #[test]
    fn test_render_fallback_only() {
        let registry = ToolRegistry::new();
        let prompt = render(&registry.snapshot()).unwrap();

        assert!(!prompt.contains(TOOLS_PLACEHOLDER));
        assert!(prompt.contains("You must always select exactly one of the above tools"));
        assert!(prompt.contains("\"toolInput\""));

        let catalog = extract_catalog(&prompt);
        assert_eq!(catalog.as_array().unwrap().len(), 1);
        assert_eq!(catalog[0]["name"], FALLBACK_TOOL_NAME);
    }

    #[test]
    fn test_render_preserves_order_and_fields() {
        let registry = ToolRegistry::new();
        let weather = json!({
            "type": "object",
            "properties": {
                "location": { "type": "string", "description": "The city and state, e.g. San Francisco, CA" },
                "unit": { "type": "string", "enum": ["celsius", "fahrenheit"] }
            },
            "required": ["location"]
        });
        registry
            .register("getCurrentWeather", "Get the current weather in a given location", weather.clone(), noop)
            .unwrap();
        registry.register("search", "Search the web", json!({}), noop).unwrap();

        let snapshot = registry.snapshot();
        let catalog = extract_catalog(&render(&snapshot).unwrap());
        let entries = catalog.as_array().unwrap();

        assert_eq!(entries.len(), snapshot.len());
        for (entry, tool) in entries.iter().zip(snapshot.iter()) {
            let obj = entry.as_object().unwrap();
            let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            keys.sort_unstable();
            assert_eq!(keys, vec!["description", "name", "parameters"]);
            assert_eq!(entry["name"], tool.name());
            assert_eq!(&entry["parameters"], tool.parameters());
        }
        assert_eq!(entries[0]["parameters"], weather);
        assert_eq!(entries[2]["name"], FALLBACK_TOOL_NAME);
    }

    #[test]
    fn test_render_is_deterministic() {
        let registry = ToolRegistry::new();
        registry.register("a", "first", json!({"type": "object"}), noop).unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(render(&snapshot).unwrap(), render(&snapshot).unwrap());
    }
}
