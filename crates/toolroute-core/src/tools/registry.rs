//! Tool registry for single-tool selection
//!
//! The registry keeps tools in the order they are shown to the model. The
//! built-in conversational tool is present from construction and always
//! stays last, so a model scanning the catalog sees every specific tool
//! before the catch-all.

use std::sync::Arc;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{json, Value};

use super::handler::{FallbackHandler, ToolHandler};
use crate::chain::{ChainError, ChainResult};

/// Reserved name of the built-in conversational tool
pub const FALLBACK_TOOL_NAME: &str = "conversationalResponse";

/// Required string field of the conversational tool's input
pub const FALLBACK_RESPONSE_FIELD: &str = "response";

/// What runs when a descriptor is selected
#[derive(Clone)]
pub enum ToolBinding {
    /// A caller-registered handler
    Handler(Arc<dyn ToolHandler>),
    /// The conversational fallback; its handler lives in the registry slot
    Fallback,
}

/// A tool as shown to the model
///
/// Serializes as `{name, description, parameters}`; the binding is never
/// serialized.
#[derive(Clone, Serialize)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    parameters: Value,
    #[serde(skip)]
    binding: ToolBinding,
}

impl ToolDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// JSON schema shown to the model; never enforced locally
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    pub fn binding(&self) -> &ToolBinding {
        &self.binding
    }

    /// The bound handler, `None` for the conversational fallback
    pub fn handler(&self) -> Option<&Arc<dyn ToolHandler>> {
        match &self.binding {
            ToolBinding::Handler(handler) => Some(handler),
            ToolBinding::Fallback => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.binding, ToolBinding::Fallback)
    }

    fn fallback() -> Self {
        Self {
            name: FALLBACK_TOOL_NAME.to_string(),
            description: "Respond conversationally if no other tools should be called for a given query."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    FALLBACK_RESPONSE_FIELD: {
                        "type": "string",
                        "description": "Conversational response to the user, in the same language the user wrote in."
                    }
                },
                "required": [FALLBACK_RESPONSE_FIELD]
            }),
            binding: ToolBinding::Fallback,
        }
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("is_fallback", &self.is_fallback())
            .finish()
    }
}

/// Ordered, name-unique collection of tools
///
/// Reads and writes go through a reader/writer lock, so a snapshot taken
/// while another task registers sees either the old or the new list, with
/// the fallback last in both.
pub struct ToolRegistry {
    tools: RwLock<Vec<Arc<ToolDescriptor>>>,
    fallback_handler: RwLock<Option<Arc<dyn FallbackHandler>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a registry holding only the conversational tool
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(vec![Arc::new(ToolDescriptor::fallback())]),
            fallback_handler: RwLock::new(None),
        }
    }

    /// Register a tool
    ///
    /// Fails with `DuplicateName` if `name` is the reserved fallback name or
    /// is already registered; the registry is left untouched in that case.
    pub fn register<H>(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: H,
    ) -> ChainResult<()>
    where
        H: ToolHandler + 'static,
    {
        let descriptor = ToolDescriptor {
            name: name.into(),
            description: description.into(),
            parameters,
            binding: ToolBinding::Handler(Arc::new(handler)),
        };

        let mut tools = self.tools.write();
        if tools.iter().any(|t| t.name == descriptor.name) {
            return Err(ChainError::DuplicateName(descriptor.name));
        }

        // The fallback is always the last element; slot in right before it.
        let at = tools.len() - 1;
        tools.insert(at, Arc::new(descriptor));
        debug_assert!(tools.last().is_some_and(|t| t.is_fallback()));
        Ok(())
    }

    /// Register a tool whose schema is any serializable value
    ///
    /// The schema is converted to JSON up front; a schema JSON cannot
    /// represent fails with `SchemaSerialization` and registers nothing.
    pub fn register_typed<S, H>(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: &S,
        handler: H,
    ) -> ChainResult<()>
    where
        S: Serialize + ?Sized,
        H: ToolHandler + 'static,
    {
        let parameters = serde_json::to_value(schema).map_err(ChainError::SchemaSerialization)?;
        self.register(name, description, parameters, handler)
    }

    /// Bind the conversational tool's handler; last write wins
    pub fn set_fallback_handler<H>(&self, handler: H)
    where
        H: FallbackHandler + 'static,
    {
        *self.fallback_handler.write() = Some(Arc::new(handler));
    }

    pub fn fallback_handler(&self) -> Option<Arc<dyn FallbackHandler>> {
        self.fallback_handler.read().clone()
    }

    pub fn has_fallback_handler(&self) -> bool {
        self.fallback_handler.read().is_some()
    }

    /// Find a tool by name
    pub fn lookup(&self, name: &str) -> ChainResult<Arc<ToolDescriptor>> {
        self.tools
            .read()
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| ChainError::ToolNotFound(name.to_string()))
    }

    /// The full ordered tool list, fallback last
    pub fn snapshot(&self) -> Vec<Arc<ToolDescriptor>> {
        self.tools.read().clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.read().iter().any(|t| t.name == name)
    }

    /// Tool names in catalog order
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.read().iter().map(|t| t.name.clone()).collect()
    }

    /// Number of tools, including the fallback
    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    /// Always false: the fallback is present from construction
    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::HandlerError;
    use crate::types::ToolInput;
    use std::collections::HashMap;

    fn noop(_input: ToolInput) -> Result<(), HandlerError> {
        Ok(())
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": { "location": { "type": "string" } },
            "required": ["location"]
        })
    }

    fn assert_fallback_last(registry: &ToolRegistry) {
        let snapshot = registry.snapshot();
        let last = snapshot.last().expect("registry is never empty");
        assert_eq!(last.name(), FALLBACK_TOOL_NAME);
        assert!(last.is_fallback());
        assert_eq!(snapshot.iter().filter(|t| t.is_fallback()).count(), 1);
    }

    #[test]
    fn test_new_registry_holds_only_fallback() {
        let registry = ToolRegistry::new();

        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
        assert!(!registry.has_fallback_handler());
        assert_fallback_last(&registry);

        let fallback = registry.lookup(FALLBACK_TOOL_NAME).unwrap();
        assert_eq!(fallback.parameters()["required"], json!(["response"]));
        assert_eq!(fallback.parameters()["properties"]["response"]["type"], "string");
        assert!(fallback.handler().is_none());
    }

    #[test]
    fn test_fallback_stays_last_in_insertion_order() {
        let registry = ToolRegistry::new();

        for name in ["zeta", "alpha", "getWeather", "beta"] {
            registry.register(name, "a tool", schema(), noop).unwrap();
            assert_fallback_last(&registry);
        }

        assert_eq!(
            registry.tool_names(),
            vec!["zeta", "alpha", "getWeather", "beta", FALLBACK_TOOL_NAME]
        );
    }

    #[test]
    fn test_reserved_name_rejected_without_mutation() {
        let registry = ToolRegistry::new();
        registry.register("getWeather", "weather", schema(), noop).unwrap();
        let before = registry.tool_names();

        let err = registry
            .register(FALLBACK_TOOL_NAME, "shadow", json!({}), noop)
            .unwrap_err();

        assert!(matches!(err, ChainError::DuplicateName(ref n) if n == FALLBACK_TOOL_NAME));
        assert_eq!(registry.tool_names(), before);
        assert!(registry.lookup(FALLBACK_TOOL_NAME).unwrap().is_fallback());
    }

    #[test]
    fn test_duplicate_user_tool_rejected() {
        let registry = ToolRegistry::new();
        registry.register("getWeather", "first", schema(), noop).unwrap();

        let err = registry.register("getWeather", "second", json!({}), noop).unwrap_err();

        assert!(matches!(err, ChainError::DuplicateName(_)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("getWeather").unwrap().description(), "first");
    }

    #[test]
    fn test_lookup() {
        let registry = ToolRegistry::new();
        registry.register("getWeather", "weather", schema(), noop).unwrap();

        let tool = registry.lookup("getWeather").unwrap();
        assert_eq!(tool.parameters(), &schema());
        assert!(tool.handler().is_some());
        assert!(registry.contains("getWeather"));

        let err = registry.lookup("getweather").unwrap_err();
        assert!(matches!(err, ChainError::ToolNotFound(ref n) if n == "getweather"));
    }

    #[test]
    fn test_register_typed() {
        #[derive(Serialize)]
        struct Schema {
            r#type: &'static str,
            required: Vec<&'static str>,
        }

        let registry = ToolRegistry::new();
        registry
            .register_typed(
                "search",
                "web search",
                &Schema { r#type: "object", required: vec!["query"] },
                noop,
            )
            .unwrap();
        assert_eq!(registry.lookup("search").unwrap().parameters()["required"], json!(["query"]));

        let mut unrepresentable: HashMap<(u8, u8), &str> = HashMap::new();
        unrepresentable.insert((1, 2), "tuple keys are not JSON object keys");

        let err = registry
            .register_typed("broken", "bad schema", &unrepresentable, noop)
            .unwrap_err();
        assert!(matches!(err, ChainError::SchemaSerialization(_)));
        assert!(!registry.contains("broken"));
    }

    #[test]
    fn test_set_fallback_handler_last_write_wins() {
        use parking_lot::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = ToolRegistry::new();

        let first = Arc::clone(&seen);
        registry.set_fallback_handler(move |r: &str| first.lock().push(format!("first:{}", r)));
        let second = Arc::clone(&seen);
        registry.set_fallback_handler(move |r: &str| second.lock().push(format!("second:{}", r)));

        registry.fallback_handler().unwrap().respond("hi");
        assert_eq!(*seen.lock(), vec!["second:hi".to_string()]);
    }

    #[test]
    fn test_descriptor_serialization_omits_binding() {
        let registry = ToolRegistry::new();
        registry.register("getWeather", "weather", schema(), noop).unwrap();

        let value = serde_json::to_value(&*registry.lookup("getWeather").unwrap()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(value["name"], "getWeather");
        assert_eq!(value["description"], "weather");
        assert_eq!(value["parameters"], schema());
    }

    #[test]
    fn test_concurrent_registration_keeps_fallback_last() {
        let registry = ToolRegistry::new();

        std::thread::scope(|s| {
            for worker in 0..4 {
                let registry = &registry;
                s.spawn(move || {
                    for i in 0..50 {
                        registry
                            .register(format!("tool_{}_{}", worker, i), "t", json!({}), noop)
                            .unwrap();
                    }
                });
            }
            for _ in 0..2 {
                let registry = &registry;
                s.spawn(move || {
                    for _ in 0..200 {
                        assert_fallback_last(registry);
                    }
                });
            }
        });

        assert_eq!(registry.len(), 201);
        assert_fallback_last(&registry);
    }
}
