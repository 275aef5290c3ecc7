//! Name-keyed tool registry with JSON argument binding and dispatch.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::DocqError;

use super::schema::{sanitize_tool_name, ParamKind, ToolDefinition, ToolParameter};
use super::tool::{ToolArguments, ToolHandler};

/// Registry mapping sanitized tool names to definitions and handlers.
///
/// Dispatch never propagates an error to the caller: [`execute`](Self::execute)
/// always produces a result envelope string, `{"ok": ...}` on success and
/// `{"error": "..."}` on any failure, so the remote agent can react in natural
/// language.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, (ToolDefinition, ToolHandler)>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its sanitized name.
    ///
    /// A later registration with the same sanitized name overwrites the
    /// earlier one.
    pub fn register(&mut self, definition: ToolDefinition, handler: ToolHandler) {
        let name = sanitize_tool_name(&definition.name);
        if self.tools.contains_key(&name) {
            warn!(tool = %name, "overwriting previously registered tool");
        }
        debug!(tool = %name, params = definition.parameters.len(), "registered tool");
        self.tools.insert(name, (definition, handler));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(&sanitize_tool_name(name))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up a definition by (raw or sanitized) name.
    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools
            .get(&sanitize_tool_name(name))
            .map(|(def, _)| def)
    }

    /// All registered definitions, ordered by name.
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        let mut defs: Vec<&ToolDefinition> = self.tools.values().map(|(def, _)| def).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool by name with a raw JSON argument payload.
    ///
    /// Always returns an envelope string; see the type-level docs.
    pub async fn execute(&self, name: &str, args_json: &str) -> String {
        match self.try_execute(name, args_json).await {
            Ok(value) => {
                serde_json::json!({ "ok": value }).to_string()
            }
            Err(err) => {
                let message = match &err {
                    DocqError::UnknownTool(_) => format!("Unknown function: {name}"),
                    DocqError::MissingArgument { parameter, .. } => format!(
                        "Error executing {name}: Missing required parameter: {parameter}"
                    ),
                    DocqError::ToolExecution { message, .. } => {
                        format!("Error executing {name}: {message}")
                    }
                    other => format!("Error executing {name}: {other}"),
                };
                warn!(tool = %name, error = %message, "tool execution failed");
                serde_json::json!({ "error": message }).to_string()
            }
        }
    }

    /// Typed execution path behind [`execute`](Self::execute).
    pub async fn try_execute(
        &self,
        name: &str,
        args_json: &str,
    ) -> Result<serde_json::Value, DocqError> {
        let sanitized = sanitize_tool_name(name);
        let (definition, handler) = self
            .tools
            .get(&sanitized)
            .ok_or_else(|| DocqError::UnknownTool(format!("{name} (sanitized: {sanitized})")))?;

        let args = bind_arguments(definition, args_json)?;
        debug!(tool = %sanitized, args = args.len(), "executing tool");

        handler(args).await.map_err(|err| match err {
            // Already attributed errors pass through untouched.
            e @ DocqError::MissingArgument { .. } | e @ DocqError::UnknownTool(_) => e,
            other => DocqError::ToolExecution {
                tool: sanitized.clone(),
                message: other.to_string(),
            },
        })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Bind a raw JSON payload against a definition's declared parameters.
///
/// A blank payload means "use defaults for every parameter". Otherwise each
/// declared parameter is taken from the payload (coerced to its kind), falls
/// back to its default, or fails as missing when required.
pub fn bind_arguments(
    definition: &ToolDefinition,
    args_json: &str,
) -> Result<ToolArguments, DocqError> {
    let mut values = serde_json::Map::new();

    if args_json.trim().is_empty() {
        for param in &definition.parameters {
            values.insert(param.name.clone(), default_for(param));
        }
        return Ok(ToolArguments::new(values));
    }

    let payload: serde_json::Value =
        serde_json::from_str(args_json).map_err(|e| DocqError::ToolExecution {
            tool: definition.name.clone(),
            message: format!("Invalid arguments JSON: {e}"),
        })?;

    for param in &definition.parameters {
        match payload.get(&param.name) {
            Some(value) => {
                values.insert(param.name.clone(), coerce(param.kind, value));
            }
            None if !param.required() => {
                values.insert(param.name.clone(), default_for(param));
            }
            None => {
                return Err(DocqError::MissingArgument {
                    tool: definition.name.clone(),
                    parameter: param.name.clone(),
                });
            }
        }
    }

    Ok(ToolArguments::new(values))
}

fn default_for(param: &ToolParameter) -> serde_json::Value {
    if let Some(ref default) = param.default {
        return default.clone();
    }
    // Zero value per kind, mirroring default(T) for value types.
    match param.kind {
        ParamKind::Integer => serde_json::json!(0),
        ParamKind::Number => serde_json::json!(0.0),
        ParamKind::Boolean => serde_json::json!(false),
        ParamKind::Array => serde_json::json!([]),
        ParamKind::String => serde_json::json!(""),
    }
}

/// Coerce a payload value to the parameter's native kind. A value that does
/// not match falls back to its raw JSON text as a string rather than failing.
fn coerce(kind: ParamKind, value: &serde_json::Value) -> serde_json::Value {
    let matches = match kind {
        ParamKind::Integer => value.is_i64() || value.is_u64(),
        ParamKind::Number => value.is_number(),
        ParamKind::Boolean => value.is_boolean(),
        ParamKind::Array => value.is_array(),
        ParamKind::String => value.is_string(),
    };
    if matches {
        value.clone()
    } else {
        serde_json::Value::String(raw_text(value))
    }
}

fn raw_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tool::handler;

    fn registry_with_echo() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        let def = ToolDefinition::new("searchIndex", "Searches index for content")
            .required_param("fileName", ParamKind::String, "file to filter")
            .required_param("query", ParamKind::String, "search query");
        registry.register(
            def,
            handler(|args| async move {
                Ok(serde_json::json!({
                    "fileName": args.string("fileName").unwrap_or_default(),
                    "query": args.string("query").unwrap_or_default(),
                }))
            }),
        );
        registry
    }

    #[tokio::test]
    async fn unknown_tool_returns_error_envelope() {
        let registry = ToolRegistry::new();
        let out = registry.execute("nope", "{}").await;
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        let msg = parsed["error"].as_str().unwrap();
        assert!(msg.contains("Unknown function: nope"), "got {msg}");
    }

    #[tokio::test]
    async fn execute_dispatches_with_bound_arguments() {
        let registry = registry_with_echo();
        let out = registry
            .execute("searchindex", r#"{"fileName":"a.pdf","query":"total"}"#)
            .await;
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["ok"]["fileName"], "a.pdf");
        assert_eq!(parsed["ok"]["query"], "total");
    }

    #[tokio::test]
    async fn lookup_accepts_unsanitized_names() {
        let registry = registry_with_echo();
        assert!(registry.contains("SearchIndex"));
        assert!(registry.definition("searchIndex").is_some());
        let out = registry
            .execute("SearchIndex", r#"{"fileName":"a.pdf","query":"q"}"#)
            .await;
        assert!(out.contains("\"ok\""));
    }

    #[tokio::test]
    async fn missing_required_parameter_fails_defaulted_does_not() {
        let def = ToolDefinition::new("f", "test tool")
            .optional_param("a", ParamKind::Integer, "first", serde_json::json!(5))
            .required_param("b", ParamKind::String, "second");

        let err = bind_arguments(&def, "{}").unwrap_err();
        match err {
            DocqError::MissingArgument { parameter, .. } => assert_eq!(parameter, "b"),
            other => panic!("expected MissingArgument, got {other:?}"),
        }

        let args = bind_arguments(&def, r#"{"b":"x"}"#).unwrap();
        assert_eq!(args.integer("a"), Some(5));
        assert_eq!(args.string("b"), Some("x"));
    }

    #[test]
    fn blank_payload_uses_defaults_for_every_parameter() {
        let def = ToolDefinition::new("f", "test tool")
            .optional_param("a", ParamKind::Integer, "first", serde_json::json!(7))
            .required_param("b", ParamKind::String, "second");
        let args = bind_arguments(&def, "   ").unwrap();
        assert_eq!(args.integer("a"), Some(7));
        assert_eq!(args.string("b"), Some(""));
    }

    #[test]
    fn mismatched_value_falls_back_to_raw_string() {
        let def = ToolDefinition::new("f", "test tool")
            .required_param("n", ParamKind::Integer, "count")
            .required_param("tags", ParamKind::Array, "tag list");
        let args = bind_arguments(&def, r#"{"n": {"nested": true}, "tags": 3}"#).unwrap();
        assert_eq!(args.string("n"), Some(r#"{"nested":true}"#));
        assert_eq!(args.string("tags"), Some("3"));
    }

    #[tokio::test]
    async fn handler_error_becomes_error_envelope() {
        let mut registry = ToolRegistry::new();
        registry.register(
            ToolDefinition::new("broken", "always fails"),
            handler(|_| async {
                Err(DocqError::InvalidState("index offline".into()))
            }),
        );
        let out = registry.execute("broken", "{}").await;
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        let msg = parsed["error"].as_str().unwrap();
        assert!(msg.starts_with("Error executing broken:"), "got {msg}");
        assert!(msg.contains("index offline"));
    }

    #[tokio::test]
    async fn string_result_survives_verbatim_inside_envelope() {
        let mut registry = ToolRegistry::new();
        registry.register(
            ToolDefinition::new("greet", "returns text"),
            handler(|_| async { Ok(serde_json::json!("hello there")) }),
        );
        let out = registry.execute("greet", "").await;
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["ok"], "hello there");
    }

    #[tokio::test]
    async fn collision_keeps_last_registration() {
        let mut registry = ToolRegistry::new();
        registry.register(
            ToolDefinition::new("dup", "first"),
            handler(|_| async { Ok(serde_json::json!(1)) }),
        );
        registry.register(
            ToolDefinition::new("Dup", "second"),
            handler(|_| async { Ok(serde_json::json!(2)) }),
        );
        assert_eq!(registry.len(), 1);
        let out = registry.execute("dup", "{}").await;
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["ok"], 2);
    }

    #[test]
    fn definitions_are_ordered_by_name() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(
                ToolDefinition::new(name, "x"),
                handler(|_| async { Ok(serde_json::Value::Null) }),
            );
        }
        let names: Vec<&str> = registry
            .definitions()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
