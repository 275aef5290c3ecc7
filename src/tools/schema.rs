//! Tool definitions and parameter schemas.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Coarse semantic type tag for a tool parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Integer,
    Number,
    Boolean,
    Array,
    String,
}

impl ParamKind {
    /// JSON Schema type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::String => "string",
        }
    }
}

/// One declared parameter of a tool.
///
/// A parameter is required exactly when it declares no default value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl ToolParameter {
    pub fn required(&self) -> bool {
        self.default.is_none()
    }
}

/// Schema-described, name-addressable tool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    /// Create a definition; the name is sanitized on construction.
    pub fn new(name: impl AsRef<str>, description: impl Into<String>) -> Self {
        Self {
            name: sanitize_tool_name(name.as_ref()),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a required parameter.
    pub fn required_param(
        mut self,
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
    ) -> Self {
        self.parameters.push(ToolParameter {
            name: name.into(),
            kind,
            description: description.into(),
            default: None,
        });
        self
    }

    /// Add an optional parameter with a default value.
    pub fn optional_param(
        mut self,
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
        default: serde_json::Value,
    ) -> Self {
        self.parameters.push(ToolParameter {
            name: name.into(),
            kind,
            description: description.into(),
            default: Some(default),
        });
        self
    }

    /// Render the JSON Schema object for the remote function-tool surface.
    ///
    /// The `required` key is omitted entirely when no parameter is required.
    pub fn json_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                serde_json::json!({
                    "type": param.kind.as_str(),
                    "description": param.description,
                }),
            );
            if param.required() {
                required.push(param.name.clone());
            }
        }

        let mut schema = serde_json::json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema
                .as_object_mut()
                .expect("schema is an object")
                .insert("required".into(), serde_json::json!(required));
        }
        schema
    }

    /// Render the full function-tool payload `{type, function: {...}}`.
    pub fn wire_format(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.json_schema(),
            }
        })
    }
}

fn invalid_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("[^a-zA-Z0-9_-]").expect("valid pattern"))
}

fn repeated_separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("_+").expect("valid pattern"))
}

/// Sanitize a raw name into the `^[a-z0-9_-]+$` form the remote service accepts.
///
/// Invalid characters become `_`, runs of `_` collapse, leading/trailing `_`
/// are trimmed, the result is lowercased. An input that sanitizes to nothing
/// falls back to `"tool"`.
pub fn sanitize_tool_name(raw: &str) -> String {
    let replaced = invalid_chars().replace_all(raw, "_");
    let collapsed = repeated_separators().replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        "tool".to_string()
    } else {
        trimmed.to_lowercase()
    }
}
