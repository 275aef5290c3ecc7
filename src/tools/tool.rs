//! Bound arguments and the async tool handler type.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::DocqError;

/// Arguments after binding against a [`ToolDefinition`](super::ToolDefinition):
/// defaults applied, values coerced to their declared kinds.
#[derive(Debug, Clone, Default)]
pub struct ToolArguments {
    values: serde_json::Map<String, serde_json::Value>,
}

impl ToolArguments {
    pub fn new(values: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Raw value of a bound argument.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_str())
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(|v| v.as_i64())
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(|v| v.as_f64())
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(|v| v.as_bool())
    }

    pub fn array(&self, name: &str) -> Option<&Vec<serde_json::Value>> {
        self.values.get(name).and_then(|v| v.as_array())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Async handler bound to a tool name in the registry.
pub type ToolHandler = Arc<
    dyn Fn(
            ToolArguments,
        )
            -> Pin<Box<dyn Future<Output = Result<serde_json::Value, DocqError>> + Send>>
        + Send
        + Sync,
>;

/// Wrap an async closure as a [`ToolHandler`].
pub fn handler<F, Fut>(f: F) -> ToolHandler
where
    F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, DocqError>> + Send + 'static,
{
    Arc::new(move |args| Box::pin(f(args)))
}
