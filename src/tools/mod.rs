//! Tool system: schema-described, JSON-dispatchable local functions.

pub mod registry;
pub mod schema;
pub mod tool;

pub use registry::{bind_arguments, ToolRegistry};
pub use schema::{sanitize_tool_name, ParamKind, ToolDefinition, ToolParameter};
pub use tool::{handler, ToolArguments, ToolHandler};
