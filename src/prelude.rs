//! Convenience re-exports for the common path.

pub use crate::agent::{
    AgentService, AgentsClient, Conversation, PollPolicy, RemoteAgent, RunController, RunState,
    RunStatus, SessionId, SessionMessage, ToolCallRequest, ToolOutput,
};
pub use crate::config::DocqConfig;
pub use crate::error::{DocqError, Result};
pub use crate::router::{AgentRole, AgentRouter, RouterStrategy};
pub use crate::search::{format_hits, SearchHit, SearchIndex};
pub use crate::stream::{collect_response, ChunkStream, StreamChunk, TurnResponse};
pub use crate::tools::{handler, ParamKind, ToolArguments, ToolDefinition, ToolParameter, ToolRegistry};
