//! Boundary trait for the remote agent-execution service.

use async_trait::async_trait;

use crate::error::Result;
use crate::tools::ToolDefinition;

use super::types::{RemoteAgent, RunState, SessionId, SessionMessage, ToolOutput};

/// Remote agent-execution surface the run controller drives.
///
/// Implemented over HTTP by [`AgentsClient`](super::AgentsClient); tests use
/// scripted in-process implementations.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Create a new empty session (thread).
    async fn create_session(&self) -> Result<SessionId>;

    /// Append a user message to a session.
    async fn post_message(&self, session: &SessionId, text: &str) -> Result<()>;

    /// Start a run of the given agent against a session.
    async fn create_run(&self, session: &SessionId, agent_id: &str) -> Result<RunState>;

    /// Fetch the current state of a run.
    async fn get_run(&self, session: &SessionId, run_id: &str) -> Result<RunState>;

    /// Submit the full batch of tool outputs for a `RequiresAction` run.
    /// Partial submission is unsupported by the service.
    async fn submit_tool_outputs(
        &self,
        session: &SessionId,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<RunState>;

    /// List all messages in a session, ascending by creation time.
    async fn list_messages(&self, session: &SessionId) -> Result<Vec<SessionMessage>>;

    /// List provisioned agents.
    async fn list_agents(&self) -> Result<Vec<RemoteAgent>>;

    /// Provision a new agent with instructions and tool schemas.
    async fn create_agent(
        &self,
        name: &str,
        model: &str,
        description: &str,
        instructions: &str,
        tools: &[ToolDefinition],
    ) -> Result<RemoteAgent>;
}
