//! Wire types for the remote agent-execution service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque handle to a remote multi-turn conversation (a service-side thread).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Run lifecycle status as reported by the service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Created,
    Queued,
    InProgress,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Expired,
}

impl RunStatus {
    /// Terminal states end the polling loop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

/// Terminal error detail attached to a failed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// A function call the remote agent asks the local process to resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub call_id: String,
    pub name: String,
    /// Raw JSON argument payload as sent by the service.
    pub arguments: String,
}

/// Resolved output for one tool call, keyed back by call id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub call_id: String,
    pub output: String,
}

/// Snapshot of one run's state.
#[derive(Debug, Clone)]
pub struct RunState {
    pub id: String,
    pub session: SessionId,
    pub status: RunStatus,
    /// Pending tool calls; non-empty only in `RequiresAction`.
    pub required_tool_calls: Vec<ToolCallRequest>,
    pub last_error: Option<RunError>,
}

/// Author of a session message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    #[serde(rename = "assistant", alias = "agent")]
    Agent,
}

/// One message in a session, in service order. Text content arrives as an
/// ordered list of parts; non-text parts are dropped at the wire boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    pub id: String,
    pub role: MessageRole,
    pub parts: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionMessage {
    /// Full text of the message, all parts concatenated.
    pub fn text(&self) -> String {
        self.parts.concat()
    }
}

/// Handle to a provisioned remote agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAgent {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_exactly_four() {
        let terminal = [
            RunStatus::Completed,
            RunStatus::Failed,
            RunStatus::Cancelled,
            RunStatus::Expired,
        ];
        let live = [
            RunStatus::Created,
            RunStatus::Queued,
            RunStatus::InProgress,
            RunStatus::RequiresAction,
        ];
        assert!(terminal.iter().all(RunStatus::is_terminal));
        assert!(live.iter().all(|s| !s.is_terminal()));
    }

    #[test]
    fn status_round_trips_through_wire_form() {
        for status in [
            RunStatus::Queued,
            RunStatus::InProgress,
            RunStatus::RequiresAction,
            RunStatus::Cancelled,
        ] {
            let wire = serde_json::to_string(&status).unwrap();
            assert_eq!(wire, format!("\"{}\"", status.as_str()));
            let back: RunStatus = serde_json::from_str(&wire).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn agent_role_accepts_assistant_spelling() {
        let role: MessageRole = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, MessageRole::Agent);
        let role: MessageRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, MessageRole::User);
    }
}
