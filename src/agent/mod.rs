//! Remote agent execution: service boundary, HTTP client, run controller.

pub mod client;
pub mod controller;
pub mod conversation;
pub mod service;
pub mod types;

pub use client::AgentsClient;
pub use controller::{format_user_message, PollPolicy, RunController};
pub use conversation::Conversation;
pub use service::AgentService;
pub use types::{
    MessageRole, RemoteAgent, RunError, RunState, RunStatus, SessionId, SessionMessage,
    ToolCallRequest, ToolOutput,
};
