//! HTTP client for an Assistants-style agent-execution REST API.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

use crate::config::DocqConfig;
use crate::error::{DocqError, Result};
use crate::tools::ToolDefinition;

use super::service::AgentService;
use super::types::{
    MessageRole, RemoteAgent, RunError, RunState, RunStatus, SessionId, SessionMessage,
    ToolCallRequest, ToolOutput,
};

use async_trait::async_trait;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Map a non-success HTTP status to a typed error.
fn status_to_error(status: u16, body: &str) -> DocqError {
    match status {
        401 | 403 => DocqError::Configuration(format!("Authentication rejected: {body}")),
        _ => DocqError::api(status, body),
    }
}

/// HTTP implementation of [`AgentService`].
///
/// Speaks the threads/runs/messages/assistants surface with an `api-key`
/// header, an optional `api-version` query parameter, and a per-request
/// correlation id.
pub struct AgentsClient {
    base_url: String,
    api_key: String,
    api_version: Option<String>,
}

impl AgentsClient {
    /// Build a client from config (endpoint + api key required).
    pub fn from_config(config: &DocqConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.endpoint()?.trim_end_matches('/').to_string(),
            api_key: config.api_key()?.to_string(),
            api_version: config.api_version().map(str::to_string),
        })
    }

    /// Build a client against an explicit base URL (used by tests).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: None,
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(val) = HeaderValue::from_str(&self.api_key) {
            headers.insert("api-key", val);
        }
        if let Ok(val) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
            headers.insert("x-ms-client-request-id", val);
        }
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let mut req = shared_client()
            .request(method.clone(), self.url(path))
            .headers(self.headers());
        if let Some(ref version) = self.api_version {
            req = req.query(&[("api-version", version.as_str())]);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        debug!(%method, path, "agent service request");
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(status_to_error(status.as_u16(), &text));
        }
        if text.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

// -- Wire payloads --

#[derive(Deserialize)]
struct WireRun {
    id: String,
    thread_id: String,
    status: RunStatus,
    #[serde(default)]
    required_action: Option<WireRequiredAction>,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Deserialize)]
struct WireRequiredAction {
    #[serde(default)]
    submit_tool_outputs: Option<WireSubmitToolOutputs>,
}

#[derive(Deserialize)]
struct WireSubmitToolOutputs {
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(default)]
    function: Option<WireFunctionCall>,
}

#[derive(Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct WireList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Deserialize)]
struct WireMessage {
    id: String,
    role: MessageRole,
    #[serde(default)]
    content: Vec<WireContentPart>,
    #[serde(default)]
    created_at: i64,
}

#[derive(Deserialize)]
struct WireContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<WireTextContent>,
}

#[derive(Deserialize)]
struct WireTextContent {
    #[serde(default)]
    value: String,
}

impl WireRun {
    fn into_state(self) -> RunState {
        let required_tool_calls = self
            .required_action
            .and_then(|a| a.submit_tool_outputs)
            .map(|s| {
                s.tool_calls
                    .into_iter()
                    .filter_map(|call| {
                        call.function.map(|f| ToolCallRequest {
                            call_id: call.id,
                            name: f.name,
                            arguments: f.arguments,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        RunState {
            id: self.id,
            session: SessionId(self.thread_id),
            status: self.status,
            required_tool_calls,
            last_error: self.last_error,
        }
    }
}

impl WireMessage {
    fn into_message(self) -> SessionMessage {
        // Keep textual parts in order; non-text parts are ignored.
        let parts = self
            .content
            .into_iter()
            .filter(|p| p.kind == "text")
            .filter_map(|p| p.text)
            .map(|t| t.value)
            .collect();
        SessionMessage {
            id: self.id,
            role: self.role,
            parts,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0)
                .unwrap_or_else(Utc::now),
        }
    }
}

#[async_trait]
impl AgentService for AgentsClient {
    async fn create_session(&self) -> Result<SessionId> {
        let value = self
            .request(reqwest::Method::POST, "/threads", Some(serde_json::json!({})))
            .await?;
        let id = value
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DocqError::api(200, "thread response missing id"))?;
        Ok(SessionId(id.to_string()))
    }

    async fn post_message(&self, session: &SessionId, text: &str) -> Result<()> {
        self.request(
            reqwest::Method::POST,
            &format!("/threads/{session}/messages"),
            Some(serde_json::json!({ "role": "user", "content": text })),
        )
        .await?;
        Ok(())
    }

    async fn create_run(&self, session: &SessionId, agent_id: &str) -> Result<RunState> {
        let value = self
            .request(
                reqwest::Method::POST,
                &format!("/threads/{session}/runs"),
                Some(serde_json::json!({ "assistant_id": agent_id })),
            )
            .await?;
        let run: WireRun = serde_json::from_value(value)?;
        Ok(run.into_state())
    }

    async fn get_run(&self, session: &SessionId, run_id: &str) -> Result<RunState> {
        let value = self
            .request(
                reqwest::Method::GET,
                &format!("/threads/{session}/runs/{run_id}"),
                None,
            )
            .await?;
        let run: WireRun = serde_json::from_value(value)?;
        Ok(run.into_state())
    }

    async fn submit_tool_outputs(
        &self,
        session: &SessionId,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<RunState> {
        let tool_outputs: Vec<serde_json::Value> = outputs
            .iter()
            .map(|o| serde_json::json!({ "tool_call_id": o.call_id, "output": o.output }))
            .collect();
        let value = self
            .request(
                reqwest::Method::POST,
                &format!("/threads/{session}/runs/{run_id}/submit_tool_outputs"),
                Some(serde_json::json!({ "tool_outputs": tool_outputs })),
            )
            .await?;
        let run: WireRun = serde_json::from_value(value)?;
        Ok(run.into_state())
    }

    async fn list_messages(&self, session: &SessionId) -> Result<Vec<SessionMessage>> {
        let value = self
            .request(
                reqwest::Method::GET,
                &format!("/threads/{session}/messages?order=asc"),
                None,
            )
            .await?;
        let list: WireList<WireMessage> = serde_json::from_value(value)?;
        let mut messages: Vec<SessionMessage> =
            list.data.into_iter().map(WireMessage::into_message).collect();
        // The service returns ascending order; keep it stable regardless.
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn list_agents(&self) -> Result<Vec<RemoteAgent>> {
        let value = self
            .request(reqwest::Method::GET, "/assistants", None)
            .await?;
        let list: WireList<RemoteAgent> = serde_json::from_value(value)?;
        Ok(list.data)
    }

    async fn create_agent(
        &self,
        name: &str,
        model: &str,
        description: &str,
        instructions: &str,
        tools: &[ToolDefinition],
    ) -> Result<RemoteAgent> {
        let tool_payloads: Vec<serde_json::Value> =
            tools.iter().map(ToolDefinition::wire_format).collect();
        let value = self
            .request(
                reqwest::Method::POST,
                "/assistants",
                Some(serde_json::json!({
                    "name": name,
                    "model": model,
                    "description": description,
                    "instructions": instructions,
                    "tools": tool_payloads,
                })),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
