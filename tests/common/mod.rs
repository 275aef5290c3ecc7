//! Shared test doubles: a scripted agent service and a canned search index.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};

use docq::agent::{MessageRole, RunError, SessionMessage};
use docq::prelude::*;
use docq::tools::ToolDefinition;

/// One scripted answer for a `get_run` poll.
pub enum RunStep {
    /// Plain status, no pending tool calls.
    Status(RunStatus),
    /// `requires_action` with this batch of tool calls.
    ToolCalls(Vec<ToolCallRequest>),
}

/// In-memory [`AgentService`] whose run lifecycle is driven by a script.
///
/// Each `get_run` pops the next [`RunStep`]; when the script is exhausted the
/// run reports `default_status`. Every interaction is appended to `log` so
/// tests can assert ordering (e.g. tool outputs submitted before messages
/// are fetched).
pub struct MockAgentService {
    session_counter: AtomicU32,
    run_counter: AtomicU32,
    agent_counter: AtomicU32,
    pub script: Mutex<VecDeque<RunStep>>,
    pub default_status: Mutex<RunStatus>,
    pub failure: Mutex<Option<RunError>>,
    pub posted: Mutex<Vec<(String, String)>>,
    pub submissions: Mutex<Vec<Vec<ToolOutput>>>,
    pub messages: Mutex<HashMap<String, Vec<SessionMessage>>>,
    pub agents: Mutex<Vec<RemoteAgent>>,
    pub log: Mutex<Vec<String>>,
}

impl MockAgentService {
    pub fn new() -> Self {
        Self {
            session_counter: AtomicU32::new(0),
            run_counter: AtomicU32::new(0),
            agent_counter: AtomicU32::new(0),
            script: Mutex::new(VecDeque::new()),
            default_status: Mutex::new(RunStatus::Completed),
            failure: Mutex::new(None),
            posted: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            messages: Mutex::new(HashMap::new()),
            agents: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Pre-register a remote agent so `connect` finds it instead of creating it.
    pub fn with_agent(self, id: &str, name: &str) -> Self {
        self.agents.lock().unwrap().push(RemoteAgent {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn push_step(&self, step: RunStep) {
        self.script.lock().unwrap().push_back(step);
    }

    pub fn script_statuses(&self, statuses: &[RunStatus]) {
        let mut script = self.script.lock().unwrap();
        for status in statuses {
            script.push_back(RunStep::Status(*status));
        }
    }

    pub fn set_default_status(&self, status: RunStatus) {
        *self.default_status.lock().unwrap() = status;
    }

    /// Seed a single-part agent reply in a session, ordered by insertion.
    pub fn seed_agent_reply(&self, session: &str, id: &str, text: &str) {
        self.seed_agent_parts(session, id, &[text]);
    }

    /// Seed an agent reply with multiple textual content parts.
    pub fn seed_agent_parts(&self, session: &str, id: &str, parts: &[&str]) {
        let mut messages = self.messages.lock().unwrap();
        let entry = messages.entry(session.to_string()).or_default();
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let created_at = base + ChronoDuration::seconds(entry.len() as i64);
        entry.push(SessionMessage {
            id: id.to_string(),
            role: MessageRole::Agent,
            parts: parts.iter().map(|p| p.to_string()).collect(),
            created_at,
        });
    }

    pub fn log_entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }

    fn run_state(&self, session: &SessionId, run_id: &str) -> RunState {
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(RunStep::Status(status)) => {
                let last_error = if status == RunStatus::Failed {
                    self.failure.lock().unwrap().clone()
                } else {
                    None
                };
                RunState {
                    id: run_id.to_string(),
                    session: session.clone(),
                    status,
                    required_tool_calls: Vec::new(),
                    last_error,
                }
            }
            Some(RunStep::ToolCalls(calls)) => RunState {
                id: run_id.to_string(),
                session: session.clone(),
                status: RunStatus::RequiresAction,
                required_tool_calls: calls,
                last_error: None,
            },
            None => RunState {
                id: run_id.to_string(),
                session: session.clone(),
                status: *self.default_status.lock().unwrap(),
                required_tool_calls: Vec::new(),
                last_error: None,
            },
        }
    }
}

#[async_trait]
impl AgentService for MockAgentService {
    async fn create_session(&self) -> docq::Result<SessionId> {
        let n = self.session_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("session_{n}");
        self.record(format!("create_session:{id}"));
        Ok(SessionId(id))
    }

    async fn post_message(&self, session: &SessionId, text: &str) -> docq::Result<()> {
        self.record(format!("post_message:{session}"));
        self.posted
            .lock()
            .unwrap()
            .push((session.0.clone(), text.to_string()));
        Ok(())
    }

    async fn create_run(&self, session: &SessionId, agent_id: &str) -> docq::Result<RunState> {
        let n = self.run_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("run_{n}");
        self.record(format!("create_run:{agent_id}:{id}"));
        Ok(RunState {
            id,
            session: session.clone(),
            status: RunStatus::Queued,
            required_tool_calls: Vec::new(),
            last_error: None,
        })
    }

    async fn get_run(&self, session: &SessionId, run_id: &str) -> docq::Result<RunState> {
        self.record(format!("get_run:{run_id}"));
        Ok(self.run_state(session, run_id))
    }

    async fn submit_tool_outputs(
        &self,
        session: &SessionId,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> docq::Result<RunState> {
        self.record(format!("submit_tool_outputs:{run_id}"));
        self.submissions.lock().unwrap().push(outputs);
        Ok(RunState {
            id: run_id.to_string(),
            session: session.clone(),
            status: RunStatus::InProgress,
            required_tool_calls: Vec::new(),
            last_error: None,
        })
    }

    async fn list_messages(&self, session: &SessionId) -> docq::Result<Vec<SessionMessage>> {
        self.record(format!("list_messages:{session}"));
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(&session.0)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_agents(&self) -> docq::Result<Vec<RemoteAgent>> {
        self.record("list_agents".to_string());
        Ok(self.agents.lock().unwrap().clone())
    }

    async fn create_agent(
        &self,
        name: &str,
        _model: &str,
        _description: &str,
        _instructions: &str,
        _tools: &[ToolDefinition],
    ) -> docq::Result<RemoteAgent> {
        let n = self.agent_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let agent = RemoteAgent {
            id: format!("agent_{n}"),
            name: name.to_string(),
        };
        self.record(format!("create_agent:{name}:{}", agent.id));
        self.agents.lock().unwrap().push(agent.clone());
        Ok(agent)
    }
}

/// Canned [`SearchIndex`] that records every query it receives.
#[derive(Default)]
pub struct MockSearchIndex {
    pub hits: Mutex<Vec<SearchHit>>,
    /// `(file filter, query)`; the filter is `None` for cross-document search.
    pub queries: Mutex<Vec<(Option<String>, String)>>,
}

impl MockSearchIndex {
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits: Mutex::new(hits),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchIndex for MockSearchIndex {
    async fn search_document(&self, file_name: &str, query: &str) -> docq::Result<Vec<SearchHit>> {
        self.queries
            .lock()
            .unwrap()
            .push((Some(file_name.to_string()), query.to_string()));
        Ok(self.hits.lock().unwrap().clone())
    }

    async fn search_all_documents(&self, query: &str) -> docq::Result<Vec<SearchHit>> {
        self.queries.lock().unwrap().push((None, query.to_string()));
        Ok(self.hits.lock().unwrap().clone())
    }
}
