//! Run controller: drives one remote turn through its lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::error::DocqError;
use crate::stream::{collect_response, ChunkStream, StreamChunk, TurnResponse};
use crate::tools::ToolRegistry;

use super::conversation::Conversation;
use super::service::AgentService;
use super::types::{MessageRole, RunState, RunStatus, ToolOutput};

/// Polling behavior between run status checks.
///
/// The interval starts at `interval` and grows by `multiplier` up to
/// `max_interval` while the run makes no progress; it resets after a tool
/// batch is submitted. A `deadline`, when set, bounds the whole turn.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(5),
            multiplier: 1.5,
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Derive a policy from configured poll settings.
    pub fn from_config(config: &crate::config::DocqConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            deadline: config.poll_deadline(),
            ..Self::default()
        }
    }

    /// Next wait after an unproductive poll.
    pub(crate) fn grow(&self, current: Duration) -> Duration {
        let next = Duration::from_secs_f64(current.as_secs_f64() * self.multiplier);
        next.min(self.max_interval)
    }
}

/// Drives one conversational turn against a remote agent to completion,
/// resolving tool calls through the registry and streaming assistant text.
pub struct RunController {
    service: Arc<dyn AgentService>,
    registry: Arc<ToolRegistry>,
    poll: PollPolicy,
}

impl RunController {
    pub fn new(service: Arc<dyn AgentService>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            service,
            registry,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Stream one turn: post the user message, poll the run, satisfy tool
    /// calls, then emit unseen assistant text in chronological order.
    ///
    /// Terminal non-success states (and deadline expiry) end the stream with
    /// no chunks and no error; diagnostics go to the log.
    pub fn stream_turn(
        &self,
        agent_id: &str,
        user_message: String,
        conversation: Arc<Mutex<Conversation>>,
    ) -> ChunkStream {
        let service = self.service.clone();
        let registry = self.registry.clone();
        let poll = self.poll.clone();
        let agent_id = agent_id.to_string();

        Box::pin(async_stream::stream! {
            let session = {
                let mut conv = conversation.lock().await;
                match conv.session() {
                    Some(session) => session.clone(),
                    None => {
                        let session = match service.create_session().await {
                            Ok(s) => s,
                            Err(e) => {
                                error!(error = %e, "failed to create session");
                                return;
                            }
                        };
                        conv.set_session(session.clone());
                        session
                    }
                }
            };

            if let Err(e) = service.post_message(&session, &user_message).await {
                error!(error = %e, session = %session, "failed to post user message");
                return;
            }

            let mut run = match service.create_run(&session, &agent_id).await {
                Ok(run) => run,
                Err(e) => {
                    error!(error = %e, session = %session, "failed to create run");
                    return;
                }
            };
            debug!(session = %session, run = %run.id, "run created");

            let started = tokio::time::Instant::now();
            let mut wait = poll.interval;

            loop {
                if let Some(deadline) = poll.deadline {
                    if started.elapsed() >= deadline {
                        let err = DocqError::Timeout(started.elapsed().as_millis() as u64);
                        warn!(run = %run.id, error = %err, "abandoning stalled turn");
                        return;
                    }
                }

                tokio::time::sleep(wait).await;

                run = match service.get_run(&session, &run.id).await {
                    Ok(state) => state,
                    Err(e) => {
                        error!(error = %e, run = %run.id, "failed to poll run");
                        return;
                    }
                };
                debug!(run = %run.id, status = run.status.as_str(), "run status");

                match run.status {
                    RunStatus::RequiresAction => {
                        match resolve_tool_batch(&service, &registry, &run).await {
                            Ok(Some(state)) => {
                                run = state;
                                wait = poll.interval;
                            }
                            Ok(None) => {}
                            Err(e) => {
                                error!(error = %e, run = %run.id, "failed to submit tool outputs");
                                return;
                            }
                        }
                    }
                    status if status.is_terminal() => break,
                    _ => wait = poll.grow(wait),
                }
            }

            if run.status != RunStatus::Completed {
                let err = DocqError::RunFailed {
                    status: run.status.as_str().to_string(),
                    message: run
                        .last_error
                        .as_ref()
                        .map(|e| format!("{}: {}", e.code, e.message))
                        .unwrap_or_default(),
                };
                error!(run = %run.id, error = %err, "run ended without completing");
                return;
            }

            let messages = match service.list_messages(&session).await {
                Ok(messages) => messages,
                Err(e) => {
                    error!(error = %e, session = %session, "failed to list messages");
                    return;
                }
            };

            // Collect chunks under the lock, then release it before yielding:
            // the conversation must stay lockable while the caller consumes
            // the stream at its own pace.
            let chunks: Vec<StreamChunk> = {
                let mut conv = conversation.lock().await;
                let mut chunks = Vec::new();
                for message in messages {
                    if !conv.mark_seen(&message.id) {
                        continue;
                    }
                    if message.role != MessageRole::Agent {
                        continue;
                    }
                    for part in message.parts {
                        if !part.is_empty() {
                            chunks.push(StreamChunk {
                                text: part,
                                session: session.clone(),
                            });
                        }
                    }
                }
                chunks
            };
            for chunk in chunks {
                yield chunk;
            }
        })
    }

    /// Run a turn to completion and collapse its stream into one response.
    /// Used for nested (router-delegated) runs.
    pub async fn run_to_completion(
        &self,
        agent_id: &str,
        user_message: String,
        conversation: Arc<Mutex<Conversation>>,
    ) -> TurnResponse {
        let stream = self.stream_turn(agent_id, user_message, conversation);
        collect_response(stream).await
    }
}

/// Resolve every pending tool call and submit the whole batch in one call.
/// Returns the post-submission run state, or `None` when the batch was empty.
pub(crate) async fn resolve_tool_batch(
    service: &Arc<dyn AgentService>,
    registry: &Arc<ToolRegistry>,
    run: &RunState,
) -> Result<Option<RunState>, DocqError> {
    if run.required_tool_calls.is_empty() {
        return Ok(None);
    }

    let mut outputs = Vec::with_capacity(run.required_tool_calls.len());
    for call in &run.required_tool_calls {
        debug!(run = %run.id, tool = %call.name, "resolving tool call");
        let output = registry.execute(&call.name, &call.arguments).await;
        outputs.push(ToolOutput {
            call_id: call.call_id.clone(),
            output,
        });
    }

    let state = service
        .submit_tool_outputs(&run.session, &run.id, outputs)
        .await?;
    debug!(run = %run.id, status = state.status.as_str(), "submitted tool outputs");
    Ok(Some(state))
}

/// Format the plain-text user message for a document question.
pub fn format_user_message(question: &str, document: Option<&str>) -> String {
    match document {
        Some(name) if !name.is_empty() => {
            format!("Document Name:\n{name}\n\nQuestion: {question}")
        }
        _ => format!("Question: {question}"),
    }
}
