//! Sequential search-then-summarize pipeline.
//!
//! Instead of letting an agent decide when to search, the pipeline runs the
//! retrieval step itself, inlines the results into the prompt, and watches
//! the session for the answer while the run is still executing. The stream
//! ends as soon as this turn's output appears, not when the run reports a
//! terminal status.

use tracing::{debug, error, warn};

use crate::agent::controller::resolve_tool_batch;
use crate::agent::{MessageRole, RunStatus};
use crate::error::DocqError;
use crate::search::format_hits;
use crate::stream::{ChunkStream, StreamChunk};

use super::AgentRouter;

impl AgentRouter {
    /// Answer a question by searching every document up front and handing
    /// the retrieved context to the summarizer in a single prompt.
    pub async fn ask_pipeline(&self, question: &str) -> ChunkStream {
        let service = self.service_handle();
        let registry = self.specialist_registry();
        let search = self.search_collaborator();
        let poll = self.poll_policy().clone();
        let conversation = self.summarizer_conversation();
        let agent_id = self.summarizer_agent_id();
        let question = question.to_string();

        Box::pin(async_stream::stream! {
            let hits = match search.search_all_documents(&question).await {
                Ok(hits) => hits,
                Err(e) => {
                    error!(error = %e, "pipeline search failed");
                    return;
                }
            };
            let context = format_hits(&hits);

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

            let message = format!(
                "Context:\n{context}\n\nQuestion: {question}\n\n\
                 Answer using only the context above."
            );
            if let Err(e) = service.post_message(&session, &message).await {
                error!(error = %e, session = %session, "failed to post pipeline message");
                return;
            }

            let mut run = match service.create_run(&session, &agent_id).await {
                Ok(run) => run,
                Err(e) => {
                    error!(error = %e, session = %session, "failed to create pipeline run");
                    return;
                }
            };
            debug!(session = %session, run = %run.id, "pipeline run created");

            let started = tokio::time::Instant::now();
            let mut wait = poll.interval;

            loop {
                if let Some(deadline) = poll.deadline {
                    if started.elapsed() >= deadline {
                        let err = DocqError::Timeout(started.elapsed().as_millis() as u64);
                        warn!(run = %run.id, error = %err, "abandoning stalled pipeline turn");
                        return;
                    }
                }

                tokio::time::sleep(wait).await;

                run = match service.get_run(&session, &run.id).await {
                    Ok(state) => state,
                    Err(e) => {
                        error!(error = %e, run = %run.id, "failed to poll pipeline run");
                        return;
                    }
                };

                if run.status == RunStatus::RequiresAction {
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
                    continue;
                }

                // Watch the session while the run executes: the turn is done
                // the moment its output message lands.
                let messages = match service.list_messages(&session).await {
                    Ok(messages) => messages,
                    Err(e) => {
                        error!(error = %e, session = %session, "failed to list messages");
                        return;
                    }
                };
                // Collect under the lock, release it, then yield: the
                // conversation stays lockable mid-stream.
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
                if !chunks.is_empty() {
                    for chunk in chunks {
                        yield chunk;
                    }
                    return;
                }

                if run.status.is_terminal() {
                    if run.status != RunStatus::Completed {
                        let err = DocqError::RunFailed {
                            status: run.status.as_str().to_string(),
                            message: run
                                .last_error
                                .as_ref()
                                .map(|e| format!("{}: {}", e.code, e.message))
                                .unwrap_or_default(),
                        };
                        error!(run = %run.id, error = %err, "pipeline run ended without output");
                    }
                    return;
                }
                wait = poll.grow(wait);
            }
        })
    }
}
