//! Multi-agent router: one "ask" surface over several specialist roles.

pub mod pipeline;
pub mod roles;

pub use roles::AgentRole;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::agent::{
    format_user_message, AgentService, Conversation, PollPolicy, RemoteAgent, RunController,
    SessionId,
};
use crate::error::{DocqError, Result};
use crate::search::{format_hits, SearchIndex};
use crate::stream::ChunkStream;
use crate::tools::{handler, ParamKind, ToolDefinition, ToolRegistry};

/// How the router reaches its specialists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterStrategy {
    /// Router tools drive a nested specialist run to completion and return
    /// its whole answer as one blocking tool output.
    RouterAgent,
    /// Router tools call the search collaborator directly; lower latency,
    /// no nested-run overhead.
    DirectSearch,
}

/// Owns every specialist session and presents the caller-facing operations.
pub struct AgentRouter {
    service: Arc<dyn AgentService>,
    poll: PollPolicy,
    agents: HashMap<AgentRole, RemoteAgent>,
    conversations: HashMap<AgentRole, Arc<Mutex<Conversation>>>,
    active_document: Arc<RwLock<Option<String>>>,
    specialist_tools: Arc<ToolRegistry>,
    router_tools: Arc<ToolRegistry>,
    search: Arc<dyn SearchIndex>,
}

impl AgentRouter {
    /// Connect to the service: find or provision every specialist agent and
    /// wire up the tool registries for the chosen strategy.
    ///
    /// Bootstrap failure is fatal; no operation is meaningful without the
    /// specialist agents.
    pub async fn connect(
        service: Arc<dyn AgentService>,
        search: Arc<dyn SearchIndex>,
        model: &str,
        strategy: RouterStrategy,
        poll: PollPolicy,
    ) -> Result<Self> {
        let conversations: HashMap<AgentRole, Arc<Mutex<Conversation>>> = AgentRole::ALL
            .iter()
            .map(|role| (*role, Arc::new(Mutex::new(Conversation::new()))))
            .collect();
        let active_document = Arc::new(RwLock::new(None));

        let specialist_tools = Arc::new(build_specialist_tools(search.clone()));
        let agents = ensure_agents(service.as_ref(), model).await?;

        let router_tools = Arc::new(build_router_tools(
            strategy,
            service.clone(),
            search.clone(),
            specialist_tools.clone(),
            &agents,
            &conversations,
            active_document.clone(),
            poll.clone(),
        ));

        Ok(Self {
            service,
            poll,
            agents,
            conversations,
            active_document,
            specialist_tools,
            router_tools,
            search,
        })
    }

    fn agent_id(&self, role: AgentRole) -> &str {
        &self.agents[&role].id
    }

    fn conversation(&self, role: AgentRole) -> Arc<Mutex<Conversation>> {
        self.conversations[&role].clone()
    }

    fn controller(&self, registry: Arc<ToolRegistry>) -> RunController {
        RunController::new(self.service.clone(), registry).with_poll_policy(self.poll.clone())
    }

    /// Ask a question; the router agent selects the right specialist.
    pub async fn ask(&self, question: &str) -> ChunkStream {
        let document = self.active_document.read().await.clone();
        let message = format_user_message(question, document.as_deref());
        self.controller(self.router_tools.clone()).stream_turn(
            self.agent_id(AgentRole::Router),
            message,
            self.conversation(AgentRole::Router),
        )
    }

    /// Ask a question across every indexed document, bypassing the router.
    pub async fn ask_all_documents(&self, question: &str) -> ChunkStream {
        let message = format_user_message(question, None);
        self.controller(self.specialist_tools.clone()).stream_turn(
            self.agent_id(AgentRole::AllDocs),
            message,
            self.conversation(AgentRole::AllDocs),
        )
    }

    /// Summarize a document via the summarizer specialist.
    pub async fn summarize(&self, document: &str) -> ChunkStream {
        let message = format!("Summarize the document: {document}");
        self.controller(self.specialist_tools.clone()).stream_turn(
            self.agent_id(AgentRole::Summarizer),
            message,
            self.conversation(AgentRole::Summarizer),
        )
    }

    /// Change the active document. Invalidates only document-scoped sessions;
    /// cross-document and summarizer conversations continue.
    pub async fn set_active_document(&self, name: impl Into<String>) {
        let name = name.into();
        *self.active_document.write().await = Some(name.clone());
        for role in AgentRole::ALL {
            if role.document_scoped() {
                self.conversations[&role].lock().await.reset();
            }
        }
        info!(document = %name, "active document changed; document-scoped sessions reset");
    }

    pub async fn active_document(&self) -> Option<String> {
        self.active_document.read().await.clone()
    }

    /// Reset every conversation; the next turn of each role starts fresh.
    pub async fn reset_conversation(&self) {
        for conversation in self.conversations.values() {
            conversation.lock().await.reset();
        }
        info!("all conversation sessions reset");
    }

    /// Current session handle for a role, if one has been created.
    pub async fn session(&self, role: AgentRole) -> Option<SessionId> {
        self.conversations[&role].lock().await.session().cloned()
    }

    pub(crate) fn search_collaborator(&self) -> Arc<dyn SearchIndex> {
        self.search.clone()
    }

    pub(crate) fn service_handle(&self) -> Arc<dyn AgentService> {
        self.service.clone()
    }

    pub(crate) fn poll_policy(&self) -> &PollPolicy {
        &self.poll
    }

    pub(crate) fn specialist_registry(&self) -> Arc<ToolRegistry> {
        self.specialist_tools.clone()
    }

    pub(crate) fn summarizer_conversation(&self) -> Arc<Mutex<Conversation>> {
        self.conversation(AgentRole::Summarizer)
    }

    pub(crate) fn summarizer_agent_id(&self) -> String {
        self.agents[&AgentRole::Summarizer].id.clone()
    }
}

impl std::fmt::Debug for AgentRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRouter")
            .field("agents", &self.agents)
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

/// Find each specialist by name, creating the ones that don't exist yet.
async fn ensure_agents(
    service: &dyn AgentService,
    model: &str,
) -> Result<HashMap<AgentRole, RemoteAgent>> {
    let existing = service.list_agents().await.map_err(|e| {
        DocqError::AgentInitialization(format!("cannot list remote agents: {e}"))
    })?;

    let mut agents = HashMap::new();
    for role in AgentRole::ALL {
        let name = role.agent_name();
        let named: Vec<&RemoteAgent> = existing.iter().filter(|a| a.name == name).collect();
        let agent = match named.len() {
            1 => {
                info!(agent = name, id = %named[0].id, "found existing agent");
                named[0].clone()
            }
            0 => {
                info!(agent = name, "provisioning missing agent");
                service
                    .create_agent(
                        name,
                        model,
                        role.description(),
                        role.instructions(),
                        &agent_tool_schemas(role),
                    )
                    .await
                    .map_err(|e| {
                        DocqError::AgentInitialization(format!(
                            "failed to create agent '{name}': {e}"
                        ))
                    })?
            }
            n => {
                return Err(DocqError::AgentInitialization(format!(
                    "expected one agent with name '{name}', but found {n}"
                )))
            }
        };
        agents.insert(role, agent);
    }
    Ok(agents)
}

/// Tool schemas each role's remote agent is provisioned with.
fn agent_tool_schemas(role: AgentRole) -> Vec<ToolDefinition> {
    match role {
        AgentRole::SingleDoc => vec![search_document_def()],
        AgentRole::AllDocs => vec![search_all_def()],
        AgentRole::Summarizer => vec![search_document_def(), search_all_def()],
        AgentRole::Router => vec![
            ask_single_document_def(),
            ask_all_documents_def(),
            summarize_document_def(),
        ],
    }
}

fn search_document_def() -> ToolDefinition {
    ToolDefinition::new(
        "searchIndex",
        "Searches the search index for information from the specified document and the provided query.",
    )
    .required_param("fileName", ParamKind::String, "The name of the file to filter search.")
    .required_param("query", ParamKind::String, "The search query.")
}

fn search_all_def() -> ToolDefinition {
    ToolDefinition::new(
        "searchAllDocuments",
        "Searches the search index across every indexed document.",
    )
    .required_param("query", ParamKind::String, "The search query.")
}

fn ask_single_document_def() -> ToolDefinition {
    ToolDefinition::new(
        "ask_single_document",
        "Answers a question about the currently active document.",
    )
    .required_param("question", ParamKind::String, "The user's question.")
}

fn ask_all_documents_def() -> ToolDefinition {
    ToolDefinition::new(
        "ask_all_documents",
        "Answers a question using every indexed document.",
    )
    .required_param("question", ParamKind::String, "The user's question.")
}

fn summarize_document_def() -> ToolDefinition {
    ToolDefinition::new("summarize_document", "Summarizes an indexed document.").optional_param(
        "fileName",
        ParamKind::String,
        "The document to summarize; defaults to the active document.",
        serde_json::json!(""),
    )
}

/// Registry the specialist agents resolve their calls against: direct search.
fn build_specialist_tools(search: Arc<dyn SearchIndex>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    let by_document = search.clone();
    registry.register(
        search_document_def(),
        handler(move |args| {
            let search = by_document.clone();
            async move {
                let file_name = args.string("fileName").unwrap_or_default().to_string();
                let query = args.string("query").unwrap_or_default().to_string();
                let hits = search.search_document(&file_name, &query).await?;
                Ok(serde_json::to_value(hits)?)
            }
        }),
    );

    let across = search;
    registry.register(
        search_all_def(),
        handler(move |args| {
            let search = across.clone();
            async move {
                let query = args.string("query").unwrap_or_default().to_string();
                let hits = search.search_all_documents(&query).await?;
                Ok(serde_json::to_value(hits)?)
            }
        }),
    );

    registry
}

/// Registry the router agent resolves its calls against. With the
/// [`RouterStrategy::RouterAgent`] strategy each tool collapses a nested
/// specialist run into one blocking value; with
/// [`RouterStrategy::DirectSearch`] the tools hit the search index directly.
#[allow(clippy::too_many_arguments)]
fn build_router_tools(
    strategy: RouterStrategy,
    service: Arc<dyn AgentService>,
    search: Arc<dyn SearchIndex>,
    specialist_tools: Arc<ToolRegistry>,
    agents: &HashMap<AgentRole, RemoteAgent>,
    conversations: &HashMap<AgentRole, Arc<Mutex<Conversation>>>,
    active_document: Arc<RwLock<Option<String>>>,
    poll: PollPolicy,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    match strategy {
        RouterStrategy::RouterAgent => {
            let nested = |role: AgentRole| {
                (
                    service.clone(),
                    specialist_tools.clone(),
                    agents[&role].id.clone(),
                    conversations[&role].clone(),
                    poll.clone(),
                )
            };

            let (svc, tools, agent_id, conv, policy) = nested(AgentRole::SingleDoc);
            let active = active_document.clone();
            registry.register(
                ask_single_document_def(),
                handler(move |args| {
                    let svc = svc.clone();
                    let tools = tools.clone();
                    let agent_id = agent_id.clone();
                    let conv = conv.clone();
                    let policy = policy.clone();
                    let active = active.clone();
                    async move {
                        let question = args.string("question").unwrap_or_default().to_string();
                        let document = active.read().await.clone();
                        let message = format_user_message(&question, document.as_deref());
                        let controller =
                            RunController::new(svc, tools).with_poll_policy(policy);
                        let response =
                            controller.run_to_completion(&agent_id, message, conv).await;
                        Ok(serde_json::Value::String(response.text))
                    }
                }),
            );

            let (svc, tools, agent_id, conv, policy) = nested(AgentRole::AllDocs);
            registry.register(
                ask_all_documents_def(),
                handler(move |args| {
                    let svc = svc.clone();
                    let tools = tools.clone();
                    let agent_id = agent_id.clone();
                    let conv = conv.clone();
                    let policy = policy.clone();
                    async move {
                        let question = args.string("question").unwrap_or_default().to_string();
                        let message = format_user_message(&question, None);
                        let controller =
                            RunController::new(svc, tools).with_poll_policy(policy);
                        let response =
                            controller.run_to_completion(&agent_id, message, conv).await;
                        Ok(serde_json::Value::String(response.text))
                    }
                }),
            );

            let (svc, tools, agent_id, conv, policy) = nested(AgentRole::Summarizer);
            let active = active_document;
            registry.register(
                summarize_document_def(),
                handler(move |args| {
                    let svc = svc.clone();
                    let tools = tools.clone();
                    let agent_id = agent_id.clone();
                    let conv = conv.clone();
                    let policy = policy.clone();
                    let active = active.clone();
                    async move {
                        let mut file_name =
                            args.string("fileName").unwrap_or_default().to_string();
                        if file_name.is_empty() {
                            file_name = active.read().await.clone().unwrap_or_default();
                        }
                        if file_name.is_empty() {
                            warn!("summarize requested with no document available");
                            return Ok(serde_json::Value::String(
                                "No document is available to summarize.".into(),
                            ));
                        }
                        let message = format!("Summarize the document: {file_name}");
                        let controller =
                            RunController::new(svc, tools).with_poll_policy(policy);
                        let response =
                            controller.run_to_completion(&agent_id, message, conv).await;
                        Ok(serde_json::Value::String(response.text))
                    }
                }),
            );
        }
        RouterStrategy::DirectSearch => {
            let by_document = search.clone();
            let active = active_document.clone();
            registry.register(
                ask_single_document_def(),
                handler(move |args| {
                    let search = by_document.clone();
                    let active = active.clone();
                    async move {
                        let question = args.string("question").unwrap_or_default().to_string();
                        let document = active.read().await.clone().unwrap_or_default();
                        let hits = search.search_document(&document, &question).await?;
                        Ok(serde_json::Value::String(format_hits(&hits)))
                    }
                }),
            );

            let across = search.clone();
            registry.register(
                ask_all_documents_def(),
                handler(move |args| {
                    let search = across.clone();
                    async move {
                        let question = args.string("question").unwrap_or_default().to_string();
                        let hits = search.search_all_documents(&question).await?;
                        Ok(serde_json::Value::String(format_hits(&hits)))
                    }
                }),
            );

            let summarize_search = search;
            let active = active_document;
            registry.register(
                summarize_document_def(),
                handler(move |args| {
                    let search = summarize_search.clone();
                    let active = active.clone();
                    async move {
                        let mut file_name =
                            args.string("fileName").unwrap_or_default().to_string();
                        if file_name.is_empty() {
                            file_name = active.read().await.clone().unwrap_or_default();
                        }
                        let hits = search
                            .search_document(&file_name, "overview key points conclusions")
                            .await?;
                        Ok(serde_json::Value::String(format_hits(&hits)))
                    }
                }),
            );
        }
    }

    registry
}
