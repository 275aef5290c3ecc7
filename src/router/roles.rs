//! Specialist conversational roles and their remote agent identities.

/// The specialist roles the router composes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    /// Answers questions about the active document.
    SingleDoc,
    /// Answers questions across every indexed document.
    AllDocs,
    /// Produces document summaries.
    Summarizer,
    /// Selects and invokes a specialist via tool calls.
    Router,
}

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [
        AgentRole::SingleDoc,
        AgentRole::AllDocs,
        AgentRole::Summarizer,
        AgentRole::Router,
    ];

    /// Remote agent name used to find or provision the agent.
    pub fn agent_name(&self) -> &'static str {
        match self {
            Self::SingleDoc => "AskQuestions",
            Self::AllDocs => "AskAllDocuments",
            Self::Summarizer => "SummarizeDocument",
            Self::Router => "RouteRequest",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SingleDoc => "Asks questions about the document",
            Self::AllDocs => "Asks questions across all indexed documents",
            Self::Summarizer => "Summarizes an indexed document",
            Self::Router => "Routes a user request to the right specialist",
        }
    }

    /// Document-scoped roles lose their session when the active document
    /// changes; cross-document and summarizer sessions survive it.
    pub fn document_scoped(&self) -> bool {
        matches!(self, Self::SingleDoc | Self::Router)
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            Self::SingleDoc => SINGLE_DOC_INSTRUCTIONS,
            Self::AllDocs => ALL_DOCS_INSTRUCTIONS,
            Self::Summarizer => SUMMARIZER_INSTRUCTIONS,
            Self::Router => ROUTER_INSTRUCTIONS,
        }
    }
}

const SINGLE_DOC_INSTRUCTIONS: &str = "You are a document answering bot.
- You will need to use a tool to retrieve the content - only make one query per user ask, do not iterate on your search tool calling.
- You are then to answer the question based on the content provided.
- If you aren't provided a document name, please let the user know that it is missing and that they need to provide it by using the \"doc\" command.
- If you can not answer after examining the document's content, please respond that you can't find the answer.
- You are not to make up answers. Use the content provided to answer the question.
- Always respond in a professional tone.
- When answering questions, always provide citations in the format [DocumentName: Page X] where X is the page number from which the information was obtained.
- When it makes sense, please provide your answer in a bulleted list for easier readability.";

const ALL_DOCS_INSTRUCTIONS: &str = "You are a document answering bot that works across the entire document collection.
- Use your search tool to retrieve content from all documents - only make one query per user ask.
- Answer the question based only on the content provided, citing each document by name.
- If the content does not answer the question, say that you can't find the answer.
- You are not to make up answers. Always respond in a professional tone.";

const SUMMARIZER_INSTRUCTIONS: &str = "You are a document summarization bot.
- Use your search tool to retrieve the document's content, then produce a concise summary.
- Lead with a one-paragraph overview, followed by the key points as a bulleted list.
- Only summarize content actually retrieved; do not invent details.
- Always respond in a professional tone.";

const ROUTER_INSTRUCTIONS: &str = "You are a routing agent. Decide which specialist tool answers the user's request and call exactly one of them.
- If the request asks for a summary (words like summarize, summary, overview, TL;DR), call summarize_document.
- If the request mentions all, across, or every document, or no active document is given, call ask_all_documents.
- Otherwise, when an active document is set, call ask_single_document.
- Return the specialist's answer verbatim; do not rewrite it.";
