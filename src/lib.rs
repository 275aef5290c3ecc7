//! # docq
//!
//! Agent-run orchestration for document question answering.
//!
//! The crate drives conversational turns against a remote asynchronous
//! agent-execution service: it posts user messages, polls run state,
//! resolves requested tool calls against a local registry, and streams the
//! agent's reply text back to the caller. On top of that sits a multi-agent
//! router that dispatches each request to a single-document, cross-document,
//! or summarization specialist.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use docq::prelude::*;
//!
//! # struct MySearch;
//! # #[async_trait::async_trait]
//! # impl SearchIndex for MySearch {
//! #     async fn search_document(&self, _: &str, _: &str) -> docq::Result<Vec<SearchHit>> { Ok(vec![]) }
//! #     async fn search_all_documents(&self, _: &str) -> docq::Result<Vec<SearchHit>> { Ok(vec![]) }
//! # }
//! # async fn run() -> docq::Result<()> {
//! let config = DocqConfig::from_env();
//! let client = Arc::new(AgentsClient::from_config(&config)?);
//! let search = Arc::new(MySearch);
//!
//! let router = AgentRouter::connect(
//!     client,
//!     search,
//!     config.chat_deployment()?,
//!     RouterStrategy::RouterAgent,
//!     PollPolicy::default(),
//! )
//! .await?;
//!
//! router.set_active_document("report.pdf").await;
//! let mut chunks = router.ask("What is the grand total?").await;
//! while let Some(chunk) = chunks.next().await {
//!     print!("{}", chunk.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod prelude;
pub mod router;
pub mod search;
pub mod stream;
pub mod tools;

pub use error::{DocqError, Result};
