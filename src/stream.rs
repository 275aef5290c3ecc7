//! Chunk stream surface handed back to callers.

use futures::stream::BoxStream;
use futures::StreamExt;

use crate::agent::SessionId;

/// One fragment of assistant text, tagged with the session it belongs to.
///
/// Every chunk carries the up-to-date session handle so the caller can persist
/// continuation state without a separate query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    pub text: String,
    pub session: SessionId,
}

/// Finite, append-only sequence of chunks for one conversational turn.
pub type ChunkStream = BoxStream<'static, StreamChunk>;

/// Aggregated result of consuming a turn's chunk stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnResponse {
    /// Full accumulated text.
    pub text: String,
    /// Session the turn ran against, if any chunk was produced.
    pub session: Option<SessionId>,
}

/// Drain a chunk stream into the accumulated turn response.
pub async fn collect_response(mut stream: ChunkStream) -> TurnResponse {
    let mut response = TurnResponse::default();
    while let Some(chunk) = stream.next().await {
        response.text.push_str(&chunk.text);
        response.session = Some(chunk.session);
    }
    response
}
