//! Per-conversation continuity state.

use std::collections::HashSet;

use super::types::SessionId;

/// Session handle plus the seen-message cursor for one conversation.
///
/// Each conversation owns its own dedup set, so message-id uniqueness only
/// has to hold within a single session and independent conversations can run
/// concurrently.
#[derive(Debug, Default, Clone)]
pub struct Conversation {
    session: Option<SessionId>,
    seen: HashSet<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    pub fn set_session(&mut self, session: SessionId) {
        self.session = Some(session);
    }

    /// Mark a message id as emitted. Returns `false` if it was already seen.
    pub fn mark_seen(&mut self, message_id: &str) -> bool {
        self.seen.insert(message_id.to_string())
    }

    pub fn is_seen(&self, message_id: &str) -> bool {
        self.seen.contains(message_id)
    }

    /// Drop the session and cursor; the next turn starts a fresh session.
    pub fn reset(&mut self) {
        self.session = None;
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_seen_is_exactly_once() {
        let mut conv = Conversation::new();
        assert!(conv.mark_seen("msg_1"));
        assert!(!conv.mark_seen("msg_1"));
        assert!(conv.is_seen("msg_1"));
        assert!(!conv.is_seen("msg_2"));
    }

    #[test]
    fn reset_clears_session_and_cursor() {
        let mut conv = Conversation::new();
        conv.set_session(SessionId::from("thread_1"));
        conv.mark_seen("msg_1");

        conv.reset();

        assert!(conv.session().is_none());
        assert!(!conv.is_seen("msg_1"));
    }

    #[test]
    fn separate_conversations_have_separate_cursors() {
        let mut a = Conversation::new();
        let mut b = Conversation::new();
        a.mark_seen("msg_1");
        assert!(!b.is_seen("msg_1"));
        assert!(b.mark_seen("msg_1"));
    }
}
