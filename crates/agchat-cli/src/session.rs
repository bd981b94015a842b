use chrono::Utc;
use uuid::Uuid;

use agchat_types::{AgentTurnResult, ChatMessage, Citation, TraceLog};

/// Per-session mutable state for one interactive chat.
///
/// Owns everything a turn produces or a later command inspects: the
/// conversation history, the last turn's citations and trace, and the
/// resource ids resolved lazily at session start. Nothing here is shared
/// across sessions; reset is literally "replace with a fresh instance".
#[derive(Debug)]
pub struct SessionContext {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
    pub citations: Vec<Citation>,
    pub trace: TraceLog,

    // Resolved service resources, cached for the session's lifetime
    pub knowledge_base_id: Option<String>,
    pub agent_id: Option<String>,
    pub agent_alias_id: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            citations: Vec::new(),
            trace: TraceLog::new(),
            knowledge_base_id: None,
            agent_id: None,
            agent_alias_id: None,
        }
    }

    /// Clear all per-session state and issue a fresh session identifier.
    /// Idempotent; safe to call at any point in the conversation.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Start a new remote conversation without touching local history.
    /// Used after a knowledge-base sync so the next turn retrieves against
    /// the re-indexed content instead of stale server-side context.
    pub fn refresh_session_id(&mut self) {
        self.session_id = Uuid::new_v4().to_string();
    }

    /// Record one completed turn: both chat messages plus the turn's
    /// citations and trace (superseding the previous turn's).
    pub fn record_turn(&mut self, prompt: &str, rendered_answer: &str, result: AgentTurnResult) {
        let now = Utc::now();
        self.messages.push(ChatMessage::user(prompt, now));
        self.messages.push(ChatMessage::assistant(rendered_answer, now));
        self.citations = result.citations;
        self.trace = result.trace;
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
