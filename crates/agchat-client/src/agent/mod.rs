pub mod assemble;
pub mod schema;
pub mod stream;

use std::io::BufReader;

use serde_json::json;

use agchat_types::AgentTurnResult;

use crate::error::Result;
use crate::transport::Transport;

pub use assemble::assemble_turn;
pub use stream::EventStream;

/// Client for the remote conversational agent endpoint.
///
/// One `invoke` per user turn: issues a single streaming request, drains
/// the event feed to completion, and hands the events to [`assemble_turn`].
/// Failures propagate as-is — no retry policy is defined for this endpoint,
/// and a failure mid-stream never yields a partial result.
pub struct AgentClient {
    transport: Transport,
}

impl AgentClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Invoke the agent for one user turn and assemble the streamed answer.
    ///
    /// `knowledge_base_id` is forwarded so the service scopes retrieval;
    /// trace emission is always requested — the trace panel is a first-class
    /// part of the front-end, not a debug switch.
    pub fn invoke(
        &self,
        agent_id: &str,
        agent_alias_id: &str,
        session_id: &str,
        prompt: &str,
        knowledge_base_id: Option<&str>,
    ) -> Result<AgentTurnResult> {
        let path = format!("/agents/{}/aliases/{}/invoke", agent_id, agent_alias_id);

        let body = json!({
            "sessionId": session_id,
            "inputText": prompt,
            "enableTrace": true,
            "knowledgeBaseId": knowledge_base_id,
        });

        let response = self
            .transport
            .post(&path)
            .header("accept", "application/x-ndjson")
            .json(&body)
            .send()?;
        let response = Transport::check_status(response)?;

        assemble_turn(EventStream::new(BufReader::new(response)))
    }
}
