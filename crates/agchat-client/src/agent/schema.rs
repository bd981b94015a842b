use serde::Deserialize;
use serde_json::Value;

use agchat_types::Citation;

/// One event from the invocation stream, as it appears on the wire.
///
/// The feed is loosely structured: an event carries an output chunk, a
/// trace payload, or (in principle) both; anything else is ignored rather
/// than rejected, since the service adds event kinds without notice.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEvent {
    #[serde(default)]
    pub chunk: Option<ChunkPayload>,

    #[serde(default)]
    pub trace: Option<TraceEnvelope>,
}

/// Output text fragment. `bytes` is base64-encoded UTF-8; citation records
/// ride along under `attribution` when the fragment closes a cited span.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkPayload {
    pub bytes: String,

    #[serde(default)]
    pub attribution: Option<Attribution>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// The wire nests the per-phase record one level down: the event's `trace`
/// field holds an object whose own `trace` field carries the phase keys.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceEnvelope {
    pub trace: RawTrace,
}

/// Raw phase record. Exactly one key is populated per event; `guardrailTrace`
/// is used by the service for both guardrail passes and is disambiguated
/// during assembly, not here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrace {
    #[serde(default)]
    pub guardrail_trace: Option<Value>,

    #[serde(default)]
    pub pre_processing_trace: Option<Value>,

    #[serde(default)]
    pub orchestration_trace: Option<Value>,

    #[serde(default)]
    pub post_processing_trace: Option<Value>,
}

/// Raw phase key as spelled on the wire, before guardrail disambiguation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPhase {
    Guardrail,
    PreProcessing,
    Orchestration,
    PostProcessing,
}

impl RawTrace {
    /// Extract the single populated phase key and its payload.
    ///
    /// Checked in the service's documented key order; a record with no
    /// recognized key yields None (skipped upstream, never an error).
    pub fn into_keyed(self) -> Option<(RawPhase, Value)> {
        if let Some(payload) = self.guardrail_trace {
            return Some((RawPhase::Guardrail, payload));
        }
        if let Some(payload) = self.pre_processing_trace {
            return Some((RawPhase::PreProcessing, payload));
        }
        if let Some(payload) = self.orchestration_trace {
            return Some((RawPhase::Orchestration, payload));
        }
        if let Some(payload) = self.post_processing_trace {
            return Some((RawPhase::PostProcessing, payload));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunk_event_parses() {
        let line = r#"{"chunk": {"bytes": "SGVsbG8=", "attribution": {"citations": []}}}"#;
        let event: StreamEvent = serde_json::from_str(line).unwrap();
        let chunk = event.chunk.unwrap();
        assert_eq!(chunk.bytes, "SGVsbG8=");
        assert!(chunk.attribution.unwrap().citations.is_empty());
        assert!(event.trace.is_none());
    }

    #[test]
    fn test_trace_event_parses_and_keys() {
        let line = r#"{"trace": {"trace": {"orchestrationTrace": {"rationale": {"traceId": "t-1"}}}}}"#;
        let event: StreamEvent = serde_json::from_str(line).unwrap();
        let (phase, payload) = event.trace.unwrap().trace.into_keyed().unwrap();
        assert_eq!(phase, RawPhase::Orchestration);
        assert_eq!(payload["rationale"]["traceId"], json!("t-1"));
    }

    #[test]
    fn test_unknown_event_shape_is_tolerated() {
        let line = r#"{"returnControl": {"invocationId": "x"}}"#;
        let event: StreamEvent = serde_json::from_str(line).unwrap();
        assert!(event.chunk.is_none());
        assert!(event.trace.is_none());
    }

    #[test]
    fn test_empty_raw_trace_has_no_key() {
        let raw = RawTrace::default();
        assert!(raw.into_keyed().is_none());
    }
}
