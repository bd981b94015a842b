use serde::{Deserialize, Serialize};
use serde_json::Value;

// NOTE: Trace Schema Design
//
// The managed service emits trace payloads under loosely-typed phase keys.
// Two constraints shape the local model:
//
// 1. The raw feed reuses a single `guardrailTrace` key for both the
//    pre-agent and post-agent guardrail passes. The adapter resolves the
//    ambiguity at assembly time (first occurrence = pre, rest = post), so
//    the terminal phase set here has five members, not four.
// 2. Payload shapes vary by phase and service version. Events stay opaque
//    (`serde_json::Value`) — only the step identifier is ever read out of
//    them, and that happens in the engine layer.

/// Terminal trace phase. The raw `guardrailTrace` key is never stored
/// directly; it is disambiguated into `PreGuardrail`/`PostGuardrail`
/// before it reaches a `TraceLog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TracePhase {
    #[serde(rename = "preGuardrailTrace")]
    PreGuardrail,
    #[serde(rename = "preProcessingTrace")]
    PreProcessing,
    #[serde(rename = "orchestrationTrace")]
    Orchestration,
    #[serde(rename = "postProcessingTrace")]
    PostProcessing,
    #[serde(rename = "postGuardrailTrace")]
    PostGuardrail,
}

impl TracePhase {
    /// All phases in pipeline order. Step numbering iterates this order
    /// (via the header grouping) and never resets between phases.
    pub const ALL: [TracePhase; 5] = [
        TracePhase::PreGuardrail,
        TracePhase::PreProcessing,
        TracePhase::Orchestration,
        TracePhase::PostProcessing,
        TracePhase::PostGuardrail,
    ];

    /// Stable key string, matching the wire spelling.
    pub fn key(&self) -> &'static str {
        match self {
            TracePhase::PreGuardrail => "preGuardrailTrace",
            TracePhase::PreProcessing => "preProcessingTrace",
            TracePhase::Orchestration => "orchestrationTrace",
            TracePhase::PostProcessing => "postProcessingTrace",
            TracePhase::PostGuardrail => "postGuardrailTrace",
        }
    }
}

/// One raw trace payload as emitted by the service for a single phase.
///
/// Kept opaque on purpose: shapes differ per phase and evolve with the
/// service. Consumers read individual fields, they never exhaustively
/// destructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceEvent(pub Value);

impl TraceEvent {
    pub fn new(value: Value) -> Self {
        TraceEvent(value)
    }

    /// Field lookup on the payload object. Returns None for non-object
    /// payloads or missing fields.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for TraceEvent {
    fn from(value: Value) -> Self {
        TraceEvent(value)
    }
}

/// Per-turn trace store: one ordered event list per terminal phase.
///
/// Replaces the upstream dictionary-of-dictionaries with typed fields so
/// phase lookups cannot misspell a key. Event order within a phase is
/// arrival order and is preserved through grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceLog {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_guardrail: Vec<TraceEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_processing: Vec<TraceEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orchestration: Vec<TraceEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_processing: Vec<TraceEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_guardrail: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to a phase bucket, preserving arrival order.
    pub fn push(&mut self, phase: TracePhase, event: TraceEvent) {
        self.bucket_mut(phase).push(event);
    }

    /// Events recorded for a phase, in arrival order.
    pub fn events(&self, phase: TracePhase) -> &[TraceEvent] {
        match phase {
            TracePhase::PreGuardrail => &self.pre_guardrail,
            TracePhase::PreProcessing => &self.pre_processing,
            TracePhase::Orchestration => &self.orchestration,
            TracePhase::PostProcessing => &self.post_processing,
            TracePhase::PostGuardrail => &self.post_guardrail,
        }
    }

    fn bucket_mut(&mut self, phase: TracePhase) -> &mut Vec<TraceEvent> {
        match phase {
            TracePhase::PreGuardrail => &mut self.pre_guardrail,
            TracePhase::PreProcessing => &mut self.pre_processing,
            TracePhase::Orchestration => &mut self.orchestration,
            TracePhase::PostProcessing => &mut self.post_processing,
            TracePhase::PostGuardrail => &mut self.post_guardrail,
        }
    }

    pub fn is_empty(&self) -> bool {
        TracePhase::ALL.iter().all(|p| self.events(*p).is_empty())
    }

    /// Total event count across all phases.
    pub fn len(&self) -> usize {
        TracePhase::ALL.iter().map(|p| self.events(*p).len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_preserves_arrival_order() {
        let mut log = TraceLog::new();
        log.push(TracePhase::Orchestration, json!({"seq": 1}).into());
        log.push(TracePhase::Orchestration, json!({"seq": 2}).into());
        log.push(TracePhase::PreProcessing, json!({"seq": 3}).into());

        let events = log.events(TracePhase::Orchestration);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].get("seq"), Some(&json!(1)));
        assert_eq!(events[1].get("seq"), Some(&json!(2)));
        assert_eq!(log.events(TracePhase::PreProcessing).len(), 1);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_empty_phase_is_empty_slice() {
        let log = TraceLog::new();
        assert!(log.events(TracePhase::PostGuardrail).is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn test_phase_key_spelling() {
        assert_eq!(TracePhase::PreGuardrail.key(), "preGuardrailTrace");
        assert_eq!(TracePhase::Orchestration.key(), "orchestrationTrace");
    }

    #[test]
    fn test_trace_log_serde_round_trip() {
        let mut log = TraceLog::new();
        log.push(TracePhase::PreGuardrail, json!({"traceId": "t-0"}).into());
        log.push(
            TracePhase::Orchestration,
            json!({"rationale": {"traceId": "t-1"}}).into(),
        );

        let encoded = serde_json::to_string(&log).unwrap();
        let decoded: TraceLog = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, log);

        // Empty buckets stay off the wire
        assert!(!encoded.contains("postGuardrail"));
    }
}
