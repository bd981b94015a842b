use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use agchat_types::{AgentTurnResult, TraceLog, TracePhase};

use crate::agent::schema::{RawPhase, StreamEvent};
use crate::error::{Error, Result};

/// Assemble a drained event feed into one turn result.
///
/// Pure with respect to the transport: the input is any finite event
/// sequence, which is what makes the normalization testable offline.
///
/// Ordering rules:
/// - chunk text concatenates in arrival order;
/// - citations append in arrival order, within-chunk order preserved;
/// - trace payloads append to their phase bucket in arrival order.
///
/// The first `guardrailTrace` of an invocation is the pre-agent pass, every
/// later one the post-agent pass. The flag lives on this call's stack, so
/// it cannot leak into the next turn.
///
/// Any `Err` item aborts assembly: the caller gets the error, never a
/// partially assembled result.
pub fn assemble_turn<I>(events: I) -> Result<AgentTurnResult>
where
    I: IntoIterator<Item = Result<StreamEvent>>,
{
    let mut output_text = String::new();
    let mut citations = Vec::new();
    let mut trace = TraceLog::new();
    let mut has_guardrail_trace = false;

    for event in events {
        let event = event?;

        if let Some(chunk) = event.chunk {
            output_text.push_str(&decode_chunk_text(&chunk.bytes)?);
            if let Some(attribution) = chunk.attribution {
                citations.extend(attribution.citations);
            }
        }

        if let Some(envelope) = event.trace
            && let Some((raw, payload)) = envelope.trace.into_keyed()
        {
            let phase = match raw {
                RawPhase::Guardrail => {
                    if has_guardrail_trace {
                        TracePhase::PostGuardrail
                    } else {
                        has_guardrail_trace = true;
                        TracePhase::PreGuardrail
                    }
                }
                RawPhase::PreProcessing => TracePhase::PreProcessing,
                RawPhase::Orchestration => TracePhase::Orchestration,
                RawPhase::PostProcessing => TracePhase::PostProcessing,
            };
            trace.push(phase, payload.into());
        }
    }

    Ok(AgentTurnResult {
        output_text,
        citations,
        trace,
    })
}

fn decode_chunk_text(encoded: &str) -> Result<String> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| Error::Chunk(format!("invalid base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Chunk(format!("invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunk_event(text: &str) -> Result<StreamEvent> {
        let line = json!({"chunk": {"bytes": BASE64.encode(text)}});
        Ok(serde_json::from_value(line).unwrap())
    }

    fn chunk_event_with_citations(text: &str, uris: &[&str]) -> Result<StreamEvent> {
        let citations: Vec<_> = uris
            .iter()
            .map(|uri| {
                json!({
                    "generatedResponsePart": {"textResponsePart": {"text": text}},
                    "retrievedReferences": [{"location": {"sourceUri": uri}}]
                })
            })
            .collect();
        let line = json!({
            "chunk": {
                "bytes": BASE64.encode(text),
                "attribution": {"citations": citations}
            }
        });
        Ok(serde_json::from_value(line).unwrap())
    }

    fn trace_event(raw_key: &str, trace_id: &str) -> Result<StreamEvent> {
        let mut phase = serde_json::Map::new();
        phase.insert(raw_key.to_string(), json!({"traceId": trace_id}));
        let line = json!({"trace": {"trace": phase}});
        Ok(serde_json::from_value(line).unwrap())
    }

    #[test]
    fn test_chunks_concatenate_in_arrival_order() {
        let result =
            assemble_turn(vec![chunk_event("Hello, "), chunk_event("world")]).unwrap();
        assert_eq!(result.output_text, "Hello, world");
        assert!(result.citations.is_empty());
        assert!(result.trace.is_empty());
    }

    #[test]
    fn test_citations_append_in_arrival_order() {
        let result = assemble_turn(vec![
            chunk_event_with_citations("first", &["s3://bucket/a"]),
            chunk_event_with_citations("second", &["s3://bucket/b", "s3://bucket/c"]),
        ])
        .unwrap();

        let uris: Vec<_> = result
            .citations
            .iter()
            .flat_map(|c| &c.retrieved_references)
            .map(|r| r.location.source_uri.as_str())
            .collect();
        assert_eq!(uris, ["s3://bucket/a", "s3://bucket/b", "s3://bucket/c"]);
    }

    #[test]
    fn test_guardrail_disambiguation_first_pre_rest_post() {
        let result = assemble_turn(vec![
            trace_event("guardrailTrace", "g-1"),
            trace_event("preProcessingTrace", "p-1"),
            trace_event("guardrailTrace", "g-2"),
            trace_event("guardrailTrace", "g-3"),
        ])
        .unwrap();

        assert_eq!(result.trace.events(TracePhase::PreGuardrail).len(), 1);
        assert_eq!(result.trace.events(TracePhase::PostGuardrail).len(), 2);
        assert_eq!(
            result.trace.events(TracePhase::PreGuardrail)[0].get("traceId"),
            Some(&json!("g-1"))
        );
        assert_eq!(
            result.trace.events(TracePhase::PostGuardrail)[0].get("traceId"),
            Some(&json!("g-2"))
        );
    }

    #[test]
    fn test_guardrail_flag_resets_between_invocations() {
        // Two separate assemblies: each one's first guardrail event must land
        // in the pre bucket again.
        for _ in 0..2 {
            let result = assemble_turn(vec![
                trace_event("guardrailTrace", "g-1"),
                trace_event("guardrailTrace", "g-2"),
            ])
            .unwrap();
            assert_eq!(result.trace.events(TracePhase::PreGuardrail).len(), 1);
            assert_eq!(result.trace.events(TracePhase::PostGuardrail).len(), 1);
        }
    }

    #[test]
    fn test_trace_payloads_bucket_by_phase() {
        let result = assemble_turn(vec![
            trace_event("preProcessingTrace", "p-1"),
            trace_event("orchestrationTrace", "o-1"),
            trace_event("orchestrationTrace", "o-2"),
            trace_event("postProcessingTrace", "q-1"),
        ])
        .unwrap();

        assert_eq!(result.trace.events(TracePhase::PreProcessing).len(), 1);
        assert_eq!(result.trace.events(TracePhase::Orchestration).len(), 2);
        assert_eq!(result.trace.events(TracePhase::PostProcessing).len(), 1);
        assert!(result.trace.events(TracePhase::PreGuardrail).is_empty());
    }

    #[test]
    fn test_error_mid_stream_returns_no_partial_result() {
        let events = vec![
            chunk_event("partial text that must not surface"),
            Err(Error::Chunk("stream died".to_string())),
        ];
        assert!(assemble_turn(events).is_err());
    }

    #[test]
    fn test_invalid_chunk_bytes_fail_assembly() {
        let line = json!({"chunk": {"bytes": "%%%not-base64%%%"}});
        let event: StreamEvent = serde_json::from_value(line).unwrap();
        let err = assemble_turn(vec![Ok(event)]).unwrap_err();
        assert!(matches!(err, Error::Chunk(_)));
    }

    #[test]
    fn test_unrecognized_events_are_skipped() {
        let unknown: StreamEvent =
            serde_json::from_value(json!({"returnControl": {"invocationId": "x"}})).unwrap();
        let result = assemble_turn(vec![Ok(unknown), chunk_event("ok")]).unwrap();
        assert_eq!(result.output_text, "ok");
    }
}
