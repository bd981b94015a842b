use serde::Serialize;
use serde_json::Value;

use agchat_types::{TraceEvent, TraceLog, TracePhase};

/// Display header for the trace panel. Each header covers one or two
/// phases; the guardrail passes render under the processing header they
/// belong to, the way the service's own console groups them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhaseHeader {
    #[serde(rename = "Pre-Processing")]
    PreProcessing,
    #[serde(rename = "Orchestration")]
    Orchestration,
    #[serde(rename = "Post-Processing")]
    PostProcessing,
}

impl PhaseHeader {
    /// Fixed iteration order; global step numbering follows it.
    pub const ALL: [PhaseHeader; 3] = [
        PhaseHeader::PreProcessing,
        PhaseHeader::Orchestration,
        PhaseHeader::PostProcessing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PhaseHeader::PreProcessing => "Pre-Processing",
            PhaseHeader::Orchestration => "Orchestration",
            PhaseHeader::PostProcessing => "Post-Processing",
        }
    }

    /// Phases rendered under this header, in order.
    pub fn phases(&self) -> &'static [TracePhase] {
        match self {
            PhaseHeader::PreProcessing => {
                &[TracePhase::PreGuardrail, TracePhase::PreProcessing]
            }
            PhaseHeader::Orchestration => &[TracePhase::Orchestration],
            PhaseHeader::PostProcessing => {
                &[TracePhase::PostProcessing, TracePhase::PostGuardrail]
            }
        }
    }
}

/// Sub-fields that carry the shared step identifier for a phase, checked in
/// order; the first one present in an event decides the event's step.
/// Guardrail phases have no step-bearing sub-fields — every event stands
/// alone.
fn step_fields(phase: TracePhase) -> Option<&'static [&'static str]> {
    match phase {
        TracePhase::PreProcessing | TracePhase::PostProcessing => Some(&[
            "modelInvocationInput",
            "modelInvocationOutput",
            "observation",
        ]),
        TracePhase::Orchestration => Some(&[
            "invocationInput",
            "modelInvocationInput",
            "modelInvocationOutput",
            "observation",
            "rationale",
        ]),
        TracePhase::PreGuardrail | TracePhase::PostGuardrail => None,
    }
}

/// One logical reasoning step: the events that share a step identifier
/// within one phase, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    /// Global 1-based step number; increases across phases, never resets.
    pub number: usize,
    pub events: Vec<TraceEvent>,
}

/// All steps rendered under one header. `steps` is empty when none of the
/// header's phases produced events — the panel shows the header anyway,
/// with a "None" body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseView {
    pub header: PhaseHeader,
    pub steps: Vec<TraceStep>,
}

/// Group a turn's trace into numbered steps under the three display
/// headers.
///
/// Within a phase, events sharing a step identifier accumulate into one
/// step, first-seen identifier order preserved; an event with no recognized
/// sub-field (or no identifier inside it) is dropped from the grouping, by
/// design. Pure and deterministic: grouping the same log twice yields
/// identical steps and numbers.
pub fn group_trace(trace: &TraceLog) -> Vec<PhaseView> {
    let mut views = Vec::with_capacity(PhaseHeader::ALL.len());
    let mut next_number = 1usize;

    for header in PhaseHeader::ALL {
        let mut steps = Vec::new();

        for &phase in header.phases() {
            for events in group_phase_events(phase, trace.events(phase)) {
                steps.push(TraceStep {
                    number: next_number,
                    events,
                });
                next_number += 1;
            }
        }

        views.push(PhaseView { header, steps });
    }

    views
}

/// Group one phase's events by shared step identifier, preserving
/// first-seen order. Guardrail phases (no identifier table) yield one
/// group per event.
fn group_phase_events(phase: TracePhase, events: &[TraceEvent]) -> Vec<Vec<TraceEvent>> {
    let Some(fields) = step_fields(phase) else {
        return events.iter().map(|e| vec![e.clone()]).collect();
    };

    // Step counts per phase are small; a vec of (id, group) pairs keeps
    // first-seen order without an ordered-map dependency.
    let mut groups: Vec<(String, Vec<TraceEvent>)> = Vec::new();

    for event in events {
        let Some(step_id) = derive_step_id(event, fields) else {
            continue;
        };

        match groups.iter_mut().find(|(id, _)| *id == step_id) {
            Some((_, group)) => group.push(event.clone()),
            None => groups.push((step_id, vec![event.clone()])),
        }
    }

    groups.into_iter().map(|(_, group)| group).collect()
}

/// Read the step identifier out of the first recognized sub-field.
fn derive_step_id(event: &TraceEvent, fields: &[&str]) -> Option<String> {
    let sub_field = fields.iter().find_map(|&f| event.get(f))?;
    match sub_field.get("traceId")? {
        Value::String(id) => Some(id.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
