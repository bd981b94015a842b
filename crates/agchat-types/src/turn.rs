use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::trace::TraceLog;

/// Where a retrieved reference came from. A reference is opaque beyond its
/// source URI for display purposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceLocation {
    #[serde(default)]
    pub source_uri: String,
}

/// One retrieved source document backing a citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedReference {
    pub location: ReferenceLocation,

    /// Retrieved snippet, when the service includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,

    /// Service-side reference metadata, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// A structured pointer from a span of generated text to one or more
/// retrieved source documents.
///
/// Order is significant twice over: citations are numbered in sequence
/// order, and references are numbered in order within each citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    /// Fragment describing which span of output text this citation
    /// supports. Opaque to the front-end; rendered verbatim.
    #[serde(default)]
    pub generated_response_part: Value,

    #[serde(default)]
    pub retrieved_references: Vec<RetrievedReference>,
}

/// Fully assembled result of one agent invocation: the concatenated answer
/// text, citations in arrival order, and the per-phase trace record.
///
/// Produced once per user turn by the invocation adapter and immutable
/// thereafter; the session keeps it until the next turn supersedes it.
/// Never constructed from a partially consumed stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTurnResult {
    pub output_text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,

    #[serde(default)]
    pub trace: TraceLog,
}

impl AgentTurnResult {
    /// Total retrieved-reference count across all citations; this is the
    /// number of footnote lines the presentation layer will emit.
    pub fn reference_count(&self) -> usize {
        self.citations
            .iter()
            .map(|c| c.retrieved_references.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reference(uri: &str) -> RetrievedReference {
        RetrievedReference {
            location: ReferenceLocation {
                source_uri: uri.to_string(),
            },
            content: None,
            metadata: None,
        }
    }

    #[test]
    fn test_citation_wire_shape() {
        let json_text = r#"{
            "generatedResponsePart": {"textResponsePart": {"text": "a fact"}},
            "retrievedReferences": [
                {"location": {"sourceUri": "s3://bucket/a"}},
                {"location": {"sourceUri": "s3://bucket/b"}, "content": {"text": "snippet"}}
            ]
        }"#;

        let citation: Citation = serde_json::from_str(json_text).unwrap();
        assert_eq!(citation.retrieved_references.len(), 2);
        assert_eq!(
            citation.retrieved_references[0].location.source_uri,
            "s3://bucket/a"
        );
        assert!(citation.retrieved_references[1].content.is_some());
    }

    #[test]
    fn test_reference_count_sums_across_citations() {
        let result = AgentTurnResult {
            output_text: "answer".to_string(),
            citations: vec![
                Citation {
                    generated_response_part: json!({}),
                    retrieved_references: vec![reference("s3://a"), reference("s3://b")],
                },
                Citation {
                    generated_response_part: json!({}),
                    retrieved_references: vec![reference("s3://c")],
                },
            ],
            trace: TraceLog::new(),
        };

        assert_eq!(result.reference_count(), 3);
    }
}
