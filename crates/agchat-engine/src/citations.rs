use serde::Serialize;
use serde_json::Value;

use agchat_types::{Citation, RetrievedReference};

/// Flattened per-reference citation view, numbered identically to the
/// inline footnote markers: 1-based, citation order, then reference order
/// within each citation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationView {
    #[serde(skip)]
    pub number: usize,

    pub generated_response_part: Value,
    pub retrieved_reference: RetrievedReferenceView,
}

/// Display shape of one retrieved reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedReferenceView {
    pub source_uri: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl From<&RetrievedReference> for RetrievedReferenceView {
    fn from(reference: &RetrievedReference) -> Self {
        Self {
            source_uri: reference.location.source_uri.clone(),
            content: reference.content.clone(),
            metadata: reference.metadata.clone(),
        }
    }
}

/// Flatten citations into one numbered view per retrieved reference —
/// the shape the UI renders as collapsible entries, and the same counter
/// space `render_answer` uses for the reference lines.
pub fn citation_views(citations: &[Citation]) -> Vec<CitationView> {
    let mut views = Vec::new();
    let mut number = 0usize;

    for citation in citations {
        for reference in &citation.retrieved_references {
            number += 1;
            views.push(CitationView {
                number,
                generated_response_part: citation.generated_response_part.clone(),
                retrieved_reference: reference.into(),
            });
        }
    }

    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use agchat_types::ReferenceLocation;
    use serde_json::json;

    fn citation(part: Value, uris: &[&str]) -> Citation {
        Citation {
            generated_response_part: part,
            retrieved_references: uris
                .iter()
                .map(|uri| RetrievedReference {
                    location: ReferenceLocation {
                        source_uri: uri.to_string(),
                    },
                    content: None,
                    metadata: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_views_number_like_footnotes() {
        let citations = vec![
            citation(json!({"span": 1}), &["s3://a", "s3://b"]),
            citation(json!({"span": 2}), &["s3://c"]),
        ];

        let views = citation_views(&citations);
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].number, 1);
        assert_eq!(views[1].number, 2);
        assert_eq!(views[2].number, 3);
        // Both references of the first citation carry its response part
        assert_eq!(views[0].generated_response_part, views[1].generated_response_part);
        assert_eq!(views[2].retrieved_reference.source_uri, "s3://c");
    }

    #[test]
    fn test_citation_without_references_yields_no_views() {
        let citations = vec![citation(json!({}), &[])];
        assert!(citation_views(&citations).is_empty());
    }

    #[test]
    fn test_view_serializes_without_number() {
        let views = citation_views(&[citation(json!({"t": "x"}), &["s3://a"])]);
        let encoded = serde_json::to_value(&views[0]).unwrap();
        assert_eq!(
            encoded,
            json!({
                "generatedResponsePart": {"t": "x"},
                "retrievedReference": {"sourceUri": "s3://a"}
            })
        );
    }
}
