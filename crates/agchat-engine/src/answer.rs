use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use agchat_types::Citation;

/// Inline citation placeholder as emitted by the service: `%[N]%`.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%\[\d+\]%").expect("placeholder pattern is valid"));

/// Unwrap the agent's structured answer envelope.
///
/// Some agent configurations answer with a JSON object carrying the
/// original `instruction` and the actual `result`. When the text parses to
/// such an object, the `result` value replaces the answer; on any parse
/// failure the text passes through unchanged. The upstream service is known
/// to mis-escape field contents, so failure here is expected and swallowed,
/// never surfaced.
pub fn unwrap_structured_output(output_text: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(output_text)
        && map.contains_key("instruction")
        && let Some(Value::String(result)) = map.get("result")
    {
        return result.clone();
    }
    output_text.to_string()
}

/// Render the displayable answer: substitute inline citation placeholders
/// with footnote markers and append one reference line per retrieved
/// reference.
///
/// Markers are positional — the digits inside `%[N]%` are discarded and a
/// running counter (1-based, one increment per occurrence) supplies the
/// visible number. Reference lines are numbered by an independent counter
/// walking citations in order and references within each citation in order.
///
/// The two counters agree only when placeholders and references correspond
/// 1:1 in matching order. That fragility is inherited from the upstream
/// format and is preserved here: a marker without a matching reference line
/// (or the reverse) renders as-is rather than being repaired or rejected.
pub fn render_answer(output_text: &str, citations: &[Citation]) -> String {
    let mut marker = 0usize;
    let substituted = PLACEHOLDER.replace_all(output_text, |_: &Captures| {
        marker += 1;
        format!("[{}]", marker)
    });

    let mut rendered = substituted.into_owned();
    let mut footnote = 0usize;
    for citation in citations {
        for reference in &citation.retrieved_references {
            footnote += 1;
            rendered.push('\n');
            rendered.push_str(&format!(
                "[{}] {}",
                footnote, reference.location.source_uri
            ));
        }
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use agchat_types::{ReferenceLocation, RetrievedReference};
    use serde_json::json;

    fn citation(uris: &[&str]) -> Citation {
        Citation {
            generated_response_part: json!({}),
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
    fn test_unwrap_returns_result_field() {
        let text = r#"{"instruction":"x","result":"y"}"#;
        assert_eq!(unwrap_structured_output(text), "y");
    }

    #[test]
    fn test_unwrap_leaves_plain_text_unchanged() {
        assert_eq!(unwrap_structured_output("not json at all"), "not json at all");
    }

    #[test]
    fn test_unwrap_requires_both_fields() {
        let text = r#"{"result":"y"}"#;
        assert_eq!(unwrap_structured_output(text), text);
        let text = r#"{"instruction":"x"}"#;
        assert_eq!(unwrap_structured_output(text), text);
    }

    #[test]
    fn test_unwrap_ignores_non_object_json() {
        assert_eq!(unwrap_structured_output("[1, 2, 3]"), "[1, 2, 3]");
        assert_eq!(unwrap_structured_output("\"just a string\""), "\"just a string\"");
    }

    #[test]
    fn test_markers_are_positional_not_keyed() {
        // Numbers inside the placeholders are noise; position decides.
        let text = "a %[7]% b %[7]% c %[2]%";
        let rendered = render_answer(text, &[]);
        assert_eq!(rendered, "a [1] b [2] c [3]");
    }

    #[test]
    fn test_reference_numbering_spans_citations() {
        let citations = vec![citation(&["s3://a", "s3://b"]), citation(&["s3://c"])];
        let rendered = render_answer("answer", &citations);
        assert_eq!(rendered, "answer\n[1] s3://a\n[2] s3://b\n[3] s3://c");
    }

    #[test]
    fn test_end_to_end_two_citations() {
        let citations = vec![citation(&["s3://bucket/a"]), citation(&["s3://bucket/b"])];
        let rendered = render_answer("See %[1]% and %[2]%.", &citations);
        assert_eq!(
            rendered,
            "See [1] and [2].\n[1] s3://bucket/a\n[2] s3://bucket/b"
        );
    }

    #[test]
    fn test_counter_mismatch_is_preserved_not_repaired() {
        // Three markers but only two references: the third marker keeps its
        // number and simply has no reference line. Documented fragile
        // contract, inherited from the upstream format.
        let citations = vec![citation(&["s3://a"]), citation(&["s3://b"])];
        let rendered = render_answer("x %[1]% y %[2]% z %[3]%", &citations);
        assert_eq!(rendered, "x [1] y [2] z [3]\n[1] s3://a\n[2] s3://b");
    }

    #[test]
    fn test_no_citations_still_substitutes_markers() {
        let rendered = render_answer("see %[4]%", &[]);
        assert_eq!(rendered, "see [1]");
    }

    #[test]
    fn test_malformed_placeholders_left_alone() {
        let rendered = render_answer("%[]% %[x]% %[1] [2]%", &[]);
        assert_eq!(rendered, "%[]% %[x]% %[1] [2]%");
    }
}
