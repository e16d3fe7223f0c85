//! Classification and parsing of the agent's final answer.
//!
//! The agent may answer with a JSON object carrying a `summary`, or with plain
//! conversational text. [`classify`] makes the cheap syntactic call; malformed
//! candidates are caught later by [`ResearchResponse::parse`].

use crate::error::{Result, Simple3Error};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the agent's output should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Looks like a JSON object; still has to survive parsing
    CandidateStructured,
    PlainText,
}

/// Classify trimmed agent output by its outer braces.
///
/// This is a prefix/suffix check, not a grammar check: `{not valid json}` is a
/// candidate, while a valid JSON array is plain text.
pub fn classify(text: &str) -> ResponseKind {
    let text = text.trim();
    if text.starts_with('{') && text.ends_with('}') {
        ResponseKind::CandidateStructured
    } else {
        ResponseKind::PlainText
    }
}

/// Structured answer produced for research queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchResponse {
    /// Spoken summary of the answer
    pub summary: String,
}

impl ResearchResponse {
    /// Decode `text` into a response, failing with `SchemaError` when it is not JSON or
    /// lacks a string `summary`. Extra fields are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text.trim()).map_err(|e| {
            Simple3Error::SchemaError(format!("Failed to parse ResearchResponse: {}", e))
        })
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Instructions telling the model how to format a structured answer
    pub fn format_instructions() -> Result<String> {
        let schema = serde_json::to_string(&schemars::schema_for!(ResearchResponse))?;

        Ok(format!(
            "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
             As an example, for the schema {{\"properties\": {{\"foo\": {{\"title\": \"Foo\", \"description\": \"a list of strings\", \"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
             the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
             The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
             Here is the output schema:\n```\n{}\n```",
            schema
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_json_object() {
        assert_eq!(
            classify(r#"{"summary": "Paris is the capital of France."}"#),
            ResponseKind::CandidateStructured
        );
    }

    #[test]
    fn test_classify_plain_text() {
        assert_eq!(classify("Hello! How can I help?"), ResponseKind::PlainText);
    }

    #[test]
    fn test_classify_ignores_surrounding_whitespace() {
        assert_eq!(classify("  \n{\"summary\": \"x\"}\n "), ResponseKind::CandidateStructured);
    }

    #[test]
    fn test_classify_invalid_json_is_still_candidate() {
        assert_eq!(classify("{not valid json}"), ResponseKind::CandidateStructured);
    }

    #[test]
    fn test_classify_empty_object() {
        assert_eq!(classify("{}"), ResponseKind::CandidateStructured);
    }

    #[test]
    fn test_classify_prose_with_inner_braces() {
        assert_eq!(
            classify("Use {curly} braces like {this} in templates."),
            ResponseKind::PlainText
        );
        assert_eq!(classify("{opening} but not closing"), ResponseKind::PlainText);
        assert_eq!(classify("not opening but {closing}"), ResponseKind::PlainText);
    }

    #[test]
    fn test_classify_fenced_json_is_plain_text() {
        assert_eq!(classify("```json\n{\"summary\": \"x\"}\n```"), ResponseKind::PlainText);
    }

    #[test]
    fn test_classify_json_array_is_plain_text() {
        assert_eq!(classify(r#"[{"summary": "x"}]"#), ResponseKind::PlainText);
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(""), ResponseKind::PlainText);
    }

    #[test]
    fn test_parse_summary() {
        let parsed = ResearchResponse::parse(r#"{"summary": "Paris is the capital of France."}"#)
            .unwrap();
        assert_eq!(parsed.summary, "Paris is the capital of France.");
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let parsed =
            ResearchResponse::parse(r#"{"summary": "ok", "sources": ["wikipedia"]}"#).unwrap();
        assert_eq!(parsed.summary, "ok");
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = ResearchResponse::parse("{not valid json}").unwrap_err();
        assert!(matches!(err, Simple3Error::SchemaError(_)));
    }

    #[test]
    fn test_parse_empty_object_missing_summary() {
        let err = ResearchResponse::parse("{}").unwrap_err();
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn test_parse_wrong_summary_type() {
        let err = ResearchResponse::parse(r#"{"summary": 42}"#).unwrap_err();
        assert!(matches!(err, Simple3Error::SchemaError(_)));
    }

    #[test]
    fn test_pretty_json() {
        let response = ResearchResponse {
            summary: "Paris".to_string(),
        };
        assert_eq!(response.to_pretty_json().unwrap(), "{\n  \"summary\": \"Paris\"\n}");
    }

    #[test]
    fn test_format_instructions_embed_schema() {
        let instructions = ResearchResponse::format_instructions().unwrap();
        assert!(instructions.contains("JSON schema"));
        assert!(instructions.contains("\"summary\""));
        assert!(instructions.contains("\"required\""));
    }
}
