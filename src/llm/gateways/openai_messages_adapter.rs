//! Adapter for converting LLM messages to the OpenAI chat-completions format.

use crate::error::Result;
use crate::llm::models::{LlmMessage, LlmToolCall, MessageRole};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::warn;

/// Adapt LLM messages to OpenAI format.
pub fn adapt_messages_to_openai(messages: &[LlmMessage]) -> Result<Vec<Value>> {
    let mut result = Vec::with_capacity(messages.len());

    for msg in messages {
        let openai_msg = match msg.role {
            MessageRole::System => json!({
                "role": "system",
                "content": msg.content.as_deref().unwrap_or("")
            }),
            MessageRole::User => json!({
                "role": "user",
                "content": msg.content.as_deref().unwrap_or("")
            }),
            MessageRole::Assistant => {
                let mut assistant_msg = json!({ "role": "assistant" });

                if let Some(ref content) = msg.content {
                    assistant_msg["content"] = json!(content);
                }

                if let Some(ref tool_calls) = msg.tool_calls {
                    let mut formatted_calls = Vec::with_capacity(tool_calls.len());
                    for tc in tool_calls {
                        formatted_calls.push(json!({
                            "id": tc.id.as_deref().unwrap_or(""),
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": serde_json::to_string(&tc.arguments)?
                            }
                        }));
                    }
                    assistant_msg["tool_calls"] = json!(formatted_calls);
                }

                assistant_msg
            }
            MessageRole::Tool => {
                // the answered call travels as the first entry of tool_calls
                let tool_call_id = msg
                    .tool_calls
                    .as_ref()
                    .and_then(|tcs| tcs.first())
                    .and_then(|tc| tc.id.clone())
                    .unwrap_or_default();

                json!({
                    "role": "tool",
                    "content": msg.content.as_deref().unwrap_or(""),
                    "tool_call_id": tool_call_id
                })
            }
        };

        result.push(openai_msg);
    }

    Ok(result)
}

/// Convert tool calls from OpenAI format to internal format.
///
/// Calls without a function name are dropped. Calls without an id get a generated one
/// so that the tool result can still be matched to its call.
pub fn convert_tool_calls(tool_calls: &[Value]) -> Vec<LlmToolCall> {
    tool_calls
        .iter()
        .filter_map(|tc| {
            let name = tc["function"]["name"].as_str()?.to_string();
            let id = tc["id"]
                .as_str()
                .filter(|id| !id.is_empty())
                .map(String::from)
                .unwrap_or_else(|| format!("call_{}", uuid::Uuid::new_v4().simple()));

            let arguments: HashMap<String, Value> = match &tc["function"]["arguments"] {
                Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                    warn!(tool = %name, error = %e, "Unparseable tool arguments");
                    HashMap::new()
                }),
                Value::Object(map) => map.clone().into_iter().collect(),
                _ => HashMap::new(),
            };

            Some(LlmToolCall {
                id: Some(id),
                name,
                arguments,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapt_system_and_user_messages() {
        let messages = vec![LlmMessage::system("You are SIMPLE3"), LlmMessage::user("Hello")];

        let result = adapt_messages_to_openai(&messages).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0]["role"], "system");
        assert_eq!(result[0]["content"], "You are SIMPLE3");
        assert_eq!(result[1]["role"], "user");
        assert_eq!(result[1]["content"], "Hello");
    }

    #[test]
    fn test_adapt_assistant_with_tool_calls() {
        let mut arguments = HashMap::new();
        arguments.insert("query".to_string(), json!("Eiffel Tower"));
        let tool_call = LlmToolCall {
            id: Some("call_123".to_string()),
            name: "wikipedia".to_string(),
            arguments,
        };

        let messages = vec![LlmMessage::assistant_tool_calls(None, vec![tool_call])];
        let result = adapt_messages_to_openai(&messages).unwrap();

        assert_eq!(result[0]["role"], "assistant");
        assert!(result[0].get("content").is_none());

        let calls = result[0]["tool_calls"].as_array().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["id"], "call_123");
        assert_eq!(calls[0]["type"], "function");
        assert_eq!(calls[0]["function"]["name"], "wikipedia");
        let args: Value =
            serde_json::from_str(calls[0]["function"]["arguments"].as_str().unwrap()).unwrap();
        assert_eq!(args["query"], "Eiffel Tower");
    }

    #[test]
    fn test_adapt_tool_message() {
        let call = LlmToolCall {
            id: Some("call_123".to_string()),
            name: "wikipedia".to_string(),
            arguments: HashMap::new(),
        };
        let messages = vec![LlmMessage::tool_result(&call, "Page: Eiffel Tower")];

        let result = adapt_messages_to_openai(&messages).unwrap();

        assert_eq!(result[0]["role"], "tool");
        assert_eq!(result[0]["content"], "Page: Eiffel Tower");
        assert_eq!(result[0]["tool_call_id"], "call_123");
    }

    #[test]
    fn test_convert_tool_calls() {
        let tool_calls = vec![json!({
            "id": "call_abc",
            "type": "function",
            "function": {
                "name": "DuckDuckGo_Search",
                "arguments": "{\"query\": \"test\"}"
            }
        })];

        let result = convert_tool_calls(&tool_calls);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, Some("call_abc".to_string()));
        assert_eq!(result[0].name, "DuckDuckGo_Search");
        assert_eq!(result[0].arguments.get("query"), Some(&json!("test")));
    }

    #[test]
    fn test_convert_tool_calls_generates_missing_id() {
        let tool_calls = vec![json!({
            "type": "function",
            "function": { "name": "wikipedia", "arguments": "{}" }
        })];

        let result = convert_tool_calls(&tool_calls);

        assert!(result[0].id.as_deref().unwrap().starts_with("call_"));
    }

    #[test]
    fn test_convert_tool_calls_object_arguments() {
        let tool_calls = vec![json!({
            "id": "call_1",
            "function": { "name": "Save_Content", "arguments": {"content": "notes"} }
        })];

        let result = convert_tool_calls(&tool_calls);

        assert_eq!(result[0].arguments.get("content"), Some(&json!("notes")));
    }

    #[test]
    fn test_convert_tool_calls_skips_nameless() {
        let tool_calls = vec![json!({ "id": "call_1", "function": { "arguments": "{}" } })];
        assert!(convert_tool_calls(&tool_calls).is_empty());
    }

    #[test]
    fn test_convert_tool_calls_bad_arguments() {
        let tool_calls = vec![json!({
            "id": "call_1",
            "function": { "name": "wikipedia", "arguments": "not json" }
        })];

        let result = convert_tool_calls(&tool_calls);
        assert_eq!(result.len(), 1);
        assert!(result[0].arguments.is_empty());
    }
}
