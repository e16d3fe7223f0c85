//! Bounded tool-calling agent loop.

use crate::agent::prompt::PromptTemplate;
use crate::agent::Agent;
use crate::error::{Result, Simple3Error};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::LlmTool;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default cap on model calls per invocation
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Runs the reason → tool → scratchpad loop until the model produces a final answer.
///
/// Each iteration is one model call. When the model asks for tools, every requested
/// tool runs in order and the call plus its textual result are appended to the
/// scratchpad before the next iteration. Tool failures and unknown tool names are
/// reported to the model as text.
pub struct AgentExecutor {
    model: String,
    gateway: Arc<dyn LlmGateway>,
    prompt: PromptTemplate,
    tools: Vec<Box<dyn LlmTool>>,
    completion: CompletionConfig,
    max_iterations: usize,
}

impl AgentExecutor {
    pub fn new(
        model: impl Into<String>,
        gateway: Arc<dyn LlmGateway>,
        prompt: PromptTemplate,
        tools: Vec<Box<dyn LlmTool>>,
    ) -> Self {
        Self {
            model: model.into(),
            gateway,
            prompt,
            tools,
            completion: CompletionConfig::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.descriptor().function.name).collect()
    }

    async fn execute_tool(&self, call: &LlmToolCall) -> String {
        let Some(tool) = self.tools.iter().find(|t| t.matches(&call.name)) else {
            warn!("Tool not found: {}", call.name);
            return format!(
                "{} is not a valid tool, try one of [{}].",
                call.name,
                self.tool_names().join(", ")
            );
        };

        info!("Executing tool: {}", call.name);
        debug!(arguments = ?call.arguments, "Tool arguments");

        match tool.run(&call.arguments).await {
            Ok(Value::String(text)) => text,
            Ok(other) => other.to_string(),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                format!("Tool error: {}", e)
            }
        }
    }
}

#[async_trait]
impl Agent for AgentExecutor {
    async fn invoke(&self, query: &str, history: &[LlmMessage]) -> Result<String> {
        let tools = (!self.tools.is_empty()).then_some(self.tools.as_slice());
        let mut scratchpad: Vec<LlmMessage> = Vec::new();

        for step in 1..=self.max_iterations {
            let messages = self.prompt.format(history, query, &scratchpad);
            let response =
                self.gateway.complete(&self.model, &messages, tools, &self.completion).await?;

            if response.tool_calls.is_empty() {
                info!(step, "Agent finished");
                return Ok(response.content.unwrap_or_default());
            }

            info!(step, "Tool calls requested: {}", response.tool_calls.len());

            scratchpad.push(LlmMessage::assistant_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let output = self.execute_tool(call).await;
                scratchpad.push(LlmMessage::tool_result(call, output));
            }
        }

        Err(Simple3Error::AgentError(format!(
            "Agent stopped after {} iterations without a final answer",
            self.max_iterations
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::models::{LlmGatewayResponse, MessageRole};
    use crate::llm::tools::{required_str_arg, ToolDescriptor};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockGateway {
        responses: Vec<LlmGatewayResponse>,
        calls: Mutex<Vec<Vec<LlmMessage>>>,
    }

    impl MockGateway {
        fn new(responses: Vec<LlmGatewayResponse>) -> Self {
            Self {
                responses,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn messages_for_call(&self, idx: usize) -> Vec<LlmMessage> {
            self.calls.lock().unwrap()[idx].clone()
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        async fn complete(
            &self,
            _model: &str,
            messages: &[LlmMessage],
            _tools: Option<&[Box<dyn LlmTool>]>,
            _config: &CompletionConfig,
        ) -> Result<LlmGatewayResponse> {
            let mut calls = self.calls.lock().unwrap();
            let idx = calls.len();
            calls.push(messages.to_vec());

            Ok(self.responses.get(idx).cloned().unwrap_or(LlmGatewayResponse {
                content: Some("default response".to_string()),
                tool_calls: vec![],
            }))
        }
    }

    struct FailingGateway;

    #[async_trait]
    impl LlmGateway for FailingGateway {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[LlmMessage],
            _tools: Option<&[Box<dyn LlmTool>]>,
            _config: &CompletionConfig,
        ) -> Result<LlmGatewayResponse> {
            Err(Simple3Error::GatewayError("quota exceeded".to_string()))
        }
    }

    #[derive(Clone)]
    struct UpperTool;

    #[async_trait]
    impl LlmTool for UpperTool {
        async fn run(&self, args: &HashMap<String, Value>) -> Result<Value> {
            Ok(json!(required_str_arg(args, "input")?.to_uppercase()))
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::text_function("upper", "Uppercase text", "input", "Text")
        }

        fn clone_box(&self) -> Box<dyn LlmTool> {
            Box::new(self.clone())
        }
    }

    fn text(content: &str) -> LlmGatewayResponse {
        LlmGatewayResponse {
            content: Some(content.to_string()),
            tool_calls: vec![],
        }
    }

    fn tool_call(id: &str, name: &str, args: Value) -> LlmGatewayResponse {
        let arguments: HashMap<String, Value> =
            serde_json::from_value(args).unwrap_or_default();
        LlmGatewayResponse {
            content: None,
            tool_calls: vec![LlmToolCall {
                id: Some(id.to_string()),
                name: name.to_string(),
                arguments,
            }],
        }
    }

    fn executor(gateway: Arc<MockGateway>) -> AgentExecutor {
        AgentExecutor::new("test-model", gateway, PromptTemplate::new("persona"), vec![Box::new(UpperTool)])
    }

    #[tokio::test]
    async fn test_invoke_direct_answer() {
        let gateway = Arc::new(MockGateway::new(vec![text("Hello! How can I help?")]));
        let agent = executor(gateway.clone());

        let output = agent.invoke("hi", &[]).await.unwrap();

        assert_eq!(output, "Hello! How can I help?");
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invoke_missing_content_is_empty() {
        let gateway = Arc::new(MockGateway::new(vec![LlmGatewayResponse::default()]));
        let agent = executor(gateway);

        assert_eq!(agent.invoke("hi", &[]).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_invoke_runs_tool_and_fills_scratchpad() {
        let gateway = Arc::new(MockGateway::new(vec![
            tool_call("call_1", "upper", json!({"input": "paris"})),
            text(r#"{"summary": "PARIS"}"#),
        ]));
        let agent = executor(gateway.clone());

        let output = agent.invoke("shout paris", &[]).await.unwrap();

        assert_eq!(output, r#"{"summary": "PARIS"}"#);
        assert_eq!(gateway.call_count(), 2);

        let second = gateway.messages_for_call(1);
        assert_eq!(second.len(), 4);
        assert_eq!(second[1].content.as_deref(), Some("shout paris"));
        assert_eq!(second[2].role, MessageRole::Assistant);
        assert_eq!(second[2].tool_calls.as_ref().unwrap()[0].name, "upper");
        assert_eq!(second[3].role, MessageRole::Tool);
        assert_eq!(second[3].content.as_deref(), Some("PARIS"));
    }

    #[tokio::test]
    async fn test_invoke_includes_history() {
        let gateway = Arc::new(MockGateway::new(vec![text("again")]));
        let agent = executor(gateway.clone());
        let history = vec![LlmMessage::user("before"), LlmMessage::assistant("answer")];

        agent.invoke("now", &history).await.unwrap();

        let sent = gateway.messages_for_call(0);
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[1].content.as_deref(), Some("before"));
        assert_eq!(sent[3].content.as_deref(), Some("now"));
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_as_text() {
        let gateway = Arc::new(MockGateway::new(vec![
            tool_call("call_1", "teleport", json!({})),
            text("Sorry, I can't do that."),
        ]));
        let agent = executor(gateway.clone());

        let output = agent.invoke("teleport me", &[]).await.unwrap();

        assert_eq!(output, "Sorry, I can't do that.");
        let second = gateway.messages_for_call(1);
        assert_eq!(
            second[3].content.as_deref(),
            Some("teleport is not a valid tool, try one of [upper].")
        );
    }

    #[tokio::test]
    async fn test_tool_error_reported_as_text() {
        let gateway = Arc::new(MockGateway::new(vec![
            tool_call("call_1", "upper", json!({})),
            text("The tool needed input."),
        ]));
        let agent = executor(gateway.clone());

        agent.invoke("shout", &[]).await.unwrap();

        let second = gateway.messages_for_call(1);
        let tool_output = second[3].content.as_deref().unwrap();
        assert!(tool_output.starts_with("Tool error: "));
        assert!(tool_output.contains("input parameter is required"));
    }

    #[tokio::test]
    async fn test_max_iterations_bound() {
        let looping: Vec<_> =
            (0..5).map(|i| tool_call(&format!("call_{}", i), "upper", json!({"input": "x"}))).collect();
        let gateway = Arc::new(MockGateway::new(looping));
        let agent = executor(gateway.clone()).with_max_iterations(3);

        let err = agent.invoke("loop", &[]).await.unwrap_err();

        assert!(matches!(err, Simple3Error::AgentError(_)));
        assert!(err.to_string().contains("3 iterations"));
        assert_eq!(gateway.call_count(), 3);
    }

    #[tokio::test]
    async fn test_gateway_error_propagates() {
        let agent = AgentExecutor::new(
            "test-model",
            Arc::new(FailingGateway),
            PromptTemplate::default(),
            vec![],
        );

        let err = agent.invoke("hi", &[]).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_with_max_iterations_at_least_one() {
        let gateway = Arc::new(MockGateway::new(vec![]));
        let agent = executor(gateway).with_max_iterations(0);
        assert_eq!(agent.max_iterations, 1);
        assert_eq!(agent.model(), "test-model");
    }
}
