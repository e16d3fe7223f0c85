//! The tool-calling agent that answers user queries.

pub mod executor;
pub mod prompt;

pub use executor::{AgentExecutor, DEFAULT_MAX_ITERATIONS};
pub use prompt::{PromptTemplate, SIMPLE3_PERSONA};

use crate::error::Result;
use crate::llm::models::LlmMessage;
use async_trait::async_trait;

/// Anything that can turn a query plus conversation history into a final answer
#[async_trait]
pub trait Agent: Send + Sync {
    async fn invoke(&self, query: &str, history: &[LlmMessage]) -> Result<String>;
}
