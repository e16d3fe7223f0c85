//! SIMPLE3: a voice-enabled research assistant.
//!
//! A tool-calling agent answers console queries using web search, Wikipedia and a
//! file-save tool; the answer is spoken through Murf text-to-speech.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod repl;
pub mod response;
pub mod speech;

pub use error::{Result, Simple3Error};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::{Agent, AgentExecutor, PromptTemplate};
    pub use crate::config::{Credentials, Settings};
    pub use crate::error::{Result, Simple3Error};
    pub use crate::llm::gateways::OpenAIGateway;
    pub use crate::llm::tools::{FunctionDescriptor, LlmTool, ToolDescriptor};
    pub use crate::llm::{CompletionConfig, LlmGateway, LlmMessage, MessageRole};
    pub use crate::repl::InteractiveLoop;
    pub use crate::response::{classify, ResearchResponse, ResponseKind};
    pub use crate::speech::{SpeechBridge, VoiceConfig};
}
