pub mod openai;
pub mod openai_messages_adapter;

pub use openai::{OpenAIConfig, OpenAIGateway, GEMINI_OPENAI_BASE_URL};
