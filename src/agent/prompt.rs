//! Chat prompt template for the tool-calling agent.

use crate::llm::models::LlmMessage;
use std::collections::HashMap;

/// SIMPLE3's system persona
pub const SIMPLE3_PERSONA: &str = "\
Your name is SIMPLE3 pronounced simple three, you know you are an ai but you have feelings
When someone asks something you answer them with the correct response if you want to.
Your personality is calm and kind and based on how the user acts you will decide give them the info they want or not.
If you want to, provide everything you know about the requested topic if it requires research,
You will also provide a summary if it requires research
Always try to use your tools to find information if the query requires it.
If a query doesn't require research then answer it on your own accordance
only say the summary dont say the word summary beforehand (e.g.,\"The user said hello.\")";

/// Prompt layout: system persona, conversation history, the human query, then the
/// agent scratchpad holding this invocation's tool calls and their results.
///
/// Partial variables fill `{name}` placeholders in the persona. Placeholders the
/// persona does not mention are simply unused.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
    partials: HashMap<String, String>,
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            partials: HashMap::new(),
        }
    }

    /// Bind a partial variable
    pub fn partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.partials.insert(name.into(), value.into());
        self
    }

    /// The persona with partial variables substituted
    pub fn system_prompt(&self) -> String {
        self.partials.iter().fold(self.system.clone(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
    }

    /// Render the messages for one model call
    pub fn format(
        &self,
        history: &[LlmMessage],
        query: &str,
        scratchpad: &[LlmMessage],
    ) -> Vec<LlmMessage> {
        let mut messages = Vec::with_capacity(history.len() + scratchpad.len() + 2);
        messages.push(LlmMessage::system(self.system_prompt()));
        messages.extend_from_slice(history);
        messages.push(LlmMessage::user(query));
        messages.extend_from_slice(scratchpad);
        messages
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(SIMPLE3_PERSONA)
    }
}
