use crate::error::{Result, Simple3Error};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Descriptor for tool function parameters
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    pub r#type: String,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Descriptor for a text-in/text-out tool taking one required string argument.
    pub fn text_function(
        name: impl Into<String>,
        description: impl Into<String>,
        arg: &str,
        arg_description: &str,
    ) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: name.into(),
                description: description.into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        arg: {
                            "type": "string",
                            "description": arg_description
                        }
                    },
                    "required": [arg]
                }),
            },
        }
    }
}

/// Trait for LLM tools
///
/// Tools speak text: `run` returns a JSON string value the agent feeds back to the
/// model. Provider failures are reported inside that text; `Err` is reserved for
/// malformed arguments.
#[async_trait]
pub trait LlmTool: Send + Sync {
    /// Execute the tool with given arguments
    async fn run(&self, args: &HashMap<String, Value>) -> Result<Value>;

    /// Get tool descriptor for LLM
    fn descriptor(&self) -> ToolDescriptor;

    /// Check if this tool matches the given name
    fn matches(&self, name: &str) -> bool {
        self.descriptor().function.name == name
    }

    /// Clone the tool into a Box
    fn clone_box(&self) -> Box<dyn LlmTool>;
}

impl Clone for Box<dyn LlmTool> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Fetch a required, non-empty string argument.
pub fn required_str_arg<'a>(args: &'a HashMap<String, Value>, name: &str) -> Result<&'a str> {
    let value = args.get(name).and_then(|v| v.as_str()).ok_or_else(|| {
        Simple3Error::InvalidArgument(format!("{} parameter is required", name))
    })?;

    if value.trim().is_empty() {
        return Err(Simple3Error::InvalidArgument(format!("{} parameter cannot be empty", name)));
    }

    Ok(value)
}
