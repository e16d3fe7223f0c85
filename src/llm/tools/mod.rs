pub mod save_content_tool;
mod tool;
pub mod web_search_tool;
pub mod wikipedia_tool;

pub use save_content_tool::SaveContentTool;
pub use tool::{required_str_arg, FunctionDescriptor, LlmTool, ToolDescriptor};
pub use web_search_tool::WebSearchTool;
pub use wikipedia_tool::WikipediaTool;

use std::path::PathBuf;

/// The assistant's tool set: web search, encyclopedia lookup and file save.
pub fn default_tools(save_dir: impl Into<PathBuf>) -> Vec<Box<dyn LlmTool>> {
    vec![
        Box::new(WebSearchTool::new()),
        Box::new(WikipediaTool::new()),
        Box::new(SaveContentTool::new(save_dir)),
    ]
}
