use crate::error::{Result, Simple3Error};
use crate::llm::tools::{LlmTool, ToolDescriptor};
use async_trait::async_trait;
use chrono::Local;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Tool that writes text content to a timestamp-named file.
///
/// Files are named `saved_content_<YYYYMMDD_HHMMSS>.txt`. Two saves within the same
/// second target the same file and the later one wins.
#[derive(Debug, Clone)]
pub struct SaveContentTool {
    dir: PathBuf,
}

impl SaveContentTool {
    /// Save into `dir`, usually the working directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Filename for a save happening now
    pub fn timestamped_filename() -> String {
        format!("saved_content_{}.txt", Local::now().format("%Y%m%d_%H%M%S"))
    }

    /// Write `content` and return the path written
    pub fn save(&self, content: &str) -> Result<PathBuf> {
        let path = self.dir.join(Self::timestamped_filename());

        // the handle is closed when `file` drops, on both paths
        let mut file = File::create(&path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        Ok(path)
    }

    /// How a saved path is reported: bare file name for the working directory
    fn shown_path(&self, path: &Path) -> String {
        match path.file_name() {
            Some(name) if self.dir == Path::new(".") => name.to_string_lossy().into_owned(),
            _ => path.display().to_string(),
        }
    }
}

impl Default for SaveContentTool {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl LlmTool for SaveContentTool {
    async fn run(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let content = args.get("content").and_then(|v| v.as_str()).ok_or_else(|| {
            Simple3Error::InvalidArgument("content parameter is required".to_string())
        })?;

        match self.save(content) {
            Ok(path) => {
                info!(path = %path.display(), bytes = content.len(), "Saved content");
                Ok(json!(format!("Content successfully saved to {}", self.shown_path(&path))))
            }
            Err(e) => {
                warn!(error = %e, "Saving content failed");
                Ok(json!(format!("Error saving content: {}", e)))
            }
        }
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::text_function(
            "Save_Content",
            "Use this tool to save important text content to a file. Input should be the content to save.",
            "content",
            "The text content to save",
        )
    }

    fn clone_box(&self) -> Box<dyn LlmTool> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use tempfile::TempDir;

    #[test]
    fn test_timestamped_filename_pattern() {
        let re = Regex::new(r"^saved_content_\d{8}_\d{6}\.txt$").unwrap();
        assert!(re.is_match(&SaveContentTool::timestamped_filename()));
    }

    #[test]
    fn test_save_round_trip_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let tool = SaveContentTool::new(dir.path());
        let content = "Paris is the capital of France.\nÀ bientôt! \u{1F1EB}\u{1F1F7}\n\n  trailing  ";

        let path = tool.save(content).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), content.as_bytes());
        assert_eq!(path.parent().unwrap(), dir.path());
    }

    #[tokio::test]
    async fn test_run_confirms_save() {
        let dir = TempDir::new().unwrap();
        let tool = SaveContentTool::new(dir.path());
        let mut args = HashMap::new();
        args.insert("content".to_string(), json!("notes"));

        let result = tool.run(&args).await.unwrap();
        let text = result.as_str().unwrap();

        assert!(text.starts_with("Content successfully saved to "));
        let saved = text.trim_start_matches("Content successfully saved to ");
        assert_eq!(std::fs::read_to_string(saved).unwrap(), "notes");
    }

    #[test]
    fn test_shown_path_in_working_directory_is_file_name() {
        let tool = SaveContentTool::default();
        let path = Path::new(".").join("saved_content_20261016_104923.txt");

        assert_eq!(tool.shown_path(&path), "saved_content_20261016_104923.txt");
    }

    #[test]
    fn test_shown_path_elsewhere_is_full_path() {
        let tool = SaveContentTool::new("/tmp/notes");
        let path = Path::new("/tmp/notes/saved_content_20261016_104923.txt");

        assert_eq!(tool.shown_path(path), "/tmp/notes/saved_content_20261016_104923.txt");
    }

    #[tokio::test]
    async fn test_run_converts_write_failure_to_text() {
        let dir = TempDir::new().unwrap();
        let tool = SaveContentTool::new(dir.path().join("missing").join("nested"));
        let mut args = HashMap::new();
        args.insert("content".to_string(), json!("notes"));

        let result = tool.run(&args).await.unwrap();
        assert!(result.as_str().unwrap().starts_with("Error saving content: "));
    }

    #[tokio::test]
    async fn test_run_accepts_empty_content() {
        let dir = TempDir::new().unwrap();
        let tool = SaveContentTool::new(dir.path());
        let mut args = HashMap::new();
        args.insert("content".to_string(), json!(""));

        let result = tool.run(&args).await.unwrap();
        assert!(result.as_str().unwrap().starts_with("Content successfully saved to "));
    }

    #[tokio::test]
    async fn test_run_missing_content() {
        let tool = SaveContentTool::default();
        let err = tool.run(&HashMap::new()).await.unwrap_err();
        assert!(err.to_string().contains("content parameter is required"));
    }

    #[test]
    fn test_descriptor() {
        let descriptor = SaveContentTool::default().descriptor();
        assert_eq!(descriptor.function.name, "Save_Content");
        assert_eq!(descriptor.function.parameters["required"][0], "content");
    }
}
