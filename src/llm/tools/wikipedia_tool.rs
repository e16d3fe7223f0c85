use crate::error::{Result, Simple3Error};
use crate::llm::tools::{required_str_arg, LlmTool, ToolDescriptor};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

const API_URL: &str = "https://en.wikipedia.org/w/api.php";
const TIMEOUT_SECONDS: u64 = 10;
const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

/// Number of pages summarized per lookup
pub const DEFAULT_TOP_K: usize = 1;
/// Character budget for the returned text
pub const DEFAULT_MAX_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    index: usize,
    #[serde(default)]
    extract: String,
}

/// Tool for looking up encyclopedia summaries on Wikipedia
///
/// Uses the MediaWiki action API with a search generator so that a single request
/// returns both the best matching titles and their plain-text intro extracts.
#[derive(Clone)]
pub struct WikipediaTool {
    client: reqwest::Client,
    api_url: String,
    top_k: usize,
    max_chars: usize,
}

impl WikipediaTool {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(TIMEOUT_SECONDS))
            .user_agent(concat!("simple3/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_url: API_URL.to_string(),
            top_k: DEFAULT_TOP_K,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    /// Point the tool at a different MediaWiki `api.php`
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_limits(mut self, top_k: usize, max_chars: usize) -> Self {
        self.top_k = top_k.max(1);
        self.max_chars = max_chars;
        self
    }

    /// Look up `query` and return the formatted, truncated summary text
    pub async fn lookup(&self, query: &str) -> Result<String> {
        let limit = self.top_k.to_string();
        debug!(query = query, limit = %limit, "Querying Wikipedia");

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Simple3Error::ApiError(format!(
                "Wikipedia request failed with status {}",
                response.status()
            )));
        }

        let body: QueryResponse = response.json().await?;
        let mut pages = body.query.map(|q| q.pages).unwrap_or_default();
        pages.sort_by_key(|p| p.index);

        let summaries: Vec<String> = pages
            .iter()
            .take(self.top_k)
            .filter(|p| !p.extract.trim().is_empty())
            .map(|p| format!("Page: {}\nSummary: {}", p.title, p.extract.trim()))
            .collect();

        if summaries.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        Ok(truncate_chars(&summaries.join("\n\n"), self.max_chars))
    }
}

impl Default for WikipediaTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep at most `max` characters, never splitting a UTF-8 sequence
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[async_trait]
impl LlmTool for WikipediaTool {
    async fn run(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let query = required_str_arg(args, "query")?;

        match self.lookup(query).await {
            Ok(text) => Ok(json!(text)),
            Err(e) => {
                warn!(error = %e, "Wikipedia lookup failed");
                Ok(json!(format!("Wikipedia lookup failed: {}", e)))
            }
        }
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::text_function(
            "wikipedia",
            "A wrapper around Wikipedia. Useful for when you need to answer general questions about people, places, companies, facts, historical events, or other subjects. Input should be a search query.",
            "query",
            "The search query",
        )
    }

    fn clone_box(&self) -> Box<dyn LlmTool> {
        Box::new(self.clone())
    }
}
