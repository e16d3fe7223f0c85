use crate::error::{Result, Simple3Error};
use crate::llm::tools::{required_str_arg, LlmTool, ToolDescriptor};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

const BASE_URL: &str = "https://lite.duckduckgo.com/lite/";
const MAX_RESULTS: usize = 10;
const TIMEOUT_SECONDS: u64 = 10;
const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

/// A web search result from DuckDuckGo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The title of the search result
    pub title: String,
    /// The URL of the search result
    pub url: String,
    /// A snippet/description of the search result
    pub snippet: String,
}

/// Tool for searching the web using DuckDuckGo
///
/// Searches DuckDuckGo's lite endpoint, which needs no API key, and hands the agent a
/// plain-text digest of the organic results. Network and provider failures come back
/// as text so the model can explain them to the user.
#[derive(Clone)]
pub struct WebSearchTool {
    client: reqwest::Client,
    base_url: String,
}

impl WebSearchTool {
    /// Creates a new WebSearchTool instance
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(TIMEOUT_SECONDS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the tool at a different search endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Perform the web search
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!("{}?q={}", self.base_url, urlencoding::encode(query));
        debug!(url = %url, "Searching DuckDuckGo");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Simple3Error::ApiError(format!(
                "HTTP request failed with status {}",
                response.status()
            )));
        }

        let html = response.text().await?;

        Self::parse_results(&html)
    }

    /// Parse HTML results from DuckDuckGo lite
    fn parse_results(html: &str) -> Result<Vec<SearchResult>> {
        let document = Html::parse_document(html);

        let link_selector = Selector::parse("a.result-link")
            .map_err(|e| Simple3Error::ToolError(format!("Invalid selector: {:?}", e)))?;
        let snippet_selector = Selector::parse("td.result-snippet")
            .map_err(|e| Simple3Error::ToolError(format!("Invalid selector: {:?}", e)))?;

        let links: Vec<_> = document.select(&link_selector).collect();
        let snippets: Vec<_> = document.select(&snippet_selector).collect();

        let mut results = Vec::new();
        for (i, link) in links.iter().take(MAX_RESULTS).enumerate() {
            if let Some(href) = link.value().attr("href") {
                let title = link.text().collect::<Vec<_>>().join(" ");
                let snippet = snippets
                    .get(i)
                    .map(|s| Self::clean_text(&s.text().collect::<Vec<_>>().join(" ")))
                    .unwrap_or_default();

                results.push(SearchResult {
                    title: Self::clean_text(&title),
                    url: Self::decode_url(href),
                    snippet,
                });
            }
        }

        Ok(results)
    }

    /// Decode DuckDuckGo redirect URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com`
    fn decode_url(url: &str) -> String {
        if url.contains("uddg=") {
            url.split("uddg=")
                .nth(1)
                .and_then(|s| s.split('&').next())
                .map(|s| urlencoding::decode(s).unwrap_or_default().to_string())
                .unwrap_or_else(|| url.to_string())
        } else {
            url.to_string()
        }
    }

    /// Collapse whitespace and decode the common HTML entities
    fn clean_text(text: &str) -> String {
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

        text.replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
    }

    /// Render results as the text digest handed to the model
    fn digest(results: &[SearchResult]) -> String {
        if results.is_empty() {
            return NO_RESULTS.to_string();
        }

        results
            .iter()
            .map(|r| {
                if r.snippet.is_empty() {
                    format!("{} ({})", r.title, r.url)
                } else {
                    format!("{}: {} ({})", r.title, r.snippet, r.url)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmTool for WebSearchTool {
    async fn run(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let query = required_str_arg(args, "query")?;

        match self.search(query).await {
            Ok(results) => Ok(json!(Self::digest(&results))),
            Err(e) => {
                warn!(error = %e, "Web search failed");
                Ok(json!(format!("Search failed: {}", e)))
            }
        }
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::text_function(
            "DuckDuckGo_Search",
            "A wrapper around DuckDuckGo Search. Useful for when you need to answer questions about current events. Input should be a search query.",
            "query",
            "The search query",
        )
    }

    fn clone_box(&self) -> Box<dyn LlmTool> {
        Box::new(self.clone())
    }
}
