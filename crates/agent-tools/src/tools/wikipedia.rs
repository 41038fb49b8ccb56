//! Wikipedia tool using the MediaWiki APIs.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{unknown_function, FunctionSpec, Tool, ToolArgs};

const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "search_wikipedia",
        description: "Search Wikipedia article titles by keyword",
        params: "query (string, required), max_results (number, optional, default 5)",
    },
    FunctionSpec {
        name: "get_article_summary",
        description: "Get the lead summary of a Wikipedia article",
        params: "title (string, required)",
    },
    FunctionSpec {
        name: "get_article_content",
        description: "Get the full plain-text content of a Wikipedia article",
        params: "title (string, required), max_chars (number, optional, default 8000)",
    },
];

const DEFAULT_CONTENT_CHARS: usize = 8_000;

/// Wikipedia tool over the opensearch, REST summary, and extracts endpoints.
pub struct Wikipedia {
    client: reqwest::Client,
}

impl Wikipedia {
    /// Create a new Wikipedia tool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("llmflow/0.1 (https://example.org)")
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Value, ToolError> {
        let url = format!(
            "https://en.wikipedia.org/w/api.php?action=opensearch&format=json&limit={}&search={}",
            max_results,
            url::form_urlencoded::byte_serialize(query.as_bytes()).collect::<String>()
        );

        debug!("Searching Wikipedia: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Wikipedia API returned status {}",
                response.status()
            )));
        }

        // Opensearch replies with [query, [titles], [descriptions], [urls]].
        let data: Value = response.json().await?;
        let titles = data.get(1).and_then(|v| v.as_array()).cloned().unwrap_or_default();
        let urls = data.get(3).and_then(|v| v.as_array()).cloned().unwrap_or_default();

        let results: Vec<Value> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                json!({
                    "title": title,
                    "url": urls.get(i).cloned().unwrap_or(Value::Null),
                })
            })
            .collect();

        Ok(json!({ "query": query, "results": results }))
    }

    async fn article_summary(&self, title: &str) -> Result<Value, ToolError> {
        let url = format!(
            "https://en.wikipedia.org/api/rest_v1/page/summary/{}",
            url::form_urlencoded::byte_serialize(title.replace(' ', "_").as_bytes())
                .collect::<String>()
        );

        debug!("Fetching article summary: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Article not found: {}",
                title
            )));
        }

        let data: Value = response.json().await?;

        Ok(json!({
            "title": data.get("title").cloned().unwrap_or(Value::Null),
            "summary": data.get("extract").cloned().unwrap_or(Value::Null),
            "url": data.pointer("/content_urls/desktop/page").cloned().unwrap_or(Value::Null),
        }))
    }

    async fn article_content(&self, title: &str, max_chars: usize) -> Result<Value, ToolError> {
        let url = format!(
            "https://en.wikipedia.org/w/api.php?action=query&prop=extracts&explaintext=1&redirects=1&format=json&titles={}",
            url::form_urlencoded::byte_serialize(title.as_bytes()).collect::<String>()
        );

        debug!("Fetching article content: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Wikipedia API returned status {}",
                response.status()
            )));
        }

        // The extract lives under pages keyed by page id; missing titles
        // come back as a page with id "-1" and no extract.
        let data: Value = response.json().await?;
        let page = data
            .pointer("/query/pages")
            .and_then(|pages| pages.as_object())
            .and_then(|pages| pages.values().next())
            .ok_or_else(|| ToolError::ExecutionFailed(format!("Article not found: {}", title)))?;

        let extract = page
            .get("extract")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ToolError::ExecutionFailed(format!("Article not found: {}", title)))?;

        let (content, truncated) = clip_chars(extract, max_chars);

        Ok(json!({
            "title": page.get("title").cloned().unwrap_or_else(|| json!(title)),
            "content": content,
            "truncated": truncated,
        }))
    }
}

/// Clip text to at most `max_chars` characters on a char boundary.
fn clip_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

impl Default for Wikipedia {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for Wikipedia {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Searches Wikipedia and fetches article summaries or full text."
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "search_wikipedia" => {
                let query = args.get_string("query")?;
                let max_results = args.get_usize_or("max_results", 5);
                self.search(&query, max_results).await
            }
            "get_article_summary" => {
                let title = args.get_string("title")?;
                self.article_summary(&title).await
            }
            "get_article_content" => {
                let title = args.get_string("title")?;
                let max_chars = args.get_usize_or("max_chars", DEFAULT_CONTENT_CHARS);
                self.article_content(&title, max_chars).await
            }
            other => Err(unknown_function(self.name(), other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[tokio::test]
    async fn test_search_requires_query() {
        let wiki = Wikipedia::new();
        let result = wiki.call("search_wikipedia", ToolArgs::default()).await;
        assert!(matches!(result, Err(ToolError::MissingParameter(_))));
    }

    #[tokio::test]
    async fn test_summary_requires_title() {
        let wiki = Wikipedia::new();
        let result = wiki.call("get_article_summary", ToolArgs::default()).await;
        assert!(matches!(result, Err(ToolError::MissingParameter(_))));
    }

    #[tokio::test]
    async fn test_content_requires_title() {
        let wiki = Wikipedia::new();
        let result = wiki.call("get_article_content", ToolArgs::default()).await;
        assert!(matches!(result, Err(ToolError::MissingParameter(_))));
    }

    #[test]
    fn test_clip_chars_respects_boundaries() {
        assert_eq!(clip_chars("hello", 10), ("hello", false));
        assert_eq!(clip_chars("hello", 3), ("hel", true));
        // Multi-byte characters stay intact.
        assert_eq!(clip_chars("héllo", 2), ("hé", true));
    }

    #[tokio::test]
    #[ignore]
    async fn test_search_live() {
        let wiki = Wikipedia::new();
        let mut params = Map::new();
        params.insert("query".to_string(), json!("Rust programming language"));
        let result = wiki
            .call("search_wikipedia", ToolArgs::new(params))
            .await
            .unwrap();
        assert!(!result["results"].as_array().unwrap().is_empty());
    }
}
