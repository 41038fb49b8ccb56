//! Web search tool using the DuckDuckGo lite HTML endpoint.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{unknown_function, FunctionSpec, Tool, ToolArgs};

const FUNCTIONS: &[FunctionSpec] = &[FunctionSpec {
    name: "search_web",
    description: "Search the web and return result titles with links",
    params: "query (string, required), max_results (number, optional, default 5)",
}];

/// Web search over lite.duckduckgo.com, which serves plain HTML without
/// JavaScript. Result anchors carry `rel="nofollow"`, which is what the
/// extractor keys on.
pub struct Search {
    client: reqwest::Client,
}

impl Search {
    /// Create a new search tool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(
                    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
                )
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn search_web(&self, query: &str, max_results: usize) -> Result<Value, ToolError> {
        let url = format!(
            "https://lite.duckduckgo.com/lite/?q={}",
            url::form_urlencoded::byte_serialize(query.as_bytes()).collect::<String>()
        );

        debug!("Searching: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Search returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let results = extract_results(&body, max_results);

        Ok(json!({
            "query": query,
            "results": results,
        }))
    }
}

/// Extract up to `max` result anchors as {title, url} objects.
fn extract_results(html: &str, max: usize) -> Vec<Value> {
    let mut results = Vec::new();
    let mut rest = html;

    while results.len() < max {
        let Some(anchor) = rest.find("rel=\"nofollow\"") else {
            break;
        };

        // Walk back to the opening tag, forward to href and anchor text.
        let tag_start = match rest[..anchor].rfind("<a ") {
            Some(pos) => pos,
            None => break,
        };
        let Some(close) = rest[tag_start..].find('>') else {
            break;
        };
        let tag = &rest[tag_start..tag_start + close];
        let after_tag = &rest[tag_start + close + 1..];
        let Some(text_end) = after_tag.find("</a>") else {
            break;
        };

        let href = tag
            .split("href=\"")
            .nth(1)
            .and_then(|s| s.split('"').next())
            .unwrap_or("");
        let title = strip_tags(&after_tag[..text_end]);

        if !href.is_empty() && !title.is_empty() {
            results.push(json!({ "title": title, "url": href }));
        }

        rest = &after_tag[text_end..];
    }

    results
}

/// Remove nested markup (e.g. <b> highlights) from anchor text.
fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for Search {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Searches the web via DuckDuckGo and returns result titles with links."
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        match function {
            "search_web" => {
                let query = args.get_string("query")?;
                let max_results = args.get_usize_or("max_results", 5);
                self.search_web(&query, max_results).await
            }
            other => Err(unknown_function(self.name(), other)),
        }
    }
}
