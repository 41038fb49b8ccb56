//! News tool over public RSS feeds.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tool::{unknown_function, FunctionSpec, Tool, ToolArgs};

const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        name: "get_headlines",
        description: "Get current headlines for a category",
        params: "category (string, optional: top/world/business/technology/science), \
                 max_results (number, optional, default 5)",
    },
    FunctionSpec {
        name: "search_news",
        description: "Search recent news articles by keyword",
        params: "query (string, required), max_results (number, optional, default 5)",
    },
];

/// Category to feed URL mapping. First reachable feed wins.
const CATEGORY_FEEDS: &[(&str, &[&str])] = &[
    (
        "top",
        &[
            "https://feeds.bbci.co.uk/news/rss.xml",
            "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml",
        ],
    ),
    (
        "world",
        &[
            "https://feeds.bbci.co.uk/news/world/rss.xml",
            "https://rss.nytimes.com/services/xml/rss/nyt/World.xml",
        ],
    ),
    (
        "business",
        &[
            "https://feeds.bbci.co.uk/news/business/rss.xml",
            "https://rss.nytimes.com/services/xml/rss/nyt/Business.xml",
        ],
    ),
    (
        "technology",
        &[
            "https://feeds.bbci.co.uk/news/technology/rss.xml",
            "https://rss.nytimes.com/services/xml/rss/nyt/Technology.xml",
        ],
    ),
    (
        "science",
        &[
            "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml",
            "https://rss.nytimes.com/services/xml/rss/nyt/Science.xml",
        ],
    ),
];

/// News tool that reads public RSS feeds (BBC, NYT, Google News).
///
/// RSS items are extracted with a lightweight tag scan instead of a full
/// XML parser; the feeds involved are well-formed enough for that.
pub struct News {
    client: reqwest::Client,
}

impl News {
    /// Create a new news tool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("llmflow/0.1")
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn fetch_feed(&self, url: &str) -> Result<String, ToolError> {
        debug!("Fetching RSS feed: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Feed returned status {}",
                response.status()
            )));
        }
        Ok(response.text().await?)
    }

    async fn get_headlines(&self, category: &str, max_results: usize) -> Result<Value, ToolError> {
        let feeds = CATEGORY_FEEDS
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, feeds)| *feeds)
            .ok_or_else(|| ToolError::InvalidParameter {
                name: "category".to_string(),
                reason: format!(
                    "unknown category '{}', expected one of: {}",
                    category,
                    CATEGORY_FEEDS
                        .iter()
                        .map(|(name, _)| *name)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })?;

        let mut last_error = None;
        for feed_url in feeds {
            match self.fetch_feed(feed_url).await {
                Ok(body) => {
                    let items = extract_items(&body, max_results);
                    if !items.is_empty() {
                        return Ok(json!({
                            "category": category,
                            "source": feed_url,
                            "articles": items,
                        }));
                    }
                }
                Err(e) => {
                    warn!("Feed {} failed: {}", feed_url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ToolError::ExecutionFailed("No articles found".to_string())))
    }

    async fn search_news(&self, query: &str, max_results: usize) -> Result<Value, ToolError> {
        let url = format!(
            "https://news.google.com/rss/search?q={}",
            url::form_urlencoded::byte_serialize(query.as_bytes()).collect::<String>()
        );

        let body = self.fetch_feed(&url).await?;
        let items = extract_items(&body, max_results);

        Ok(json!({
            "query": query,
            "articles": items,
        }))
    }
}

/// Extract up to `max` RSS items as {title, link, published} objects.
fn extract_items(xml: &str, max: usize) -> Vec<Value> {
    let mut items = Vec::new();
    let mut rest = xml;

    while items.len() < max {
        let Some(start) = rest.find("<item>") else {
            break;
        };
        let Some(end) = rest[start..].find("</item>") else {
            break;
        };
        let item = &rest[start..start + end];

        let title = tag_text(item, "title");
        let link = tag_text(item, "link");
        let published = tag_text(item, "pubDate");

        if let Some(title) = title {
            items.push(json!({
                "title": title,
                "link": link,
                "published": published,
            }));
        }

        rest = &rest[start + end + "</item>".len()..];
    }

    items
}

/// Extract the text of the first `<tag>...</tag>` pair, stripping CDATA.
fn tag_text(fragment: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let start = fragment.find(&open)? + open.len();
    let end = fragment[start..].find(&close)?;
    let raw = fragment[start..start + end].trim();

    let text = raw
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
        .unwrap_or(raw);

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

impl Default for News {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for News {
    fn name(&self) -> &str {
        "news"
    }

    fn description(&self) -> &str {
        "Fetches news headlines by category and searches recent articles by keyword."
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    async fn call(&self, function: &str, args: ToolArgs) -> Result<Value, ToolError> {
        let max_results = args.get_usize_or("max_results", 5);
        match function {
            "get_headlines" => {
                let category = args
                    .get_string_opt("category")
                    .unwrap_or_else(|| "top".to_string());
                self.get_headlines(&category.to_lowercase(), max_results).await
            }
            "search_news" => {
                let query = args.get_string("query")?;
                self.search_news(&query, max_results).await
            }
            other => Err(unknown_function(self.name(), other)),
        }
    }
}
