//! Encyclopedia lookup through the MediaWiki API.

use super::{string_arg, Tool};
use crate::config::WikipediaSettings;
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "scout/0.1 (https://github.com/smebbs/scout)";
const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

/// MediaWiki limits search strings to 300 characters.
const MAX_QUERY_CHARS: usize = 300;

/// The `wikipedia` tool.
pub struct WikipediaLookup {
    client: reqwest::Client,
    top_k_results: usize,
    doc_content_chars_max: usize,
    lang: String,
}

impl WikipediaLookup {
    pub fn new(settings: &WikipediaSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            top_k_results: settings.top_k_results.max(1),
            doc_content_chars_max: settings.doc_content_chars_max,
            lang: settings.lang.clone(),
        })
    }

    /// Look up a query and return at most `doc_content_chars_max` characters of summary.
    pub async fn run(&self, query: &str) -> Result<String> {
        let query: String = query.chars().take(MAX_QUERY_CHARS).collect();
        let titles = self.search_titles(&query).await?;

        let mut pages = Vec::new();
        for title in titles.iter().take(self.top_k_results) {
            if let Some(extract) = self.fetch_extract(title).await? {
                pages.push(format_page(title, &extract));
            }
        }

        debug!("Wikipedia returned {} page(s) for {:?}", pages.len(), query);

        if pages.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        Ok(truncate_chars(&pages.join("\n\n"), self.doc_content_chars_max))
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.top_k_results.to_string();
        let body = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("srprop", ""),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;
        Ok(parse_search_titles(&body))
    }

    async fn fetch_extract(&self, title: &str) -> Result<Option<String>> {
        let body = self
            .get(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;
        Ok(parse_extract(&body))
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<Value> {
        let endpoint = format!("https://{}.wikipedia.org/w/api.php", self.lang);
        let url = url::Url::parse_with_params(&endpoint, params)
            .map_err(|e| ScoutError::Tool(format!("Invalid Wikipedia URL: {}", e)))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Provider(format!(
                "Wikipedia returned status {}",
                status
            )));
        }

        let body: Value = response.json().await?;
        if let Some(error) = body.get("error") {
            return Err(ScoutError::Provider(format!("Wikipedia API error: {}", error)));
        }
        Ok(body)
    }
}

#[async_trait]
impl Tool for WikipediaLookup {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for when you need to answer general questions about \
         people, places, companies, facts, historical events, or other subjects. \
         Input should be a search query."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Topic to look up on Wikipedia"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, input: &Value) -> Result<String> {
        let query = string_arg(input, "query", self.name())?;
        self.run(&query).await
    }
}

fn parse_search_titles(body: &Value) -> Vec<String> {
    body["query"]["search"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter_map(|r| r["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_extract(body: &Value) -> Option<String> {
    body["query"]["pages"]
        .as_array()?
        .iter()
        .filter(|page| !page["missing"].as_bool().unwrap_or(false))
        .find_map(|page| page["extract"].as_str())
        .map(|extract| extract.trim().to_string())
        .filter(|extract| !extract.is_empty())
}

fn format_page(title: &str, extract: &str) -> String {
    format!("Page: {}\nSummary: {}", title, extract)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
