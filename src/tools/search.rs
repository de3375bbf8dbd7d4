//! Web search through DuckDuckGo's HTML endpoint.

use super::{string_arg, Tool};
use crate::config::SearchSettings;
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// The `search` tool.
pub struct WebSearch {
    client: reqwest::Client,
    max_results: usize,
    region: String,
    title_regex: Regex,
    snippet_regex: Regex,
    tag_regex: Regex,
}

impl WebSearch {
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            max_results: settings.max_results.max(1),
            region: settings.region.clone(),
            title_regex: Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#)
                .expect("Invalid regex"),
            snippet_regex: Regex::new(r#"(?s)<a[^>]*class="result__snippet"[^>]*>(.*?)</a>"#)
                .expect("Invalid regex"),
            tag_regex: Regex::new(r"<[^>]+>").expect("Invalid regex"),
        })
    }

    /// Search the web and format the hits as text for the model.
    pub async fn run(&self, query: &str) -> Result<String> {
        let hits = self.search(query).await?;
        Ok(format_hits(&hits))
    }

    /// Search the web and return structured hits.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let url = url::Url::parse_with_params(
            SEARCH_ENDPOINT,
            &[("q", query), ("kl", self.region.as_str())],
        )
        .map_err(|e| ScoutError::Tool(format!("Invalid search URL: {}", e)))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Provider(format!(
                "DuckDuckGo returned status {}",
                status
            )));
        }

        let html = response.text().await?;
        let hits = self.parse_results(&html);
        debug!("DuckDuckGo returned {} results for {:?}", hits.len(), query);
        Ok(hits)
    }

    /// Extract result titles, links and snippets from the results page.
    fn parse_results(&self, html: &str) -> Vec<SearchHit> {
        let titles: Vec<_> = self.title_regex.captures_iter(html).collect();
        let mut hits = Vec::new();

        for (i, caps) in titles.iter().enumerate() {
            if hits.len() >= self.max_results {
                break;
            }

            let (Some(whole), Some(href), Some(title)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };

            // The snippet belongs to this result if it precedes the next title.
            let block_end = titles
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(html.len());
            let snippet = self
                .snippet_regex
                .captures(&html[whole.end()..block_end])
                .and_then(|c| c.get(1))
                .map(|m| self.clean_text(m.as_str()))
                .unwrap_or_default();

            let link = decode_link(&html_decode(href.as_str()));
            let title = self.clean_text(title.as_str());

            if link.starts_with("http") && !title.is_empty() {
                hits.push(SearchHit {
                    title,
                    link,
                    snippet,
                });
            }
        }

        hits
    }

    fn clean_text(&self, fragment: &str) -> String {
        let text = self.tag_regex.replace_all(fragment, "");
        html_decode(text.trim())
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Use this tool to search the web for information"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
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

fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }

    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            if hit.snippet.is_empty() {
                format!("[{}] {}\nURL: {}", i + 1, hit.title, hit.link)
            } else {
                format!("[{}] {}\nURL: {}\n{}", i + 1, hit.title, hit.link, hit.snippet)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Resolve DuckDuckGo redirect links (`//duckduckgo.com/l/?uddg=...`) to the target URL.
fn decode_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    match url::Url::parse(&absolute) {
        Ok(parsed) if parsed.path().starts_with("/l/") => parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
            .unwrap_or(absolute),
        _ => absolute,
    }
}

/// Simple HTML entity decoding.
fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">Rust <b>Programming</b> Language</a>
  </h2>
  <a class="result__snippet" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F">A language empowering everyone to build <b>reliable</b> &amp; efficient software.</a>
</div>
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="https://doc.rust-lang.org/book/">The Rust Book</a>
  </h2>
</div>
<div class="result results_links results_links_deep web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="https://en.wikipedia.org/wiki/Rust_(programming_language)">Rust - Wikipedia</a>
  </h2>
  <a class="result__snippet" href="https://en.wikipedia.org/wiki/Rust_(programming_language)">Rust is a general-purpose programming language.</a>
</div>
"#;

    fn search_with_max(max_results: usize) -> WebSearch {
        WebSearch::new(&SearchSettings {
            max_results,
            ..SearchSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_parse_results() {
        let hits = search_with_max(5).parse_results(RESULTS_PAGE);
        assert_eq!(hits.len(), 3);

        assert_eq!(hits[0].title, "Rust Programming Language");
        assert_eq!(hits[0].link, "https://www.rust-lang.org/");
        assert_eq!(
            hits[0].snippet,
            "A language empowering everyone to build reliable & efficient software."
        );

        // The second result has no snippet; it must not steal the third one's.
        assert_eq!(hits[1].link, "https://doc.rust-lang.org/book/");
        assert_eq!(hits[1].snippet, "");
        assert_eq!(hits[2].snippet, "Rust is a general-purpose programming language.");
    }

    #[test]
    fn test_parse_results_respects_max() {
        let hits = search_with_max(2).parse_results(RESULTS_PAGE);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_parse_empty_page() {
        let hits = search_with_max(5).parse_results("<html><body>No results.</body></html>");
        assert!(hits.is_empty());
        assert_eq!(format_hits(&hits), NO_RESULTS);
    }

    #[test]
    fn test_format_hits() {
        let hits = vec![SearchHit {
            title: "Example".to_string(),
            link: "https://example.com".to_string(),
            snippet: "An example.".to_string(),
        }];
        assert_eq!(format_hits(&hits), "[1] Example\nURL: https://example.com\nAn example.");
    }

    #[test]
    fn test_decode_link() {
        assert_eq!(
            decode_link("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1&rut=x"),
            "https://example.com/a?b=1"
        );
        assert_eq!(decode_link("https://example.com/"), "https://example.com/");
    }

    #[tokio::test]
    async fn test_call_requires_query() {
        let tool = search_with_max(5);
        assert!(matches!(
            tool.call(&json!({"q": "wrong key"})).await,
            Err(ScoutError::Tool(_))
        ));
    }
}
