//! Keyless search by scraping DuckDuckGo's HTML endpoint.
//!
//! The HTML results page marks each hit with a `result__a` anchor (title and redirect link)
//! and a `result__snippet` element inside a `<div class="result ...">` wrapper. The page is
//! cut into one block per wrapper and both parts are extracted from that block with regular
//! expressions; redirect links of the form `//duckduckgo.com/l/?uddg=<encoded>` are unwrapped
//! to the target URL.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::{summarize_hits, truncate_chars, SearchError, SearchHit, SearchProvider};
use crate::roundtable::http_client_pool::get_http_client;

pub const DUCKDUCKGO_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Snippets longer than this are cut.
pub const MAX_SNIPPET_CHARS: usize = 300;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) roundtable/0.1";

lazy_static! {
    // Outer wrapper of one hit; `result__body` and `web-result` do not match
    static ref RESULT_RE: Regex =
        Regex::new(r#"<div\b[^>]*\bclass="(?:[^"]*\s)?result(?:\s[^"]*)?""#).expect("result regex");
    static ref TITLE_RE: Regex =
        Regex::new(r#"(?s)<a\b([^>]*\bclass="[^"]*\bresult__a\b[^"]*"[^>]*)>(.*?)</a>"#)
            .expect("title regex");
    static ref SNIPPET_RE: Regex = Regex::new(
        r#"(?s)<(a|div|td)\b[^>]*\bclass="[^"]*\bresult__snippet\b[^"]*"[^>]*>(.*?)</(?:a|div|td)>"#
    )
    .expect("snippet regex");
    static ref HREF_RE: Regex = Regex::new(r#"\bhref="([^"]*)""#).expect("href regex");
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").expect("tag regex");
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").expect("whitespace regex");
}

pub struct DuckDuckGoClient {
    http: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoClient {
    pub fn new() -> Self {
        Self::new_with_endpoint(DUCKDUCKGO_ENDPOINT)
    }

    pub fn new_with_endpoint(endpoint: &str) -> Self {
        DuckDuckGoClient {
            http: get_http_client(endpoint),
            endpoint: endpoint.to_string(),
        }
    }
}

impl Default for DuckDuckGoClient {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Strip markup, decode entities and collapse whitespace.
fn html_to_text(fragment: &str) -> String {
    let text = TAG_RE.replace_all(fragment, "");
    let text = decode_entities(&text);
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Unwrap a DuckDuckGo redirect link to its target.
pub fn resolve_link(href: &str) -> String {
    let href = decode_entities(href);
    if let Some(start) = href.find("uddg=") {
        let encoded = href[start + "uddg=".len()..]
            .split('&')
            .next()
            .unwrap_or_default();
        if let Ok(target) = urlencoding::decode(encoded) {
            return target.into_owned();
        }
    }
    match href.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => href,
    }
}

/// Split the page into one slice per result.
///
/// Blocks start at each `<div class="result ...">`. Pages without those wrappers fall back to
/// one block per title anchor.
fn result_blocks(html: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = RESULT_RE.find_iter(html).map(|m| m.start()).collect();
    if starts.is_empty() {
        starts = TITLE_RE.find_iter(html).map(|m| m.start()).collect();
    }
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(html.len());
            &html[start..end]
        })
        .collect()
}

/// Extract hits from a DuckDuckGo HTML results page, skipping sponsored entries.
///
/// Title and snippet are taken from the same result block, so a hit without a snippet gets
/// `No description` rather than its neighbour's text.
pub fn parse_results(html: &str) -> Vec<SearchHit> {
    result_blocks(html)
        .into_iter()
        .filter_map(|block| {
            let title = TITLE_RE.captures(block)?;
            let href = HREF_RE.captures(&title[1])?.get(1)?.as_str();
            let link = resolve_link(href);
            if link.contains("duckduckgo.com/y.js") {
                return None;
            }
            let snippet = SNIPPET_RE
                .captures(block)
                .map(|caps| html_to_text(&caps[2]))
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| "No description".to_string());
            Some(SearchHit {
                title: html_to_text(&title[2]),
                link,
                snippet: truncate_chars(&snippet, MAX_SNIPPET_CHARS),
            })
        })
        .collect()
}

#[async_trait]
impl SearchProvider for DuckDuckGoClient {
    fn backend_name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<String, SearchError> {
        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));
        log::debug!("DuckDuckGoClient::search({:?})", query);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(SearchError::Http {
                status: status.as_u16(),
                body: truncate_chars(&body, 200),
            });
        }

        Ok(summarize_hits(&parse_results(&body), "No search results found."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="result results_links web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/y.js?ad_provider=x&amp;u3=1">Sponsored</a>
  </h2>
  <a class="result__snippet" href="//duckduckgo.com/y.js">Buy now</a>
</div>
<div class="result results_links web-result">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">Rust <b>Programming</b> Language</a>
  </h2>
  <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">A language empowering everyone to build
     reliable &amp; efficient software.</a>
</div>
<div class="result results_links web-result">
  <h2 class="result__title">
    <a rel="nofollow" href="https://doc.rust-lang.org/book/" class="result__a">The Book</a>
  </h2>
  <a class="result__snippet" href="https://doc.rust-lang.org/book/">Learn &#x27;Rust&#x27;.</a>
</div>
"#;

    #[test]
    fn extracts_titles_links_and_snippets() {
        let hits = parse_results(PAGE);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Rust Programming Language");
        assert_eq!(hits[0].link, "https://www.rust-lang.org/");
        assert_eq!(
            hits[0].snippet,
            "A language empowering everyone to build reliable & efficient software."
        );
        assert_eq!(hits[1].link, "https://doc.rust-lang.org/book/");
        assert_eq!(hits[1].snippet, "Learn 'Rust'.");
    }

    const PAGE_WITH_MISSING_SNIPPETS: &str = r#"
<div class="result results_links result--ad">
  <a class="result__a" href="//duckduckgo.com/y.js?ad_provider=x">Sponsored</a>
</div>
<div class="result results_links web-result">
  <div class="links_main result__body">
    <h2 class="result__title"><a class="result__a" href="https://a.example/">Site A</a></h2>
  </div>
</div>
<div class="result results_links web-result">
  <div class="links_main result__body">
    <h2 class="result__title"><a class="result__a" href="https://b.example/">Site B</a></h2>
    <a class="result__snippet" href="https://b.example/">snippet of B</a>
  </div>
</div>
"#;

    #[test]
    fn snippets_stay_with_their_own_result() {
        let hits = parse_results(PAGE_WITH_MISSING_SNIPPETS);
        assert_eq!(
            hits,
            vec![
                SearchHit {
                    title: "Site A".into(),
                    link: "https://a.example/".into(),
                    snippet: "No description".into(),
                },
                SearchHit {
                    title: "Site B".into(),
                    link: "https://b.example/".into(),
                    snippet: "snippet of B".into(),
                },
            ]
        );
    }

    #[test]
    fn anchors_without_wrappers_are_still_found() {
        let html = r#"<a class="result__a" href="https://a.example/">A</a>
<a class="result__snippet">about A</a>
<a class="result__a" href="https://b.example/">B</a>"#;
        let hits = parse_results(html);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].snippet, "about A");
        assert_eq!(hits[1].snippet, "No description");
    }

    #[test]
    fn page_without_results_is_empty() {
        assert!(parse_results("<html><body>No results.</body></html>").is_empty());
    }

    #[test]
    fn protocol_relative_links_get_https() {
        assert_eq!(resolve_link("//example.com/a"), "https://example.com/a");
    }
}
