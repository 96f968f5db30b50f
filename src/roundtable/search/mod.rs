//! Web lookups requested by agents.
//!
//! An agent asks for a lookup by opening its reply with [`SEARCH_SENTINEL`]. The text after
//! the sentinel up to the first newline is the query; whatever follows is what the agent
//! "then said". The dispatcher in [`crate::discussion`] runs the query through a
//! [`SearchProvider`] and folds the summary back into the visible reply with
//! [`render_search_response`].
//!
//! ```rust
//! use roundtable::search::{render_search_response, SearchRequest};
//!
//! let request = SearchRequest::parse("SEARCH: Nvidia AI market share\nBig numbers.").unwrap();
//! assert_eq!(request.query, "Nvidia AI market share");
//! assert_eq!(request.remainder, "Big numbers.");
//!
//! let shown = render_search_response("Luna (LLaMA)", &request.query, "80%", &request.remainder);
//! assert_eq!(shown, "Luna (LLaMA) searched 'Nvidia AI market share': 80%\nThen said: Big numbers.");
//!
//! assert!(SearchRequest::parse("No lookup needed.").is_none());
//! ```

pub mod duckduckgo;
pub mod serpapi;

use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Literal prefix that turns a reply into a lookup request.
pub const SEARCH_SENTINEL: &str = "SEARCH:";

/// Shown as the agent's follow-up when nothing came after the query.
pub const SEARCH_FILLER: &str = "Interesting info!";

/// Number of hits folded into a summary.
pub const MAX_SEARCH_RESULTS: usize = 2;

/// A lookup extracted from an agent reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub remainder: String,
}

impl SearchRequest {
    /// Returns `None` unless `text` starts with [`SEARCH_SENTINEL`].
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix(SEARCH_SENTINEL)?;
        let (query, remainder) = rest.split_once('\n').unwrap_or((rest, ""));
        Some(SearchRequest {
            query: query.trim().to_string(),
            remainder: remainder.trim().to_string(),
        })
    }
}

/// Rebuild the visible reply of an agent that performed a lookup.
pub fn render_search_response(
    agent_name: &str,
    query: &str,
    summary: &str,
    remainder: &str,
) -> String {
    let remainder = match remainder.trim() {
        "" => SEARCH_FILLER,
        said => said,
    };
    format!(
        "{} searched '{}': {}\nThen said: {}",
        agent_name, query, summary, remainder
    )
}

/// One search engine hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn to_markdown(&self) -> String {
        format!("**[{}]({})**\n{}\n\n", self.title, self.link, self.snippet)
    }
}

/// Summarise the first [`MAX_SEARCH_RESULTS`] hits, or return `empty_message`.
pub fn summarize_hits(hits: &[SearchHit], empty_message: &str) -> String {
    let summary: String = hits
        .iter()
        .take(MAX_SEARCH_RESULTS)
        .map(SearchHit::to_markdown)
        .collect();
    if summary.is_empty() {
        empty_message.to_string()
    } else {
        summary
    }
}

/// Truncate to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

/// Which search provider the panel uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchBackend {
    /// Key-based Google results through SerpAPI.
    #[default]
    SerpApi,
    /// Scraped DuckDuckGo HTML results, no key needed.
    DuckDuckGo,
}

impl SearchBackend {
    pub fn requires_api_key(&self) -> bool {
        matches!(self, SearchBackend::SerpApi)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchBackend::SerpApi => "serpapi",
            SearchBackend::DuckDuckGo => "duckduckgo",
        }
    }
}

impl fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serpapi" | "google" => Ok(SearchBackend::SerpApi),
            "duckduckgo" | "ddg" => Ok(SearchBackend::DuckDuckGo),
            other => Err(other.to_string()),
        }
    }
}

/// Failure of a single lookup. Rendered inline as `Search failed: …`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchError {
    MissingApiKey,
    EmptyQuery,
    Transport(String),
    Http { status: u16, body: String },
    Decode(String),
    /// The provider answered but reported an error in the body.
    Api(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::MissingApiKey => write!(f, "SerpAPI key not provided."),
            SearchError::EmptyQuery => write!(f, "empty query"),
            SearchError::Transport(msg) => write!(f, "transport error: {}", msg),
            SearchError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            SearchError::Decode(msg) => write!(f, "malformed response: {}", msg),
            SearchError::Api(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for SearchError {}

/// A web search backend returning a short plain-text summary.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn backend_name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<String, SearchError>;
}
