//! Key-based Google search through SerpAPI.

use async_trait::async_trait;
use serde_json::Value;

use super::{summarize_hits, SearchError, SearchHit, SearchProvider, MAX_SEARCH_RESULTS};
use crate::roundtable::http_client_pool::get_http_client;

pub const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search.json";

pub struct SerpApiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SerpApiClient {
    pub fn new(api_key: &str) -> Self {
        Self::new_with_endpoint(api_key, SERPAPI_ENDPOINT)
    }

    pub fn new_with_endpoint(api_key: &str, endpoint: &str) -> Self {
        SerpApiClient {
            http: get_http_client(endpoint),
            api_key: api_key.trim().to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}

/// Extract the first organic results from a SerpAPI JSON body.
///
/// Returns `None` when the body has no `organic_results` array at all.
pub fn organic_hits(data: &Value) -> Option<Vec<SearchHit>> {
    let results = data.get("organic_results")?.as_array()?;
    let field = |result: &Value, key: &str, fallback: &str| {
        result
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    };
    Some(
        results
            .iter()
            .take(MAX_SEARCH_RESULTS)
            .map(|result| SearchHit {
                title: field(result, "title", "No title"),
                link: field(result, "link", "No link"),
                snippet: field(result, "snippet", "No description"),
            })
            .collect(),
    )
}

/// Turn a SerpAPI response body into the summary handed back to the agent.
pub fn summarize_response(data: &Value) -> Result<String, SearchError> {
    if let Some(message) = data.get("error").and_then(Value::as_str) {
        return Err(SearchError::Api(message.to_string()));
    }
    Ok(match organic_hits(data) {
        Some(hits) => summarize_hits(&hits, "No relevant search results found."),
        None => "No search results found.".to_string(),
    })
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    fn backend_name(&self) -> &str {
        "serpapi"
    }

    async fn search(&self, query: &str) -> Result<String, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::MissingApiKey);
        }

        log::debug!("SerpApiClient::search({:?})", query);
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;

        // SerpAPI reports bad keys and quota errors as JSON with a non-2xx status
        let data: Value = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(err) if status.is_success() => return Err(SearchError::Decode(err.to_string())),
            Err(_) => {
                return Err(SearchError::Http {
                    status: status.as_u16(),
                    body,
                })
            }
        };

        let summary = summarize_response(&data);
        if summary.is_ok() && !status.is_success() {
            return Err(SearchError::Http {
                status: status.as_u16(),
                body,
            });
        }
        summary
    }
}
