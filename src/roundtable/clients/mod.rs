//! Provider specific [`ChatProvider`] implementations, and the factory that builds the
//! panel's remote handles from validated credentials.
//!
//! Each submodule offers a concrete client that speaks a particular vendor's API while
//! conforming to the uniform [`ChatProvider`] contract.

pub mod common;

pub mod groq;
pub mod openai;

use std::sync::Arc;

use crate::roundtable::chat_provider::ChatProvider;
use crate::roundtable::search::duckduckgo::DuckDuckGoClient;
use crate::roundtable::search::serpapi::SerpApiClient;
use crate::roundtable::search::{SearchBackend, SearchProvider};

/// Builds the remote handles a discussion needs.
///
/// The discussion runner only asks the factory for providers after the settings have been
/// validated, so a factory observes zero construction calls when credentials are missing.
pub trait ProviderFactory: Send + Sync {
    fn openai(&self, secret_key: &str) -> Arc<dyn ChatProvider>;

    fn groq(&self, secret_key: &str) -> Arc<dyn ChatProvider>;

    fn search(&self, backend: SearchBackend, api_key: Option<&str>) -> Arc<dyn SearchProvider>;
}

/// Factory producing the real HTTP clients.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpProviderFactory;

impl ProviderFactory for HttpProviderFactory {
    fn openai(&self, secret_key: &str) -> Arc<dyn ChatProvider> {
        Arc::new(openai::OpenAIClient::new(secret_key))
    }

    fn groq(&self, secret_key: &str) -> Arc<dyn ChatProvider> {
        Arc::new(groq::GroqClient::new(secret_key))
    }

    fn search(&self, backend: SearchBackend, api_key: Option<&str>) -> Arc<dyn SearchProvider> {
        match backend {
            SearchBackend::SerpApi => Arc::new(SerpApiClient::new(api_key.unwrap_or_default())),
            SearchBackend::DuckDuckGo => Arc::new(DuckDuckGoClient::new()),
        }
    }
}
