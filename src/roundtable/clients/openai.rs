//! The `OpenAIClient` struct implements [`ChatProvider`] for OpenAI's Chat Completions API,
//! recording the token usage of the latest request.
//!
//! The client is not bound to a model: the discussion panel shares one handle between the
//! GPT-3.5 and GPT-4o personas and passes the model identifier on every call.
//!
//! # Example
//!
//! ```rust,no_run
//! use roundtable::chat_provider::{ChatProvider, CompletionOptions, Message};
//! use roundtable::clients::openai::{model_to_string, Model, OpenAIClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAIClient::new(&std::env::var("OPENAI_API_KEY")?);
//!     let reply = client
//!         .complete(
//!             &model_to_string(Model::GPT4o),
//!             &[Message::system("You are terse."), Message::user("Hello!")],
//!             &CompletionOptions::default(),
//!         )
//!         .await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

use std::sync::Mutex;

use async_trait::async_trait;

use crate::roundtable::chat_provider::{
    ChatProvider, CompletionOptions, Message, ProviderError, TokenUsage,
};
use crate::roundtable::clients::common::send_and_track;
use crate::roundtable::http_client_pool::get_http_client;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Model identifiers used by the panel.
pub enum Model {
    /// `gpt-3.5-turbo`
    GPT35Turbo,
    /// `gpt-4o`, the Omni model.
    GPT4o,
}

/// Convert a [`Model`] variant into the string identifier expected by the REST API.
pub fn model_to_string(model: Model) -> String {
    match model {
        Model::GPT35Turbo => "gpt-3.5-turbo".to_string(),
        Model::GPT4o => "gpt-4o".to_string(),
    }
}

/// Client for OpenAI's Chat Completions API, or any endpoint speaking the same protocol.
pub struct OpenAIClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
    token_usage: Mutex<Option<TokenUsage>>,
}

impl OpenAIClient {
    pub fn new(secret_key: &str) -> Self {
        Self::new_with_base_url(secret_key, OPENAI_BASE_URL)
    }

    /// Construct a client targeting a custom OpenAI compatible base URL.
    pub fn new_with_base_url(secret_key: &str, base_url: &str) -> Self {
        OpenAIClient {
            http: get_http_client(base_url),
            secret_key: secret_key.to_string(),
            base_url: base_url.to_string(),
            token_usage: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatProvider for OpenAIClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        log::debug!(
            "OpenAIClient::complete(...): model={} messages={}",
            model,
            messages.len()
        );
        send_and_track(
            &self.http,
            &self.base_url,
            &self.secret_key,
            model,
            messages,
            options,
            &self.token_usage,
        )
        .await
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}
