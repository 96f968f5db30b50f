//! Groq client wrapper built on the OpenAI-compatible transport.
//!
//! Groq exposes an OpenAI compatible surface, so the wrapper delegates every request to an
//! [`OpenAIClient`] pointed at Groq's base URL.

use crate::roundtable::chat_provider::{
    ChatProvider, CompletionOptions, Message, ProviderError, TokenUsage,
};
use crate::roundtable::clients::openai::OpenAIClient;
use async_trait::async_trait;
use std::sync::Mutex;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub struct GroqClient {
    delegate_client: OpenAIClient,
}

// Groq-hosted model used by the panel
#[allow(non_camel_case_types)]
pub enum Model {
    Llama3_70b8192,
}

pub fn model_to_string(model: Model) -> String {
    match model {
        Model::Llama3_70b8192 => "llama3-70b-8192".to_string(),
    }
}

impl GroqClient {
    pub fn new(secret_key: &str) -> Self {
        Self::new_with_base_url(secret_key, GROQ_BASE_URL)
    }

    pub fn new_with_base_url(secret_key: &str, base_url: &str) -> Self {
        GroqClient {
            // Groq speaks the OpenAI protocol, only the base URL differs
            delegate_client: OpenAIClient::new_with_base_url(secret_key, base_url),
        }
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    fn provider_name(&self) -> &str {
        "groq"
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        self.delegate_client.complete(model, messages, options).await
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        self.delegate_client.usage_slot()
    }
}
