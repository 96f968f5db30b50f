use crate::roundtable::chat_provider::{CompletionOptions, Message, ProviderError, TokenUsage};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
    #[serde(default)]
    total_tokens: usize,
}

/// Send a chat request to an OpenAI compatible endpoint, record its usage, and return the
/// assistant's trimmed content.
pub async fn send_and_track(
    http: &reqwest::Client,
    base_url: &str,
    secret_key: &str,
    model: &str,
    messages: &[Message],
    options: &CompletionOptions,
    usage_slot: &Mutex<Option<TokenUsage>>,
) -> Result<String, ProviderError> {
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    let request = ChatCompletionRequest {
        model,
        messages: messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect(),
        max_tokens: options.max_tokens,
        temperature: options.temperature,
    };

    let response = http
        .post(&url)
        .bearer_auth(secret_key)
        .json(&request)
        .send()
        .await
        .map_err(|err| {
            log::error!("clients::common::send_and_track({}): {}", url, err);
            ProviderError::Transport(err.to_string())
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::error!(
            "clients::common::send_and_track({}): API error {}: {}",
            url,
            status,
            body
        );
        return Err(ProviderError::Http {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|err| ProviderError::Decode(err.to_string()))?;

    if let Some(usage) = parsed.usage {
        if let Ok(mut slot) = usage_slot.lock() {
            *slot = Some(TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            });
        }
    }

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or(ProviderError::EmptyCompletion)
}
