//! The provider-neutral chat-completion contract.
//!
//! A [`ChatProvider`] is a thin wrapper around one hosted chat-completion service. It does
//! not keep any conversation state: the caller passes the full message list on every call,
//! together with the model identifier and the sampling [`CompletionOptions`].
//!
//! ```rust
//! use roundtable::chat_provider::{CompletionOptions, Message, Role};
//!
//! let messages = vec![
//!     Message::system("You are terse."),
//!     Message::user("What do you think?"),
//! ];
//! assert_eq!(messages[0].role, Role::System);
//!
//! let options = CompletionOptions::default();
//! assert_eq!(options.max_tokens, 150);
//! ```

use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::sync::Mutex;

/// Represents the possible roles for a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Instructions that steer the model's responses.
    System,
    /// A message sent by the application user.
    User,
}

impl Role {
    /// Wire name used by OpenAI compatible APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// A single role/content pair sent to a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message.
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// How many tokens were spent on prompt vs. completion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

/// Sampling parameters applied to every completion request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompletionOptions {
    /// Cap on the number of generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        CompletionOptions {
            max_tokens: 150,
            temperature: 0.7,
        }
    }
}

/// Failure of a single completion call.
///
/// ```rust
/// use roundtable::chat_provider::ProviderError;
///
/// let err = ProviderError::Http { status: 401, body: "invalid api key".into() };
/// assert_eq!(err.to_string(), "HTTP 401: invalid api key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderError {
    /// The endpoint answered with a non-2xx status.
    Http { status: u16, body: String },
    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    Transport(String),
    /// The response body could not be decoded.
    Decode(String),
    /// The response decoded but carried no completion text.
    EmptyCompletion,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            ProviderError::Transport(msg) => write!(f, "transport error: {}", msg),
            ProviderError::Decode(msg) => write!(f, "malformed response: {}", msg),
            ProviderError::EmptyCompletion => write!(f, "completion contained no text"),
        }
    }
}

impl Error for ProviderError {}

/// Trait defining the interface to a hosted chat-completion service.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short identifier of the backing service, e.g. `"openai"`.
    fn provider_name(&self) -> &str;

    /// Send `messages` to `model` and return the trimmed completion text.
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, ProviderError>;

    /// Usage reported by the most recent successful [`ChatProvider::complete`] call.
    fn last_usage(&self) -> Option<TokenUsage> {
        self.usage_slot()
            .and_then(|slot| slot.lock().ok().and_then(|u| u.clone()))
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        // Providers that track TokenUsage return their slot here.
        None
    }
}
