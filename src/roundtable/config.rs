//! Configuration for a discussion run and for the UI server.
//!
//! Credentials come from two places: the values typed into the UI and the process
//! environment. UI values win field by field; blank values count as absent. Users construct
//! everything from plain structs, no config-file format is involved.
//!
//! ```rust
//! use roundtable::config::{Credentials, DiscussionSettings};
//! use roundtable::search::SearchBackend;
//!
//! let env = Credentials::from_lookup(|key| match key {
//!     "OPENAI_API_KEY" => Some("sk-env".to_string()),
//!     "GROQ_API_KEY" => Some("gsk-env".to_string()),
//!     _ => None,
//! });
//!
//! let settings = DiscussionSettings {
//!     topic: "Future of Quantum Computing".into(),
//!     turns: 2,
//!     credentials: Credentials::default().or_defaults(&env),
//!     search_backend: SearchBackend::DuckDuckGo,
//! };
//! let validated = settings.validate().unwrap();
//! assert_eq!(validated.openai_api_key, "sk-env");
//! ```

use std::error::Error;
use std::fmt;
use std::net::SocketAddr;

use crate::roundtable::search::SearchBackend;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";
pub const SERPAPI_KEY_VAR: &str = "SERPAPI_KEY";
pub const SEARCH_BACKEND_VAR: &str = "ROUNDTABLE_SEARCH_BACKEND";
pub const BIND_ADDR_VAR: &str = "ROUNDTABLE_ADDR";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";

pub const MIN_TURNS: usize = 1;
pub const MAX_TURNS: usize = 10;
pub const DEFAULT_TURNS: usize = 3;

/// Topics offered when the user has not typed one.
pub const SUGGESTED_TOPICS: [&str; 5] = [
    "AI's Impact on Creative Industries",
    "Ethics of Autonomous Vehicles",
    "Future of Quantum Computing",
    "Space Colonization: Mars vs. Moon",
    "Cryptocurrency Regulation Challenges",
];

/// API keys for the two chat providers and the search provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub serpapi_key: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Credentials {
    pub fn new(
        openai_api_key: Option<String>,
        groq_api_key: Option<String>,
        serpapi_key: Option<String>,
    ) -> Self {
        Credentials {
            openai_api_key: non_blank(openai_api_key),
            groq_api_key: non_blank(groq_api_key),
            serpapi_key: non_blank(serpapi_key),
        }
    }

    /// Read the keys from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the keys through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Credentials::new(
            lookup(OPENAI_API_KEY_VAR),
            lookup(GROQ_API_KEY_VAR),
            lookup(SERPAPI_KEY_VAR),
        )
    }

    /// Fill every absent key from `defaults`.
    pub fn or_defaults(self, defaults: &Credentials) -> Self {
        Credentials {
            openai_api_key: non_blank(self.openai_api_key).or_else(|| defaults.openai_api_key.clone()),
            groq_api_key: non_blank(self.groq_api_key).or_else(|| defaults.groq_api_key.clone()),
            serpapi_key: non_blank(self.serpapi_key).or_else(|| defaults.serpapi_key.clone()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| if key.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("groq_api_key", &redact(&self.groq_api_key))
            .field("serpapi_key", &redact(&self.serpapi_key))
            .finish()
    }
}

/// Problems that stop a discussion before any remote call is made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingTopic,
    /// Human readable names of the missing keys.
    MissingCredentials(Vec<&'static str>),
    TurnsOutOfRange(usize),
    UnknownSearchBackend(String),
    InvalidAddress(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingTopic => write!(f, "Please enter a topic for the agents to discuss."),
            ConfigError::MissingCredentials(missing) => write!(
                f,
                "Please provide the {} (form fields or environment variables).",
                missing.join(", ")
            ),
            ConfigError::TurnsOutOfRange(turns) => write!(
                f,
                "Number of turns must be between {} and {}, got {}.",
                MIN_TURNS, MAX_TURNS, turns
            ),
            ConfigError::UnknownSearchBackend(name) => write!(
                f,
                "Unknown search backend '{}', expected 'serpapi' or 'duckduckgo'.",
                name
            ),
            ConfigError::InvalidAddress(addr) => write!(f, "Invalid bind address '{}'.", addr),
        }
    }
}

impl Error for ConfigError {}

/// Check a turn count against the `MIN_TURNS..=MAX_TURNS` bounds.
pub fn check_turns(turns: usize) -> Result<usize, ConfigError> {
    if (MIN_TURNS..=MAX_TURNS).contains(&turns) {
        Ok(turns)
    } else {
        Err(ConfigError::TurnsOutOfRange(turns))
    }
}

/// Everything collected from the user for one discussion run.
#[derive(Clone, Debug)]
pub struct DiscussionSettings {
    pub topic: String,
    pub turns: usize,
    pub credentials: Credentials,
    pub search_backend: SearchBackend,
}

/// Settings that passed [`DiscussionSettings::validate`].
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedSettings {
    pub topic: String,
    pub turns: usize,
    pub openai_api_key: String,
    pub groq_api_key: String,
    pub serpapi_key: Option<String>,
    pub search_backend: SearchBackend,
}

impl fmt::Debug for ValidatedSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedSettings")
            .field("topic", &self.topic)
            .field("turns", &self.turns)
            .field("search_backend", &self.search_backend)
            .finish_non_exhaustive()
    }
}

impl DiscussionSettings {
    pub fn validate(&self) -> Result<ValidatedSettings, ConfigError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(ConfigError::MissingTopic);
        }

        let mut missing = Vec::new();
        if self.credentials.openai_api_key.is_none() {
            missing.push("OpenAI API key");
        }
        if self.credentials.groq_api_key.is_none() {
            missing.push("Groq API key");
        }
        if self.search_backend.requires_api_key() && self.credentials.serpapi_key.is_none() {
            missing.push("SerpAPI key");
        }

        match (
            &self.credentials.openai_api_key,
            &self.credentials.groq_api_key,
        ) {
            (Some(openai), Some(groq)) if missing.is_empty() => Ok(ValidatedSettings {
                topic: topic.to_string(),
                turns: check_turns(self.turns)?,
                openai_api_key: openai.clone(),
                groq_api_key: groq.clone(),
                serpapi_key: self.credentials.serpapi_key.clone(),
                search_backend: self.search_backend,
            }),
            _ => Err(ConfigError::MissingCredentials(missing)),
        }
    }
}

/// Settings of the UI server process.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub search_backend: SearchBackend,
    /// Keys used when the form leaves a field blank.
    pub default_credentials: Credentials,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr_text = non_blank(lookup(BIND_ADDR_VAR)).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let addr = addr_text
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddress(addr_text.clone()))?;

        let search_backend = match non_blank(lookup(SEARCH_BACKEND_VAR)) {
            Some(name) => name.parse::<SearchBackend>().map_err(ConfigError::UnknownSearchBackend)?,
            None => SearchBackend::default(),
        };

        Ok(ServerConfig {
            addr,
            search_backend,
            default_credentials: Credentials::from_lookup(&lookup),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_credentials() -> Credentials {
        Credentials::new(
            Some("sk-1".into()),
            Some("gsk-1".into()),
            Some("serp-1".into()),
        )
    }

    fn settings(credentials: Credentials) -> DiscussionSettings {
        DiscussionSettings {
            topic: "Ethics of Autonomous Vehicles".into(),
            turns: DEFAULT_TURNS,
            credentials,
            search_backend: SearchBackend::SerpApi,
        }
    }

    #[test]
    fn blank_values_are_absent() {
        let creds = Credentials::from_lookup(|key| match key {
            OPENAI_API_KEY_VAR => Some("   ".into()),
            GROQ_API_KEY_VAR => Some(" gsk ".into()),
            _ => None,
        });
        assert_eq!(creds.openai_api_key, None);
        assert_eq!(creds.groq_api_key.as_deref(), Some("gsk"));
    }

    #[test]
    fn form_values_override_environment() {
        let env = full_credentials();
        let form = Credentials::new(Some("sk-form".into()), Some("".into()), None);
        let merged = form.or_defaults(&env);
        assert_eq!(merged.openai_api_key.as_deref(), Some("sk-form"));
        assert_eq!(merged.groq_api_key.as_deref(), Some("gsk-1"));
        assert_eq!(merged.serpapi_key.as_deref(), Some("serp-1"));
    }

    #[test]
    fn debug_output_hides_keys() {
        let rendered = format!("{:?}", full_credentials());
        assert!(!rendered.contains("sk-1"));
        assert!(rendered.contains("<set>"));
    }

    #[test]
    fn missing_keys_are_listed() {
        let err = settings(Credentials::new(None, Some("g".into()), None))
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingCredentials(vec!["OpenAI API key", "SerpAPI key"])
        );
    }

    #[test]
    fn serpapi_key_only_needed_for_serpapi_backend() {
        let mut s = settings(Credentials::new(Some("o".into()), Some("g".into()), None));
        assert!(s.validate().is_err());
        s.search_backend = SearchBackend::DuckDuckGo;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn turn_bounds() {
        for turns in [0, 11] {
            let mut s = settings(full_credentials());
            s.turns = turns;
            assert_eq!(s.validate(), Err(ConfigError::TurnsOutOfRange(turns)));
        }
        let mut s = settings(full_credentials());
        s.turns = MAX_TURNS;
        assert_eq!(s.validate().unwrap().turns, MAX_TURNS);
    }

    #[test]
    fn blank_topic_is_rejected() {
        let mut s = settings(full_credentials());
        s.topic = "  ".into();
        assert_eq!(s.validate(), Err(ConfigError::MissingTopic));
    }

    #[test]
    fn server_config_defaults_and_errors() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.search_backend, SearchBackend::SerpApi);

        let err = ServerConfig::from_lookup(|key| match key {
            SEARCH_BACKEND_VAR => Some("bing".into()),
            _ => None,
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::UnknownSearchBackend("bing".into()));

        let err = ServerConfig::from_lookup(|key| match key {
            BIND_ADDR_VAR => Some("not an address".into()),
            _ => None,
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidAddress("not an address".into()));
    }
}
