//! # Roundtable
//!
//! Roundtable runs a small panel of LLM personas through a free-form group discussion.
//! Three agents, each bound to a hosted chat-completion endpoint, take turns on a topic; every
//! reply is appended to a shared transcript that the next speaker reads as context. An agent
//! can ask for a web lookup by opening its reply with `SEARCH: <query>`.
//!
//! The crate is layered as follows:
//!
//! * **Providers**: [`ChatProvider`] is the single completion contract, implemented for
//!   OpenAI and Groq in [`clients`]. [`search::SearchProvider`] covers SerpAPI and scraped
//!   DuckDuckGo results.
//! * **Panel**: [`agent::AgentRegistry`] holds the fixed, ordered personas
//!   (Alex, Luna, Gina).
//! * **Turn driver**: [`Discussion`] runs the turns sequentially, folds lookups into
//!   replies and records failures inline instead of aborting.
//! * **Configuration**: [`config`] collects the topic, turn count and API keys from the UI
//!   and the environment, and refuses to start when keys are missing.
//! * **UI**: the `web` module (feature `web-ui`, on by default) serves the start page and
//!   renders one collapsible section per turn.
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roundtable::agent::AgentRegistry;
//! use roundtable::clients::groq::GroqClient;
//! use roundtable::clients::openai::OpenAIClient;
//! use roundtable::search::serpapi::SerpApiClient;
//! use roundtable::Discussion;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     roundtable::init_logger();
//!
//!     let panel = AgentRegistry::default_panel(
//!         Arc::new(OpenAIClient::new(&std::env::var("OPENAI_API_KEY")?)),
//!         Arc::new(GroqClient::new(&std::env::var("GROQ_API_KEY")?)),
//!     );
//!     let search = Arc::new(SerpApiClient::new(&std::env::var("SERPAPI_KEY")?));
//!
//!     let outcome = Discussion::new(panel, search)
//!         .run("Ethics of Autonomous Vehicles", 1)
//!         .await?;
//!     println!("{}", outcome.transcript.render());
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Applications opt in to `RUST_LOG` driven diagnostics without choosing a logging backend
/// upfront.
///
/// ```rust
/// roundtable::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `roundtable` module.
pub mod roundtable;

// Re-exporting key items for easier external access.
pub use roundtable::agent;
pub use roundtable::agent::{Agent, AgentRegistry};
pub use roundtable::chat_provider;
pub use roundtable::chat_provider::{ChatProvider, CompletionOptions, Message, Role};
pub use roundtable::clients;
pub use roundtable::config;
pub use roundtable::discussion;
pub use roundtable::discussion::{run_discussion, Discussion, DiscussionOutcome};
pub use roundtable::event;
pub use roundtable::event::{DiscussionEvent, EventHandler};
pub use roundtable::prompt;
pub use roundtable::search;
pub use roundtable::transcript;
pub use roundtable::transcript::Transcript;
#[cfg(feature = "web-ui")]
pub use roundtable::web;
