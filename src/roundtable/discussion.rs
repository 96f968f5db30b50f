//! The turn driver.
//!
//! A [`Discussion`] runs the agents of an [`AgentRegistry`] through a fixed number of turns.
//! Every turn calls each agent once, in registry order, and appends the reply to the shared
//! [`Transcript`] before the next agent is asked, so later speakers see what was just said.
//! Calls are strictly sequential.
//!
//! Failures never abort a run: a failed completion is recorded as `Error: …` and a failed
//! lookup as `Search failed: …`, and the discussion moves on to the next agent.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roundtable::agent::AgentRegistry;
//! use roundtable::clients::{groq::GroqClient, openai::OpenAIClient};
//! use roundtable::discussion::Discussion;
//! use roundtable::search::duckduckgo::DuckDuckGoClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = AgentRegistry::default_panel(
//!         Arc::new(OpenAIClient::new(&std::env::var("OPENAI_API_KEY")?)),
//!         Arc::new(GroqClient::new(&std::env::var("GROQ_API_KEY")?)),
//!     );
//!     let discussion = Discussion::new(registry, Arc::new(DuckDuckGoClient::new()));
//!
//!     let outcome = discussion.run("Future of Quantum Computing", 2).await?;
//!     for turn in &outcome.turns {
//!         for entry in &turn.entries {
//!             println!("[turn {}] {}: {}", turn.number, entry.agent_name, entry.content);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::roundtable::agent::{Agent, AgentRegistry};
use crate::roundtable::chat_provider::{CompletionOptions, ProviderError};
use crate::roundtable::clients::ProviderFactory;
use crate::roundtable::config::{check_turns, ConfigError, DiscussionSettings, ValidatedSettings};
use crate::roundtable::event::{DiscussionEvent, EventHandler};
use crate::roundtable::prompt::build_messages;
use crate::roundtable::search::{render_search_response, SearchError, SearchProvider, SearchRequest};
use crate::roundtable::transcript::Transcript;

/// How an agent's contribution came about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// The model reply, unchanged.
    Plain,
    /// The reply asked for a lookup; the content is the rebuilt, search-augmented text.
    Searched { query: String },
    /// The completion call failed; the content is the `Error:` line.
    Failed,
}

/// One agent's contribution to one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentEntry {
    pub agent_name: String,
    pub content: String,
    pub kind: EntryKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnRecord {
    /// 1-based turn number.
    pub number: usize,
    pub entries: Vec<AgentEntry>,
}

/// Run-scoped state, created when a run starts and consumed when it ends.
#[derive(Debug)]
pub struct DiscussionSession {
    pub id: Uuid,
    pub transcript: Transcript,
    pub turns: Vec<TurnRecord>,
    pub started_at: DateTime<Utc>,
}

impl DiscussionSession {
    pub fn new(topic: &str) -> Self {
        DiscussionSession {
            id: Uuid::new_v4(),
            transcript: Transcript::new(topic),
            turns: Vec::new(),
            started_at: Utc::now(),
        }
    }

    fn finish(self) -> DiscussionOutcome {
        DiscussionOutcome {
            id: self.id,
            topic: self.transcript.topic().to_string(),
            turns: self.turns,
            transcript: self.transcript,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct DiscussionOutcome {
    pub id: Uuid,
    pub topic: String,
    pub turns: Vec<TurnRecord>,
    pub transcript: Transcript,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DiscussionOutcome {
    pub fn entries(&self) -> impl Iterator<Item = &AgentEntry> {
        self.turns.iter().flat_map(|turn| turn.entries.iter())
    }

    pub fn failed_calls(&self) -> usize {
        self.entries()
            .filter(|entry| entry.kind == EntryKind::Failed)
            .count()
    }
}

/// Runs a fixed panel of agents through a discussion.
pub struct Discussion {
    registry: AgentRegistry,
    search: Arc<dyn SearchProvider>,
    options: CompletionOptions,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl Discussion {
    pub fn new(registry: AgentRegistry, search: Arc<dyn SearchProvider>) -> Self {
        Discussion {
            registry,
            search,
            options: CompletionOptions::default(),
            event_handler: None,
        }
    }

    /// Build the default three-agent panel from validated settings.
    pub fn from_settings(settings: &ValidatedSettings, factory: &dyn ProviderFactory) -> Self {
        let registry = AgentRegistry::default_panel(
            factory.openai(&settings.openai_api_key),
            factory.groq(&settings.groq_api_key),
        );
        let search = factory.search(settings.search_backend, settings.serpapi_key.as_deref());
        Discussion::new(registry, search)
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    async fn emit(&self, event: DiscussionEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_discussion_event(&event).await;
        }
    }

    /// Run `turns` turns on `topic`.
    ///
    /// Only a blank topic or a turn count outside `1..=10` is an error; remote failures are
    /// recorded inline and the run always completes every turn.
    pub async fn run(&self, topic: &str, turns: usize) -> Result<DiscussionOutcome, ConfigError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ConfigError::MissingTopic);
        }
        let turns = check_turns(turns)?;

        let mut session = DiscussionSession::new(topic);
        let run_id = session.id.to_string();

        self.emit(DiscussionEvent::RunStarted {
            run_id: run_id.clone(),
            topic: topic.to_string(),
            turns,
            agent_count: self.registry.len(),
        })
        .await;

        for turn in 1..=turns {
            self.emit(DiscussionEvent::TurnStarted {
                run_id: run_id.clone(),
                turn,
            })
            .await;

            let mut record = TurnRecord {
                number: turn,
                entries: Vec::with_capacity(self.registry.len()),
            };

            for agent in &self.registry {
                let entry = self.take_turn(agent, &session.transcript, &run_id, turn).await;
                session.transcript.append(&agent.name, &entry.content);
                record.entries.push(entry);
            }

            session.turns.push(record);
            self.emit(DiscussionEvent::TurnCompleted {
                run_id: run_id.clone(),
                turn,
            })
            .await;
        }

        let outcome = session.finish();
        self.emit(DiscussionEvent::RunCompleted {
            run_id,
            turns,
            failed_calls: outcome.failed_calls(),
        })
        .await;
        Ok(outcome)
    }

    /// Ask `agent` for its reply given the transcript so far.
    pub async fn respond(&self, agent: &Agent, transcript: &Transcript) -> Result<String, ProviderError> {
        let messages = build_messages(&agent.name, transcript.topic(), &transcript.render());
        agent
            .provider()
            .complete(&agent.model, &messages, &self.options)
            .await
    }

    /// Run one lookup. An empty query fails without touching the network.
    pub async fn search(&self, query: &str) -> Result<String, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        self.search.search(query).await
    }

    async fn take_turn(
        &self,
        agent: &Agent,
        transcript: &Transcript,
        run_id: &str,
        turn: usize,
    ) -> AgentEntry {
        self.emit(DiscussionEvent::AgentThinking {
            run_id: run_id.to_string(),
            turn,
            agent_name: agent.name.clone(),
        })
        .await;

        let reply = match self.respond(agent, transcript).await {
            Ok(reply) => reply,
            Err(err) => {
                log::warn!(
                    "Discussion::take_turn(...): {} ({}) failed: {}",
                    agent.name,
                    agent.model,
                    err
                );
                self.emit(DiscussionEvent::AgentFailed {
                    run_id: run_id.to_string(),
                    turn,
                    agent_name: agent.name.clone(),
                    error: err.to_string(),
                })
                .await;
                return AgentEntry {
                    agent_name: agent.name.clone(),
                    content: format!("Error: {}", err),
                    kind: EntryKind::Failed,
                };
            }
        };

        let entry = match SearchRequest::parse(&reply) {
            None => AgentEntry {
                agent_name: agent.name.clone(),
                content: reply,
                kind: EntryKind::Plain,
            },
            Some(request) => {
                let result = self.search(&request.query).await;
                self.emit(DiscussionEvent::SearchPerformed {
                    run_id: run_id.to_string(),
                    agent_name: agent.name.clone(),
                    query: request.query.clone(),
                    success: result.is_ok(),
                })
                .await;
                let summary = result.unwrap_or_else(|err| format!("Search failed: {}", err));
                AgentEntry {
                    agent_name: agent.name.clone(),
                    content: render_search_response(
                        &agent.name,
                        &request.query,
                        &summary,
                        &request.remainder,
                    ),
                    kind: EntryKind::Searched {
                        query: request.query,
                    },
                }
            }
        };

        self.emit(DiscussionEvent::AgentResponded {
            run_id: run_id.to_string(),
            turn,
            agent_name: agent.name.clone(),
            response_length: entry.content.chars().count(),
            searched: matches!(entry.kind, EntryKind::Searched { .. }),
        })
        .await;
        entry
    }
}

/// Validate `settings`, build the panel through `factory` and run it.
///
/// When validation fails the factory is never asked for a provider, so no remote call can
/// happen.
pub async fn run_discussion(
    settings: &DiscussionSettings,
    factory: &dyn ProviderFactory,
    event_handler: Option<Arc<dyn EventHandler>>,
) -> Result<DiscussionOutcome, ConfigError> {
    let validated = settings.validate()?;
    let mut discussion = Discussion::from_settings(&validated, factory);
    if let Some(handler) = event_handler {
        discussion = discussion.with_event_handler(handler);
    }
    discussion.run(&validated.topic, validated.turns).await
}
