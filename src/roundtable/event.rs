//! Discussion event system.
//!
//! Provides a callback-based observability layer for a discussion run. Implement
//! [`EventHandler`] to be told when a turn starts, when an agent is about to call its model,
//! when it answered or failed, and when it performed a web lookup.
//!
//! # Event Flow
//!
//! ```text
//! RunStarted
//!   └─ TurnStarted { turn: 1 }
//!       ├─ AgentThinking { agent: Alex }
//!       ├─ (SearchPerformed, if the reply asked for a lookup)
//!       ├─ AgentResponded | AgentFailed
//!       ├─ ... same for Luna, then Gina
//!   └─ TurnCompleted { turn: 1 }
//!   └─ ... remaining turns
//! RunCompleted
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use roundtable::event::{DiscussionEvent, EventHandler};
//! use async_trait::async_trait;
//!
//! struct Spinner;
//!
//! #[async_trait]
//! impl EventHandler for Spinner {
//!     async fn on_discussion_event(&self, event: &DiscussionEvent) {
//!         if let DiscussionEvent::AgentThinking { agent_name, .. } = event {
//!             println!("{} is thinking...", agent_name);
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;

/// Events emitted by [`Discussion::run`](crate::discussion::Discussion::run).
#[derive(Debug, Clone, PartialEq)]
pub enum DiscussionEvent {
    /// A run begins. `run_id` identifies the run in every later event.
    RunStarted {
        run_id: String,
        topic: String,
        turns: usize,
        agent_count: usize,
    },

    TurnStarted { run_id: String, turn: usize },

    /// Fired right before an agent's completion request is sent.
    AgentThinking {
        run_id: String,
        turn: usize,
        agent_name: String,
    },

    /// The agent's reply is about to be appended to the transcript.
    AgentResponded {
        run_id: String,
        turn: usize,
        agent_name: String,
        /// Character length of the visible reply (after any lookup was folded in).
        response_length: usize,
        searched: bool,
    },

    /// The completion call failed; an `Error:` line was recorded in its place.
    AgentFailed {
        run_id: String,
        turn: usize,
        agent_name: String,
        error: String,
    },

    /// A lookup requested by an agent finished, successfully or not.
    SearchPerformed {
        run_id: String,
        agent_name: String,
        query: String,
        success: bool,
    },

    TurnCompleted { run_id: String, turn: usize },

    RunCompleted {
        run_id: String,
        turns: usize,
        failed_calls: usize,
    },
}

/// Receives [`DiscussionEvent`]s. The default implementation ignores them.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_discussion_event(&self, _event: &DiscussionEvent) {}
}

/// Writes every event through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn on_discussion_event(&self, event: &DiscussionEvent) {
        match event {
            DiscussionEvent::RunStarted {
                run_id,
                topic,
                turns,
                agent_count,
            } => log::info!(
                "[{}] discussion started: topic={:?} turns={} agents={}",
                run_id,
                topic,
                turns,
                agent_count
            ),
            DiscussionEvent::TurnStarted { run_id, turn } => {
                log::debug!("[{}] turn {} started", run_id, turn)
            }
            DiscussionEvent::AgentThinking {
                run_id,
                turn,
                agent_name,
            } => log::debug!("[{}] turn {}: {} is thinking...", run_id, turn, agent_name),
            DiscussionEvent::AgentResponded {
                run_id,
                turn,
                agent_name,
                response_length,
                searched,
            } => log::info!(
                "[{}] turn {}: {} responded ({} chars, searched={})",
                run_id,
                turn,
                agent_name,
                response_length,
                searched
            ),
            DiscussionEvent::AgentFailed {
                run_id,
                turn,
                agent_name,
                error,
            } => log::warn!("[{}] turn {}: {} failed: {}", run_id, turn, agent_name, error),
            DiscussionEvent::SearchPerformed {
                run_id,
                agent_name,
                query,
                success,
            } => log::info!(
                "[{}] {} searched {:?} (success={})",
                run_id,
                agent_name,
                query,
                success
            ),
            DiscussionEvent::TurnCompleted { run_id, turn } => {
                log::debug!("[{}] turn {} completed", run_id, turn)
            }
            DiscussionEvent::RunCompleted {
                run_id,
                turns,
                failed_calls,
            } => log::info!(
                "[{}] discussion concluded after {} turns ({} failed calls)",
                run_id,
                turns,
                failed_calls
            ),
        }
    }
}
