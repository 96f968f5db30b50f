//! The discussion panel: named personas bound to a remote model.

use std::fmt;
use std::slice::Iter;
use std::sync::Arc;

use crate::roundtable::chat_provider::ChatProvider;
use crate::roundtable::clients::{groq, openai};

pub const ALEX: &str = "Alex (GPT-3.5)";
pub const LUNA: &str = "Luna (LLaMA)";
pub const GINA: &str = "Gina (GPT-4o)";

/// A persona bound to one remote model endpoint.
#[derive(Clone)]
pub struct Agent {
    /// Display name, also used as the speaker label in the transcript.
    pub name: String,
    /// Model identifier sent with every request.
    pub model: String,
    provider: Arc<dyn ChatProvider>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        provider: Arc<dyn ChatProvider>,
    ) -> Self {
        Agent {
            name: name.into(),
            model: model.into(),
            provider,
        }
    }

    pub fn provider(&self) -> &dyn ChatProvider {
        self.provider.as_ref()
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("provider", &self.provider.provider_name())
            .finish()
    }
}

/// The fixed, ordered list of agents taking part in a discussion.
///
/// Iteration order is the speaking order of every turn.
#[derive(Clone, Debug)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
}

impl AgentRegistry {
    pub fn new(agents: Vec<Agent>) -> Self {
        AgentRegistry { agents }
    }

    /// Alex (OpenAI GPT-3.5), Luna (Groq LLaMA 3 70B), Gina (OpenAI GPT-4o), in that order.
    pub fn default_panel(openai: Arc<dyn ChatProvider>, groq: Arc<dyn ChatProvider>) -> Self {
        AgentRegistry::new(vec![
            Agent::new(
                ALEX,
                openai::model_to_string(openai::Model::GPT35Turbo),
                openai.clone(),
            ),
            Agent::new(
                LUNA,
                groq::model_to_string(groq::Model::Llama3_70b8192),
                groq,
            ),
            Agent::new(GINA, openai::model_to_string(openai::Model::GPT4o), openai),
        ])
    }

    pub fn iter(&self) -> Iter<'_, Agent> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a AgentRegistry {
    type Item = &'a Agent;
    type IntoIter = Iter<'a, Agent>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roundtable::clients::groq::GroqClient;
    use crate::roundtable::clients::openai::OpenAIClient;

    #[test]
    fn default_panel_binds_fixed_models_in_order() {
        let panel = AgentRegistry::default_panel(
            Arc::new(OpenAIClient::new("sk")),
            Arc::new(GroqClient::new("gsk")),
        );

        let bound: Vec<(&str, &str, &str)> = panel
            .iter()
            .map(|a| (a.name.as_str(), a.model.as_str(), a.provider().provider_name()))
            .collect();
        assert_eq!(
            bound,
            vec![
                (ALEX, "gpt-3.5-turbo", "openai"),
                (LUNA, "llama3-70b-8192", "groq"),
                (GINA, "gpt-4o", "openai"),
            ]
        );
    }
}
