//! Instruction template for a single agent reply.

use crate::roundtable::chat_provider::Message;

/// Fixed user turn sent after the system instruction.
pub const USER_STUB: &str = "What do you think?";

/// Build the system instruction for `agent_name`.
///
/// The whole transcript is embedded verbatim; it is never truncated or summarised.
pub fn build_system_prompt(agent_name: &str, topic: &str, transcript: &str) -> String {
    format!(
        "You are {name}, an AI participating in a group discussion. \
         Your role is to actively engage in the conversation, build on previous arguments, ask questions, \
         and challenge or support other agents' points of view. \
         Maintain the context and keep the discussion cohesive. \
         Topic: '{topic}'. Chat history:\n\n{transcript}\n\n\
         Respond concisely (2-3 sentences) and contribute to the flow of discussion. \
         You can also ask relevant questions to other agents or propose alternative perspectives. \
         To fetch web info, start your message with 'SEARCH: <query>' (e.g., 'SEARCH: Nvidia AI market share').",
        name = agent_name,
        topic = topic,
        transcript = transcript,
    )
}

/// The two-message request: system instruction followed by [`USER_STUB`].
pub fn build_messages(agent_name: &str, topic: &str, transcript: &str) -> Vec<Message> {
    vec![
        Message::system(build_system_prompt(agent_name, topic, transcript)),
        Message::user(USER_STUB),
    ]
}
