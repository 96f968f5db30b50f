//! The shared, append-only record of a discussion.

use chrono::{DateTime, Utc};

/// One `speaker: text` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: String,
    pub text: String,
    pub recorded_at: DateTime<Utc>,
}

/// The running transcript every agent reads as context.
///
/// Entries can only be appended; the topic line always comes first.
#[derive(Clone, Debug)]
pub struct Transcript {
    topic: String,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(topic: impl Into<String>) -> Self {
        Transcript {
            topic: topic.into(),
            entries: Vec::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn append(&mut self, speaker: &str, text: &str) {
        self.entries.push(TranscriptEntry {
            speaker: speaker.to_string(),
            text: text.to_string(),
            recorded_at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Logical lines: the topic line plus one per entry.
    pub fn line_count(&self) -> usize {
        self.entries.len() + 1
    }

    /// Text handed to the agents as chat history.
    pub fn render(&self) -> String {
        let mut text = format!("Discussion Topic: {}\n\n", self.topic);
        for entry in &self.entries {
            text.push_str(&entry.speaker);
            text.push_str(": ");
            text.push_str(&entry.text);
            text.push('\n');
        }
        text
    }
}
