//! Append-only conversation transcript.

use serde::{Deserialize, Serialize};

/// Shown when the server answers without any answer text.
pub const NO_ANSWER_TEXT: &str = "(No answer provided)";
/// Shown when the server could not be reached or replied with garbage.
pub const UNREACHABLE_TEXT: &str = "Could not reach the server.";
/// Prefix for application-level errors reported by the server.
pub const ERROR_PREFIX: &str = "Error: ";

/// Who said a line.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Bot => write!(f, "bot"),
        }
    }
}

/// One rendered line of conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }

    /// Whether this is a bot line reporting a server-side error.
    pub fn is_error(&self) -> bool {
        self.speaker == Speaker::Bot
            && (self.text.starts_with(ERROR_PREFIX) || self.text == UNREACHABLE_TEXT)
    }
}

/// Ordered entries; append order is display order. Entries are never
/// edited, removed or reordered.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) -> &TranscriptEntry {
        self.entries.push(TranscriptEntry {
            speaker,
            text: text.into(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
