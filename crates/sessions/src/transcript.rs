//! Display history entries.
//!
//! The display history is what the UI renders; it mirrors user and
//! assistant messages one to one and never includes the system message.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who produced a display entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Advisor,
}

impl Speaker {
    /// Label shown next to the entry.
    pub fn label(self) -> &'static str {
        match self {
            Speaker::User => "You",
            Speaker::Advisor => "Advisor",
        }
    }
}

/// A single rendered line of the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl DisplayEntry {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            at: Utc::now(),
        }
    }
}
