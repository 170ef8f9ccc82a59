//! Processed conversation record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A transcribed and summarized conversation with a contact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Conversation {
    /// Unique identifier for the conversation
    pub id: String,

    /// Contact the conversation was held with
    pub contact_id: String,

    /// Full transcript text
    pub transcript: String,

    /// Generated summary, if one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Tags extracted from the conversation; merged into the contact's tag
    /// document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// When the conversation was recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Conversation {
    /// Create a conversation with a transcript and no summary.
    pub fn new(
        id: impl Into<String>,
        contact_id: impl Into<String>,
        transcript: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            contact_id: contact_id.into(),
            transcript: transcript.into(),
            ..Default::default()
        }
    }

    /// Builder-style helper to attach a summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder-style helper to attach extracted tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}
