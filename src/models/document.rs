//! Documents stored in the semantic index.

use serde::{Deserialize, Serialize};

/// Kind of a semantic document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Concatenation of a contact's tags
    Tag,
    /// Conversation transcript
    Conversation,
    /// Conversation summary
    Summary,
}

impl DocumentKind {
    /// Id prefix used for documents of this kind.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Conversation => "conversation",
            Self::Summary => "summary",
        }
    }
}

/// A text document derived from contact data.
///
/// Each variant carries only what that kind needs; ids are derived from the
/// owning record so re-indexing the same record replaces its document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Document {
    Tag {
        contact_id: String,
        tags: Vec<String>,
    },
    Conversation {
        conversation_id: String,
        contact_id: String,
        transcript: String,
    },
    Summary {
        conversation_id: String,
        contact_id: String,
        summary: String,
    },
}

impl Document {
    /// Id of the tag document for a contact.
    pub fn tag_id(contact_id: &str) -> String {
        format!("{}:{}", DocumentKind::Tag.id_prefix(), contact_id)
    }

    /// Id of the transcript document for a conversation.
    pub fn conversation_id(conversation_id: &str) -> String {
        format!("{}:{}", DocumentKind::Conversation.id_prefix(), conversation_id)
    }

    /// Id of the summary document for a conversation.
    pub fn summary_id(conversation_id: &str) -> String {
        format!("{}:{}", DocumentKind::Summary.id_prefix(), conversation_id)
    }

    pub fn id(&self) -> String {
        match self {
            Self::Tag { contact_id, .. } => Self::tag_id(contact_id),
            Self::Conversation {
                conversation_id, ..
            } => Self::conversation_id(conversation_id),
            Self::Summary {
                conversation_id, ..
            } => Self::summary_id(conversation_id),
        }
    }

    pub fn contact_id(&self) -> &str {
        match self {
            Self::Tag { contact_id, .. }
            | Self::Conversation { contact_id, .. }
            | Self::Summary { contact_id, .. } => contact_id,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Tag { .. } => DocumentKind::Tag,
            Self::Conversation { .. } => DocumentKind::Conversation,
            Self::Summary { .. } => DocumentKind::Summary,
        }
    }

    /// Text that gets embedded.
    ///
    /// Tag documents render as `"tags: a, b"`.
    pub fn content(&self) -> String {
        match self {
            Self::Tag { tags, .. } => format!("tags: {}", tags.join(", ")),
            Self::Conversation { transcript, .. } => transcript.clone(),
            Self::Summary { summary, .. } => summary.clone(),
        }
    }
}
