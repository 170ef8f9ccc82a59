//! Ranked search results returned by the hybrid search service.

use super::document::DocumentKind;
use serde::{Deserialize, Serialize};

/// Attribute that produced a result's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedField {
    Tag,
    Conversation,
    Summary,
    Name,
    Email,
    Phone,
}

impl MatchedField {
    /// Get display name for the field.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Conversation => "conversation",
            Self::Summary => "summary",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    /// Whether this field identifies the contact directly (name, email, phone).
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Name | Self::Email | Self::Phone)
    }
}

impl From<DocumentKind> for MatchedField {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Tag => Self::Tag,
            DocumentKind::Conversation => Self::Conversation,
            DocumentKind::Summary => Self::Summary,
        }
    }
}

/// Which branch of the pipeline produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Semantic,
    Keyword,
    /// Both branches scored the contact
    Hybrid,
    /// Keyword-only fallback after a pipeline failure; score is a placeholder
    Fallback,
}

/// A contact ranked for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub contact_id: String,

    /// Display name from the contact directory
    pub name: String,

    /// Final score in `[0, 1]`
    pub score: f64,

    pub matched_field: MatchedField,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    pub source: ResultSource,
}

/// Per-contact scoring breakdown of the most recent query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugRow {
    pub contact_id: String,
    pub name: String,

    /// Raw cosine similarity, if the semantic branch scored the contact
    pub semantic_score: Option<f64>,

    /// Raw keyword score, if the keyword branch scored the contact
    pub keyword_score: Option<f64>,

    pub final_score: f64,
    pub matched_field: MatchedField,
    pub snippet: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_field_display_name() {
        assert_eq!(MatchedField::Name.display_name(), "name");
        assert_eq!(MatchedField::Tag.display_name(), "tag");
        assert_eq!(
            MatchedField::from(DocumentKind::Summary),
            MatchedField::Summary
        );
    }

    #[test]
    fn test_identity_fields() {
        assert!(MatchedField::Name.is_identity());
        assert!(MatchedField::Phone.is_identity());
        assert!(!MatchedField::Tag.is_identity());
        assert!(!MatchedField::Conversation.is_identity());
    }

    #[test]
    fn test_result_serializes_snake_case() {
        let result = SearchResult {
            contact_id: "c1".to_string(),
            name: "Ada".to_string(),
            score: 1.0,
            matched_field: MatchedField::Name,
            snippet: None,
            source: ResultSource::Keyword,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["matched_field"], "name");
        assert_eq!(json["source"], "keyword");
        assert!(json.get("snippet").is_none());
    }
}
